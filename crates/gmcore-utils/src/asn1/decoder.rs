//! ASN.1 DER decoder.

use super::{Tag, TagClass, Tlv};
use gmcore_types::CryptoError;

/// A streaming DER decoder over a borrowed byte slice.
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// True once every byte has been consumed. DER envelopes must end
    /// exactly; callers reject trailing data through this.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Peek at the next tag without consuming it.
    pub fn peek_tag(&self) -> Result<Tag, CryptoError> {
        let (tag, _) = Tag::from_bytes(&self.data[self.pos..])?;
        Ok(tag)
    }

    /// Parse the next TLV element.
    pub fn read_tlv(&mut self) -> Result<Tlv<'a>, CryptoError> {
        let (tag, tag_len) = Tag::from_bytes(&self.data[self.pos..])?;
        self.pos += tag_len;

        let length = self.read_length()?;
        let end = self
            .pos
            .checked_add(length)
            .ok_or(CryptoError::InvalidAsn1)?;
        if end > self.data.len() {
            return Err(CryptoError::InvalidAsn1);
        }
        let value = &self.data[self.pos..end];
        self.pos = end;
        Ok(Tlv { tag, value })
    }

    /// Parse a definite DER length.
    fn read_length(&mut self) -> Result<usize, CryptoError> {
        let first = *self.data.get(self.pos).ok_or(CryptoError::InvalidAsn1)?;
        self.pos += 1;

        if first < 0x80 {
            return Ok(first as usize);
        }
        if first == 0x80 {
            // Indefinite length is BER, not DER.
            return Err(CryptoError::InvalidAsn1);
        }
        let num_bytes = (first & 0x7F) as usize;
        if num_bytes > 4 || self.pos + num_bytes > self.data.len() {
            return Err(CryptoError::InvalidAsn1);
        }
        let mut length = 0usize;
        for _ in 0..num_bytes {
            length = (length << 8) | self.data[self.pos] as usize;
            self.pos += 1;
        }
        Ok(length)
    }

    /// Read an INTEGER, returning its unsigned big-endian magnitude
    /// (any sign-padding zero byte stripped). Negative values are
    /// rejected; the key formats only carry non-negative integers.
    pub fn read_integer(&mut self) -> Result<&'a [u8], CryptoError> {
        let tlv = self.read_tlv()?;
        if tlv.tag.class != TagClass::Universal
            || tlv.tag.number != 0x02
            || tlv.tag.constructed
            || tlv.value.is_empty()
        {
            return Err(CryptoError::InvalidAsn1);
        }
        if tlv.value[0] & 0x80 != 0 {
            return Err(CryptoError::InvalidAsn1);
        }
        if tlv.value[0] == 0 && tlv.value.len() > 1 {
            return Ok(&tlv.value[1..]);
        }
        Ok(tlv.value)
    }

    /// Read a BIT STRING and return its payload. The SM9 key formats
    /// only ever carry whole-byte strings, so a nonzero unused-bits
    /// count is malformed input.
    pub fn read_bit_string(&mut self) -> Result<&'a [u8], CryptoError> {
        let tlv = self.read_tlv()?;
        if tlv.tag.class != TagClass::Universal
            || tlv.tag.number != 0x03
            || tlv.tag.constructed
            || tlv.value.is_empty()
            || tlv.value[0] != 0
        {
            return Err(CryptoError::InvalidAsn1);
        }
        Ok(&tlv.value[1..])
    }

    /// Read a SEQUENCE, returning a sub-decoder over its contents.
    pub fn read_sequence(&mut self) -> Result<Decoder<'a>, CryptoError> {
        let tlv = self.read_tlv()?;
        if tlv.tag.class != TagClass::Universal || tlv.tag.number != 0x10 || !tlv.tag.constructed {
            return Err(CryptoError::InvalidAsn1);
        }
        Ok(Decoder::new(tlv.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer() {
        let mut dec = Decoder::new(&[0x02, 0x01, 0x2A]);
        assert_eq!(dec.read_integer().unwrap(), &[0x2A]);
        assert!(dec.is_empty());
    }

    #[test]
    fn integer_sign_padding_stripped() {
        let mut dec = Decoder::new(&[0x02, 0x02, 0x00, 0x80]);
        assert_eq!(dec.read_integer().unwrap(), &[0x80]);
    }

    #[test]
    fn negative_integer_rejected() {
        let mut dec = Decoder::new(&[0x02, 0x01, 0x80]);
        assert!(dec.read_integer().is_err());
    }

    #[test]
    fn bit_string() {
        let mut dec = Decoder::new(&[0x03, 0x03, 0x00, 0xAB, 0xCD]);
        assert_eq!(dec.read_bit_string().unwrap(), &[0xAB, 0xCD]);
    }

    #[test]
    fn bit_string_partial_byte_rejected() {
        let mut dec = Decoder::new(&[0x03, 0x02, 0x04, 0xF0]);
        assert!(dec.read_bit_string().is_err());
    }

    #[test]
    fn sequence_of_integers() {
        // SEQUENCE { INTEGER 1, INTEGER 2 }
        let data = [0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02];
        let mut dec = Decoder::new(&data);
        let mut inner = dec.read_sequence().unwrap();
        assert_eq!(inner.read_integer().unwrap(), &[1]);
        assert_eq!(inner.read_integer().unwrap(), &[2]);
        assert!(inner.is_empty());
        assert!(dec.is_empty());
    }

    #[test]
    fn long_length_form() {
        let mut payload = vec![0u8];
        payload.extend_from_slice(&[0x5A; 200]);
        let mut data = vec![0x03, 0x81, payload.len() as u8];
        data.extend_from_slice(&payload);
        let mut dec = Decoder::new(&data);
        assert_eq!(dec.read_bit_string().unwrap().len(), 200);
    }

    #[test]
    fn truncated_value_rejected() {
        let mut dec = Decoder::new(&[0x02, 0x05, 0x01]);
        assert!(dec.read_tlv().is_err());
    }

    #[test]
    fn indefinite_length_rejected() {
        let mut dec = Decoder::new(&[0x30, 0x80, 0x00, 0x00]);
        assert!(dec.read_sequence().is_err());
    }

    #[test]
    fn peek_does_not_consume() {
        let dec = Decoder::new(&[0x02, 0x01, 0x05]);
        assert_eq!(dec.peek_tag().unwrap().number, 0x02);
        assert!(!dec.is_empty());
    }
}
