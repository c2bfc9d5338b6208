//! ASN.1 DER encoder.

use super::tags;

/// A builder for DER-encoded data.
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Consume the encoder and return the encoded bytes.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    /// Write a TLV with the given tag byte and value.
    pub fn write_tlv(&mut self, tag: u8, value: &[u8]) -> &mut Self {
        self.buf.push(tag);
        self.write_length(value.len());
        self.buf.extend_from_slice(value);
        self
    }

    fn write_length(&mut self, length: usize) {
        if length < 0x80 {
            self.buf.push(length as u8);
            return;
        }
        let bytes = length.to_be_bytes();
        let skip = bytes.iter().take_while(|&&b| b == 0).count();
        self.buf.push(0x80 | (bytes.len() - skip) as u8);
        self.buf.extend_from_slice(&bytes[skip..]);
    }

    /// Write an INTEGER from an unsigned big-endian magnitude, inserting
    /// the sign-padding zero byte when the high bit is set.
    pub fn write_integer(&mut self, value: &[u8]) -> &mut Self {
        let value = {
            let skip = value
                .iter()
                .take_while(|&&b| b == 0)
                .count()
                .min(value.len().saturating_sub(1));
            &value[skip..]
        };
        if value.is_empty() {
            return self.write_tlv(tags::INTEGER, &[0]);
        }
        if value[0] & 0x80 != 0 {
            let mut padded = Vec::with_capacity(value.len() + 1);
            padded.push(0);
            padded.extend_from_slice(value);
            self.write_tlv(tags::INTEGER, &padded)
        } else {
            self.write_tlv(tags::INTEGER, value)
        }
    }

    /// Write a BIT STRING holding whole bytes (zero unused bits).
    pub fn write_bit_string(&mut self, value: &[u8]) -> &mut Self {
        let mut content = Vec::with_capacity(value.len() + 1);
        content.push(0);
        content.extend_from_slice(value);
        self.write_tlv(tags::BIT_STRING, &content)
    }

    /// Write a SEQUENCE wrapping already-encoded contents.
    pub fn write_sequence(&mut self, contents: &[u8]) -> &mut Self {
        self.write_tlv(tags::SEQUENCE, contents)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}
