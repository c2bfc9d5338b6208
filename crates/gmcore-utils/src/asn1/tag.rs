//! ASN.1 tag parsing.

use super::{Tag, TagClass};
use gmcore_types::CryptoError;

impl Tag {
    /// Parse a tag from the first bytes of `input`, returning the tag and
    /// the number of bytes consumed.
    pub fn from_bytes(input: &[u8]) -> Result<(Self, usize), CryptoError> {
        let first = *input.first().ok_or(CryptoError::InvalidAsn1)?;
        let class = match first >> 6 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        };
        let constructed = first & 0x20 != 0;

        let low = first & 0x1F;
        if low < 0x1F {
            return Ok((
                Tag {
                    class,
                    constructed,
                    number: low as u32,
                },
                1,
            ));
        }

        // High tag numbers (long form); none of the key envelopes use
        // them, but the decoder still parses them to skip cleanly.
        let mut number: u32 = 0;
        let mut i = 1;
        loop {
            let byte = *input.get(i).ok_or(CryptoError::InvalidAsn1)?;
            number = number
                .checked_shl(7)
                .ok_or(CryptoError::InvalidAsn1)?
                | (byte & 0x7F) as u32;
            i += 1;
            if byte & 0x80 == 0 {
                break;
            }
        }
        Ok((
            Tag {
                class,
                constructed,
                number,
            },
            i,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_tag() {
        let (tag, len) = Tag::from_bytes(&[0x30]).unwrap();
        assert_eq!(tag.class, TagClass::Universal);
        assert!(tag.constructed);
        assert_eq!(tag.number, 0x10);
        assert_eq!(len, 1);
    }

    #[test]
    fn primitive_tags() {
        for (byte, number) in [(0x02u8, 2u32), (0x03, 3)] {
            let (tag, len) = Tag::from_bytes(&[byte]).unwrap();
            assert!(!tag.constructed);
            assert_eq!(tag.number, number);
            assert_eq!(len, 1);
        }
    }

    #[test]
    fn long_form_tag() {
        // Context-specific constructed, tag number 0x81
        let (tag, len) = Tag::from_bytes(&[0xBF, 0x81, 0x01]).unwrap();
        assert_eq!(tag.class, TagClass::ContextSpecific);
        assert_eq!(tag.number, 0x81);
        assert_eq!(len, 3);
    }

    #[test]
    fn truncated_input() {
        assert!(Tag::from_bytes(&[]).is_err());
        assert!(Tag::from_bytes(&[0x1F]).is_err());
        assert!(Tag::from_bytes(&[0x1F, 0x80]).is_err());
    }
}
