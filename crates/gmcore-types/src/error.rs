/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    // General errors
    #[error("invalid argument")]
    InvalidArg,
    #[error("invalid key")]
    InvalidKey,
    #[error("invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },
    #[error("buffer length not enough: need {need}, got {got}")]
    BufferTooSmall { need: usize, got: usize },

    // BigNum errors
    #[error("big number: division by zero")]
    BnDivisionByZero,
    #[error("big number: no modular inverse")]
    BnNoInverse,
    #[error("big number: random generation failed")]
    BnRandGenFail,

    // Curve point errors
    #[error("ecc: invalid point encoding")]
    InvalidPointEncoding,
    #[error("ecc: point not in the prime-order subgroup")]
    NotInSubgroup,
    #[error("ecc: point at infinity")]
    PointAtInfinity,

    // SM9 key extraction
    #[error("sm9: degenerate identity hash, regenerate the master key")]
    RegenerateMaster,

    // Encoding errors
    #[error("decode: invalid asn.1 structure")]
    InvalidAsn1,
    #[error("decode: invalid pem document")]
    InvalidPem,

    // XTS errors
    #[error("xts: input shorter than one block")]
    ShortInput,
    #[error("xts: data and tweak key halves must differ")]
    WeakXtsKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_simple_variants() {
        assert_eq!(CryptoError::InvalidArg.to_string(), "invalid argument");
        assert_eq!(
            CryptoError::InvalidPointEncoding.to_string(),
            "ecc: invalid point encoding"
        );
        assert_eq!(
            CryptoError::ShortInput.to_string(),
            "xts: input shorter than one block"
        );
        assert_eq!(
            CryptoError::RegenerateMaster.to_string(),
            "sm9: degenerate identity hash, regenerate the master key"
        );
    }

    #[test]
    fn display_structured_variants() {
        let e = CryptoError::BufferTooSmall { need: 384, got: 100 };
        assert_eq!(e.to_string(), "buffer length not enough: need 384, got 100");

        let e = CryptoError::InvalidKeyLength {
            expected: 16,
            got: 24,
        };
        assert_eq!(e.to_string(), "invalid key length: expected 16, got 24");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CryptoError>();
    }
}
