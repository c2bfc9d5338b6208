//! Block cipher modes of operation.
//!
//! Modes are generic over the [`BlockCipher`](crate::provider::BlockCipher)
//! trait so they work with any 128-bit block primitive (SM4 in this
//! library's test vectors).

pub mod xts;
