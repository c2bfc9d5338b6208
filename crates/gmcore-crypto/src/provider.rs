//! Trait-based provider mechanism for cryptographic algorithms.
//!
//! The traits define the abstract interfaces the generic layers build on:
//! modes of operation consume any [`BlockCipher`], hash consumers any
//! [`Digest`]. Static dispatch keeps the hot paths monomorphized.

use gmcore_types::CryptoError;

/// A 128-bit block cipher with a fixed key (e.g. SM4).
///
/// Implementations hold the expanded key schedule; `encrypt_block` and
/// `decrypt_block` must run in constant time with respect to the data.
pub trait BlockCipher: Send + Sync {
    /// Block size in bytes.
    fn block_size(&self) -> usize;

    /// Encrypt a single block in place. `block` must be exactly one
    /// block long.
    fn encrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError>;

    /// Decrypt a single block in place.
    fn decrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError>;
}

/// A hash / message digest algorithm.
pub trait Digest: Send + Sync {
    /// The output size in bytes.
    fn output_size(&self) -> usize;

    /// The internal block size in bytes.
    fn block_size(&self) -> usize;

    /// Feed data into the hash state.
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError>;

    /// Finalize the hash and write the digest to `out`, which must be at
    /// least `output_size()` bytes.
    fn finish(&mut self, out: &mut [u8]) -> Result<(), CryptoError>;

    /// Reset the state to process a new message.
    fn reset(&mut self);
}
