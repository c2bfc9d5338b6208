//! XTS (XEX-based tweaked-codebook mode with ciphertext stealing).
//!
//! Length-preserving encryption for storage sectors, in two flavors:
//!
//! - **IEEE P1619**: the tweak is either an explicit 16-byte value or a
//!   64-bit sector number (encoded little-endian into 16 bytes);
//! - **GB/T 17964-2021**: an explicit 16-byte tweak with the
//!   bit-reflected tweak-advance convention of that standard.
//!
//! Both share the streaming core: the initial tweak T₀ is the K2
//! encryption of the tweak bytes, block i is
//! `C_i = E_K1(P_i ⊕ T_i) ⊕ T_i`, and T advances by multiplication with
//! x in GF(2¹²⁸). Inputs whose length is not a multiple of 16 are
//! handled with ciphertext stealing, swapping the last two blocks on the
//! wire.

use crate::provider::BlockCipher;
use gmcore_types::CryptoError;
use subtle::ConstantTimeEq;

/// XTS block size; the mode is only defined for 128-bit ciphers.
pub const XTS_BLOCK_SIZE: usize = 16;

/// Tweak-advance convention, fixed at construction.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Variant {
    /// IEEE P1619: little-endian-bit carry, feedback 0x87 into byte 0.
    P1619,
    /// GB/T 17964-2021: bit-reflected carry, feedback 0xE1 into byte 0.
    Gb,
}

/// Shared XTS state: the data cipher, the running tweak and the variant.
struct Xts<C: BlockCipher> {
    k1: C,
    tweak: [u8; XTS_BLOCK_SIZE],
    variant: Variant,
}

impl<C: BlockCipher> Xts<C> {
    fn new<F>(
        cipher_factory: F,
        key1: &[u8],
        key2: &[u8],
        tweak: &[u8],
        variant: Variant,
    ) -> Result<Self, CryptoError>
    where
        F: Fn(&[u8]) -> Result<C, CryptoError>,
    {
        if tweak.len() != XTS_BLOCK_SIZE {
            return Err(CryptoError::InvalidArg);
        }
        // Equal key halves collapse XTS to unprotected ECB-with-mask;
        // GB/T 17964 requires the halves to differ.
        if key1.len() == key2.len() && bool::from(key1.ct_eq(key2)) {
            return Err(CryptoError::WeakXtsKey);
        }

        let k1 = cipher_factory(key1)?;
        let k2 = cipher_factory(key2)?;
        if k1.block_size() != XTS_BLOCK_SIZE || k2.block_size() != XTS_BLOCK_SIZE {
            return Err(CryptoError::InvalidArg);
        }

        let mut t0 = [0u8; XTS_BLOCK_SIZE];
        t0.copy_from_slice(tweak);
        k2.encrypt_block(&mut t0)?;

        Ok(Self {
            k1,
            tweak: t0,
            variant,
        })
    }

    /// Advance the tweak: multiply by x in GF(2¹²⁸) modulo
    /// x¹²⁸ + x⁷ + x² + x + 1, in the bit order of the variant.
    fn advance_tweak(&mut self) {
        mul2(&mut self.tweak, self.variant == Variant::Gb);
    }
}

fn mul2(tweak: &mut [u8; XTS_BLOCK_SIZE], gb: bool) {
    let mut carry = 0u8;
    if !gb {
        // Byte 0 is least significant; the x¹²⁷ coefficient is the top
        // bit of byte 15.
        for byte in tweak.iter_mut() {
            let next = *byte >> 7;
            *byte = (*byte << 1) | carry;
            carry = next;
        }
        if carry != 0 {
            tweak[0] ^= 0x87;
        }
    } else {
        // GB/T 17964-2021 reads bits in the reflected order: the x⁰
        // coefficient is the top bit of byte 0.
        for byte in tweak.iter_mut() {
            let next = *byte & 1;
            *byte = (*byte >> 1) | (carry << 7);
            carry = next;
        }
        if carry != 0 {
            tweak[0] ^= 0xE1;
        }
    }
}

fn xor_into(dst: &mut [u8], a: &[u8], b: &[u8]) {
    for ((d, &x), &y) in dst.iter_mut().zip(a).zip(b) {
        *d = x ^ y;
    }
}

fn check_lengths(dst: &[u8], src: &[u8]) -> Result<(), CryptoError> {
    if src.len() < XTS_BLOCK_SIZE {
        return Err(CryptoError::ShortInput);
    }
    if dst.len() < src.len() {
        return Err(CryptoError::BufferTooSmall {
            need: src.len(),
            got: dst.len(),
        });
    }
    Ok(())
}

/// Streaming XTS encrypter. Not safe for concurrent use; distinct
/// instances over the same keys are independent.
pub struct XtsEncrypter<C: BlockCipher>(Xts<C>);

/// Streaming XTS decrypter.
pub struct XtsDecrypter<C: BlockCipher>(Xts<C>);

impl<C: BlockCipher> XtsEncrypter<C> {
    /// IEEE P1619 encrypter with an explicit 16-byte tweak.
    pub fn new<F>(cipher_factory: F, key1: &[u8], key2: &[u8], tweak: &[u8]) -> Result<Self, CryptoError>
    where
        F: Fn(&[u8]) -> Result<C, CryptoError>,
    {
        Ok(Self(Xts::new(cipher_factory, key1, key2, tweak, Variant::P1619)?))
    }

    /// IEEE P1619 encrypter for a numbered sector.
    pub fn new_with_sector<F>(
        cipher_factory: F,
        key1: &[u8],
        key2: &[u8],
        sector: u64,
    ) -> Result<Self, CryptoError>
    where
        F: Fn(&[u8]) -> Result<C, CryptoError>,
    {
        Ok(Self(Xts::new(
            cipher_factory,
            key1,
            key2,
            &sector_tweak(sector),
            Variant::P1619,
        )?))
    }

    /// GB/T 17964-2021 encrypter with an explicit 16-byte tweak.
    pub fn new_gb<F>(cipher_factory: F, key1: &[u8], key2: &[u8], tweak: &[u8]) -> Result<Self, CryptoError>
    where
        F: Fn(&[u8]) -> Result<C, CryptoError>,
    {
        Ok(Self(Xts::new(cipher_factory, key1, key2, tweak, Variant::Gb)?))
    }

    /// Encrypt `src` into `dst`. `src` must be at least one block; `dst`
    /// must be at least as long as `src`. Output length equals input
    /// length exactly.
    pub fn encrypt(&mut self, dst: &mut [u8], src: &[u8]) -> Result<(), CryptoError> {
        check_lengths(dst, src)?;
        let xts = &mut self.0;

        let full = src.len() / XTS_BLOCK_SIZE;
        let remain = src.len() % XTS_BLOCK_SIZE;

        let mut block = [0u8; XTS_BLOCK_SIZE];
        for i in 0..full {
            let off = i * XTS_BLOCK_SIZE;
            xor_into(&mut block, &src[off..off + XTS_BLOCK_SIZE], &xts.tweak);
            xts.k1.encrypt_block(&mut block)?;
            xor_into(
                &mut dst[off..off + XTS_BLOCK_SIZE],
                &block,
                &xts.tweak,
            );
            xts.advance_tweak();
        }

        if remain > 0 {
            // Ciphertext stealing: the final short block takes the head
            // of the previous ciphertext block, whose slot is
            // re-encrypted under the next tweak.
            let prev = (full - 1) * XTS_BLOCK_SIZE;
            let tail = full * XTS_BLOCK_SIZE;

            let mut stolen = [0u8; XTS_BLOCK_SIZE];
            stolen.copy_from_slice(&dst[prev..prev + XTS_BLOCK_SIZE]);
            dst[tail..tail + remain].copy_from_slice(&stolen[..remain]);

            stolen[..remain].copy_from_slice(&src[tail..]);
            xor_into(&mut block, &stolen, &xts.tweak);
            xts.k1.encrypt_block(&mut block)?;
            xor_into(&mut dst[prev..prev + XTS_BLOCK_SIZE], &block, &xts.tweak);
        }
        Ok(())
    }
}

impl<C: BlockCipher> XtsDecrypter<C> {
    /// IEEE P1619 decrypter with an explicit 16-byte tweak.
    pub fn new<F>(cipher_factory: F, key1: &[u8], key2: &[u8], tweak: &[u8]) -> Result<Self, CryptoError>
    where
        F: Fn(&[u8]) -> Result<C, CryptoError>,
    {
        Ok(Self(Xts::new(cipher_factory, key1, key2, tweak, Variant::P1619)?))
    }

    /// IEEE P1619 decrypter for a numbered sector.
    pub fn new_with_sector<F>(
        cipher_factory: F,
        key1: &[u8],
        key2: &[u8],
        sector: u64,
    ) -> Result<Self, CryptoError>
    where
        F: Fn(&[u8]) -> Result<C, CryptoError>,
    {
        Ok(Self(Xts::new(
            cipher_factory,
            key1,
            key2,
            &sector_tweak(sector),
            Variant::P1619,
        )?))
    }

    /// GB/T 17964-2021 decrypter with an explicit 16-byte tweak.
    pub fn new_gb<F>(cipher_factory: F, key1: &[u8], key2: &[u8], tweak: &[u8]) -> Result<Self, CryptoError>
    where
        F: Fn(&[u8]) -> Result<C, CryptoError>,
    {
        Ok(Self(Xts::new(cipher_factory, key1, key2, tweak, Variant::Gb)?))
    }

    /// Decrypt `src` into `dst`, mirroring [`XtsEncrypter::encrypt`].
    pub fn decrypt(&mut self, dst: &mut [u8], src: &[u8]) -> Result<(), CryptoError> {
        check_lengths(dst, src)?;
        let xts = &mut self.0;

        let full = src.len() / XTS_BLOCK_SIZE;
        let remain = src.len() % XTS_BLOCK_SIZE;
        // With a trailing partial block the second-to-last ciphertext
        // block was produced under the later tweak, so stop the plain
        // loop one block early.
        let straight = if remain == 0 { full } else { full - 1 };

        let mut block = [0u8; XTS_BLOCK_SIZE];
        for i in 0..straight {
            let off = i * XTS_BLOCK_SIZE;
            xor_into(&mut block, &src[off..off + XTS_BLOCK_SIZE], &xts.tweak);
            xts.k1.decrypt_block(&mut block)?;
            xor_into(
                &mut dst[off..off + XTS_BLOCK_SIZE],
                &block,
                &xts.tweak,
            );
            xts.advance_tweak();
        }

        if remain > 0 {
            let prev = (full - 1) * XTS_BLOCK_SIZE;
            let tail = full * XTS_BLOCK_SIZE;

            let t_last = xts.tweak;
            xts.advance_tweak();

            // Undo the swapped block first (it used the later tweak).
            xor_into(&mut block, &src[prev..prev + XTS_BLOCK_SIZE], &xts.tweak);
            xts.k1.decrypt_block(&mut block)?;
            let mut pp = [0u8; XTS_BLOCK_SIZE];
            xor_into(&mut pp, &block, &xts.tweak);

            // Reassemble the stolen ciphertext block and decrypt it
            // under the earlier tweak.
            let mut cc = [0u8; XTS_BLOCK_SIZE];
            cc[..remain].copy_from_slice(&src[tail..]);
            cc[remain..].copy_from_slice(&pp[remain..]);
            xor_into(&mut block, &cc, &t_last);
            xts.k1.decrypt_block(&mut block)?;
            xor_into(&mut dst[prev..prev + XTS_BLOCK_SIZE], &block, &t_last);

            dst[tail..tail + remain].copy_from_slice(&pp[..remain]);
        }
        Ok(())
    }
}

/// P1619 sector-number tweak: the 64-bit sector little-endian in the
/// first 8 bytes, zero elsewhere.
fn sector_tweak(sector: u64) -> [u8; XTS_BLOCK_SIZE] {
    let mut tweak = [0u8; XTS_BLOCK_SIZE];
    tweak[..8].copy_from_slice(&sector.to_le_bytes());
    tweak
}

#[cfg(all(test, feature = "sm4"))]
mod tests {
    use super::*;
    use crate::sm4::Sm4Key;

    fn from_hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    struct SectorVector {
        key: &'static str,
        sector: u64,
        plaintext: &'static str,
        ciphertext: &'static str,
    }

    // XTS-SM4-128 vectors (sector-numbered P1619 construction).
    const SECTOR_VECTORS: &[SectorVector] = &[
        SectorVector {
            key: "0000000000000000000000000000000000000000000000000000000000000000",
            sector: 0,
            plaintext: "0000000000000000000000000000000000000000000000000000000000000000",
            ciphertext: "d9b421f731c894fdc35b77291fe4e3b02a1fb76698d59f0e51376c4ada5bc75d",
        },
        SectorVector {
            key: "1111111111111111111111111111111122222222222222222222222222222222",
            sector: 0x3333333333,
            plaintext: "4444444444444444444444444444444444444444444444444444444444444444",
            ciphertext: "a74d726c11196a32be04e001ff29d0c7932f9f3ec29bfcb64dd17f63cbd3ea31",
        },
        SectorVector {
            key: "fffefdfcfbfaf9f8f7f6f5f4f3f2f1f022222222222222222222222222222222",
            sector: 0x3333333333,
            plaintext: "4444444444444444444444444444444444444444444444444444444444444444",
            ciphertext: "7f76088effadf70c02ea9f95da0628d351bfcb9eac0563bcf17b710dab0a9826",
        },
        // Ciphertext-stealing vectors: 25 bytes, one stolen tail.
        SectorVector {
            key: "c46acc2e7e013cb71cdbf750cf76b000249fbf4fb6cd17607773c23ffa2c4330",
            sector: 94,
            plaintext: "7e9c2289cba460e470222953439cdaa892a5433d4dab2a3f67",
            ciphertext: "c3cf5445c64aa518f4abce2848faddfb4605d9fb66f1f12c0c",
        },
        SectorVector {
            key: "56ffcc9bbbdf413f0fc0f888f44b7493bb1925a39b8adf02d9009bb16db0a887",
            sector: 144,
            plaintext: "9a839cc14363bafcfc0cc93b14f8e769d35b94cc98267438e3",
            ciphertext: "af027012c829206c32a31706999d046f10a83bcacbc5c96353",
        },
        SectorVector {
            key: "7454a43b87b1cf0dec95032c22873be3cace3bb795568854c1a008c07c5813f3",
            sector: 108,
            plaintext: "41088fa15195b2733fe824d2c1fdc8306080863945fb2a73cf",
            ciphertext: "614ee9311a53791889338eb2f66fedff7dc15126349bed1465",
        },
    ];

    #[test]
    fn p1619_sector_vectors() {
        for (i, v) in SECTOR_VECTORS.iter().enumerate() {
            let key = from_hex(v.key);
            let (k1, k2) = key.split_at(key.len() / 2);
            let plaintext = from_hex(v.plaintext);
            let expected = from_hex(v.ciphertext);

            let mut enc = XtsEncrypter::new_with_sector(Sm4Key::new, k1, k2, v.sector).unwrap();
            let mut ciphertext = vec![0u8; plaintext.len()];
            enc.encrypt(&mut ciphertext, &plaintext).unwrap();
            assert_eq!(ciphertext, expected, "vector #{i} encrypt");

            let mut dec = XtsDecrypter::new_with_sector(Sm4Key::new, k1, k2, v.sector).unwrap();
            let mut decrypted = vec![0u8; ciphertext.len()];
            dec.decrypt(&mut decrypted, &ciphertext).unwrap();
            assert_eq!(decrypted, plaintext, "vector #{i} decrypt");
        }
    }

    // GB/T 17964-2021 B.7
    #[test]
    fn gb_explicit_tweak_vector() {
        let key = from_hex("2B7E151628AED2A6ABF7158809CF4F3C000102030405060708090A0B0C0D0E0F");
        let (k1, k2) = key.split_at(16);
        let tweak = from_hex("F0F1F2F3F4F5F6F7F8F9FAFBFCFDFEFF");
        let plaintext = from_hex(
            "6BC1BEE22E409F96E93D7E117393172AAE2D8A571E03AC9C9EB76FAC45AF8E51\
             30C81C46A35CE411E5FBC1191A0A52EFF69F2445DF4F9B17",
        );
        let expected = from_hex(
            "E9538251C71D7B80BBE4483FEF497BD12C5C581BD6242FC51E08964FB4F60FDB\
             0BA42F63499279213D318D2C11F6886E903BE7F93A1B3479",
        );

        let mut enc = XtsEncrypter::new_gb(Sm4Key::new, k1, k2, &tweak).unwrap();
        let mut ciphertext = vec![0u8; plaintext.len()];
        enc.encrypt(&mut ciphertext, &plaintext).unwrap();
        assert_eq!(ciphertext, expected);

        let mut dec = XtsDecrypter::new_gb(Sm4Key::new, k1, k2, &tweak).unwrap();
        let mut decrypted = vec![0u8; ciphertext.len()];
        dec.decrypt(&mut decrypted, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn explicit_tweak_matches_sector_form() {
        let key = from_hex("1111111111111111111111111111111122222222222222222222222222222222");
        let (k1, k2) = key.split_at(16);
        let plaintext = [0x44u8; 64];

        let mut tweak = [0u8; 16];
        tweak[..8].copy_from_slice(&0x3333333333u64.to_le_bytes());

        let mut by_sector = XtsEncrypter::new_with_sector(Sm4Key::new, k1, k2, 0x3333333333).unwrap();
        let mut by_tweak = XtsEncrypter::new(Sm4Key::new, k1, k2, &tweak).unwrap();

        let mut c1 = [0u8; 64];
        let mut c2 = [0u8; 64];
        by_sector.encrypt(&mut c1, &plaintext).unwrap();
        by_tweak.encrypt(&mut c2, &plaintext).unwrap();
        assert_eq!(c1, c2);
    }

    #[test]
    fn single_block_no_stealing() {
        let key = [0x11u8; 32];
        let (k1, k2) = key.split_at(16);
        let plaintext = [0xA5u8; 16];

        let mut enc = XtsEncrypter::new_with_sector(Sm4Key::new, k1, k2, 7).unwrap();
        let mut ciphertext = [0u8; 16];
        enc.encrypt(&mut ciphertext, &plaintext).unwrap();

        let mut dec = XtsDecrypter::new_with_sector(Sm4Key::new, k1, k2, 7).unwrap();
        let mut decrypted = [0u8; 16];
        dec.decrypt(&mut decrypted, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn seventeen_bytes_steals_one() {
        let key = [0x42u8; 32];
        let (k1, k2) = key.split_at(16);
        let plaintext: Vec<u8> = (0u8..17).collect();

        let mut enc = XtsEncrypter::new_with_sector(Sm4Key::new, k1, k2, 3).unwrap();
        let mut ciphertext = vec![0u8; 17];
        enc.encrypt(&mut ciphertext, &plaintext).unwrap();

        // The trailing byte must be the head of what block 0 would have
        // been; in particular the output length is preserved.
        assert_eq!(ciphertext.len(), 17);

        let mut dec = XtsDecrypter::new_with_sector(Sm4Key::new, k1, k2, 3).unwrap();
        let mut decrypted = vec![0u8; 17];
        dec.decrypt(&mut decrypted, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn roundtrip_every_tail_length() {
        let key: Vec<u8> = (0u8..32).collect();
        let (k1, k2) = key.split_at(16);
        for len in 16..=64usize {
            let plaintext: Vec<u8> = (0..len as u8).map(|b| b.wrapping_mul(17)).collect();
            let mut enc = XtsEncrypter::new_with_sector(Sm4Key::new, k1, k2, 9).unwrap();
            let mut dec = XtsDecrypter::new_with_sector(Sm4Key::new, k1, k2, 9).unwrap();
            let mut ciphertext = vec![0u8; len];
            let mut decrypted = vec![0u8; len];
            enc.encrypt(&mut ciphertext, &plaintext).unwrap();
            dec.decrypt(&mut decrypted, &ciphertext).unwrap();
            assert_eq!(decrypted, plaintext, "length {len}");
        }
    }

    #[test]
    fn gb_roundtrip_every_tail_length() {
        let key: Vec<u8> = (100u8..132).collect();
        let (k1, k2) = key.split_at(16);
        let tweak = [0x5Cu8; 16];
        for len in 16..=48usize {
            let plaintext: Vec<u8> = (0..len as u8).collect();
            let mut enc = XtsEncrypter::new_gb(Sm4Key::new, k1, k2, &tweak).unwrap();
            let mut dec = XtsDecrypter::new_gb(Sm4Key::new, k1, k2, &tweak).unwrap();
            let mut ciphertext = vec![0u8; len];
            let mut decrypted = vec![0u8; len];
            enc.encrypt(&mut ciphertext, &plaintext).unwrap();
            dec.decrypt(&mut decrypted, &ciphertext).unwrap();
            assert_eq!(decrypted, plaintext, "length {len}");
        }
    }

    #[test]
    fn block_aligned_streaming_matches_one_shot() {
        let key = [0x77u8; 32];
        let (k1, k2) = key.split_at(16);
        let plaintext: Vec<u8> = (0..96u8).collect();

        let mut whole = XtsEncrypter::new_with_sector(Sm4Key::new, k1, k2, 5).unwrap();
        let mut expected = vec![0u8; 96];
        whole.encrypt(&mut expected, &plaintext).unwrap();

        let mut streamed = XtsEncrypter::new_with_sector(Sm4Key::new, k1, k2, 5).unwrap();
        let mut out = vec![0u8; 96];
        streamed.encrypt(&mut out[..32], &plaintext[..32]).unwrap();
        streamed.encrypt(&mut out[32..], &plaintext[32..]).unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn short_input_rejected() {
        let key = [0x01u8; 32];
        let (k1, k2) = key.split_at(16);
        let mut enc = XtsEncrypter::new_with_sector(Sm4Key::new, k1, k2, 0).unwrap();
        let mut out = [0u8; 15];
        assert!(matches!(
            enc.encrypt(&mut out, &[0u8; 15]),
            Err(CryptoError::ShortInput)
        ));
    }

    #[test]
    fn short_destination_rejected() {
        let key = [0x01u8; 32];
        let (k1, k2) = key.split_at(16);
        let mut enc = XtsEncrypter::new_with_sector(Sm4Key::new, k1, k2, 0).unwrap();
        let mut out = [0u8; 16];
        assert!(enc.encrypt(&mut out, &[0u8; 32]).is_err());
    }

    #[test]
    fn equal_key_halves_rejected() {
        let key = [0x01u8; 32];
        let (k1, _) = key.split_at(16);
        assert!(matches!(
            XtsEncrypter::new_with_sector(Sm4Key::new, k1, k1, 0),
            Err(CryptoError::WeakXtsKey)
        ));
    }

    #[test]
    fn wrong_tweak_length_rejected() {
        let key: Vec<u8> = (0u8..32).collect();
        let (k1, k2) = key.split_at(16);
        assert!(XtsEncrypter::new(Sm4Key::new, k1, k2, &[0u8; 8]).is_err());
    }
}
