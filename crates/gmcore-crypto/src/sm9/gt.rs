//! The pairing target group GT ⊂ F_p¹².
//!
//! [`Gt`] wraps a finalized Miller value. The API speaks the additive
//! group language of the source groups: `add` multiplies the underlying
//! field elements, `neg` conjugates (finalized values are unitary, so
//! the conjugate is the inverse), `scalar_mult` exponentiates.

use std::sync::OnceLock;

use gmcore_bignum::BigNum;
use gmcore_types::CryptoError;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use super::curve;
use super::ecp::G1;
use super::ecp2::G2;
use super::fp12::Fp12;
use super::fp2::FP2_BYTES;
use super::fp4::Fp4;
use super::key::random_scalar;
use super::pairing;

/// Serialized length: twelve 32-byte field elements.
pub const GT_BYTES: usize = 384;

/// An element of GT.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gt {
    pub(crate) p: Fp12,
}

static GEN: OnceLock<Gt> = OnceLock::new();
static GEN_TABLE: OnceLock<GtTable> = OnceLock::new();

impl Gt {
    /// The group identity.
    pub fn identity() -> Self {
        Self { p: Fp12::one() }
    }

    /// Whether this is the identity element.
    pub fn is_identity(&self) -> bool {
        bool::from(self.p.is_one())
    }

    /// The R-ate pairing e(P, Q).
    pub fn pair(p: &G1, q: &G2) -> Result<Self, CryptoError> {
        Ok(Self {
            p: pairing::pairing(p, q)?,
        })
    }

    /// The Miller function alone. Several Miller values can be
    /// accumulated with [`Gt::add`] and finalized once.
    pub fn miller(p: &G1, q: &G2) -> Result<Self, CryptoError> {
        Ok(Self {
            p: pairing::miller(p, q)?,
        })
    }

    /// Apply the final exponentiation to a Miller value.
    pub fn finalize(&self) -> Self {
        Self {
            p: pairing::final_exponentiation(&self.p),
        }
    }

    /// The generator e(P1, P2), computed at most once.
    pub fn generator() -> Result<&'static Gt, CryptoError> {
        if let Some(g) = GEN.get() {
            return Ok(g);
        }
        let g = Gt::pair(&G1::generator(), &G2::generator())?;
        Ok(GEN.get_or_init(|| g))
    }

    /// Group operation (multiplication in F_p¹²).
    pub fn add(&self, other: &Gt) -> Gt {
        Gt {
            p: self.p.mul(&other.p),
        }
    }

    /// Group inverse: complex conjugation on the cyclotomic subgroup.
    pub fn neg(&self) -> Gt {
        Gt {
            p: self.p.conjugate(),
        }
    }

    /// [k]·self (exponentiation), scalar reduced modulo n.
    pub fn scalar_mult(&self, k: &BigNum) -> Result<Gt, CryptoError> {
        Ok(Gt {
            p: self.p.pow_bytes(&curve::reduce_scalar(k)?),
        })
    }

    /// [k]·e(P1, P2) through a lazily built window table.
    pub fn scalar_base_mult(k: &BigNum) -> Result<Gt, CryptoError> {
        let table = match GEN_TABLE.get() {
            Some(table) => table,
            None => {
                let base = *Gt::generator()?;
                GEN_TABLE.get_or_init(|| GtTable::new(&base.p))
            }
        };
        Ok(Gt {
            p: table.pow(&curve::reduce_scalar(k)?),
        })
    }

    /// A random scalar k and [k]·e(P1, P2).
    pub fn random_gt() -> Result<(BigNum, Gt), CryptoError> {
        let k = random_scalar()?;
        let e = Gt::scalar_base_mult(&k)?;
        Ok((k, e))
    }

    /// Serialize the twelve coordinates, 32 big-endian bytes each, in
    /// the tower-canonical order (w² coefficient block first, inside
    /// each block the v coefficient first, then the u coefficient).
    pub fn marshal(&self) -> [u8; GT_BYTES] {
        let mut out = [0u8; GT_BYTES];
        for (i, c4) in [self.p.c2, self.p.c1, self.p.c0].iter().enumerate() {
            let off = i * 2 * FP2_BYTES;
            out[off..off + FP2_BYTES].copy_from_slice(&c4.c1.to_bytes());
            out[off + FP2_BYTES..off + 2 * FP2_BYTES].copy_from_slice(&c4.c0.to_bytes());
        }
        out
    }

    /// Parse a serialized element, returning any trailing bytes to the
    /// caller. Requires at least [`GT_BYTES`] bytes.
    pub fn unmarshal(data: &[u8]) -> Result<(Gt, &[u8]), CryptoError> {
        if data.len() < GT_BYTES {
            return Err(CryptoError::BufferTooSmall {
                need: GT_BYTES,
                got: data.len(),
            });
        }
        let mut coords = [Fp4::zero(); 3];
        for (i, c4) in coords.iter_mut().enumerate() {
            let off = i * 2 * FP2_BYTES;
            *c4 = Fp4::new(
                super::fp2::Fp2::from_slice(&data[off + FP2_BYTES..off + 2 * FP2_BYTES])?,
                super::fp2::Fp2::from_slice(&data[off..off + FP2_BYTES])?,
            );
        }
        Ok((
            Gt {
                p: Fp12::new(coords[2], coords[1], coords[0]),
            },
            &data[GT_BYTES..],
        ))
    }
}

/// A 4-bit window table over a fixed GT base, for repeated
/// exponentiation against the same element.
#[derive(Clone)]
pub(crate) struct GtTable {
    entries: Vec<Fp12>,
}

impl GtTable {
    /// Precompute base⁰ … base¹⁵.
    pub(crate) fn new(base: &Fp12) -> Self {
        let mut entries = Vec::with_capacity(16);
        entries.push(Fp12::one());
        for i in 1..16 {
            let next = entries[i - 1].mul(base);
            entries.push(next);
        }
        Self { entries }
    }

    /// base^k over a 256-bit big-endian scalar; the window entry is
    /// picked by constant-time sweep.
    pub(crate) fn pow(&self, k: &[u8; 32]) -> Fp12 {
        let mut acc = Fp12::one();
        for byte in k {
            for nibble in [byte >> 4, byte & 0x0F] {
                for _ in 0..4 {
                    acc = acc.sqr();
                }
                let mut entry = self.entries[0];
                for (j, e) in self.entries.iter().enumerate() {
                    entry = Fp12::conditional_select(&entry, e, (j as u8).ct_eq(&nibble));
                }
                acc = acc.mul(&entry);
            }
        }
        acc
    }
}

impl ConditionallySelectable for Gt {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Gt {
            p: Fp12::conditional_select(&a.p, &b.p, choice),
        }
    }
}
