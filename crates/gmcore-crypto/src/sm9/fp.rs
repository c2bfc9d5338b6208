//! Base-field arithmetic for the SM9 BN256 curve.
//!
//! Elements live in Montgomery form (x·R mod p with R = 2²⁵⁶) across
//! four 64-bit limbs. Multiplication is CIOS with interleaved reduction,
//! so no operation needs a data-dependent branch; additions and
//! subtractions finish with a masked conditional correction.

use gmcore_types::CryptoError;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// Serialized length of a field element.
pub(crate) const FP_BYTES: usize = 32;

/// p = 0xB640000002A3A6F1D603AB4FF58EC74521F2934B1A7AEEDBE56F9B27E351457D
const P: [u64; 4] = [
    0xe56f9b27e351457d,
    0x21f2934b1a7aeedb,
    0xd603ab4ff58ec745,
    0xb640000002a3a6f1,
];

/// -p⁻¹ mod 2⁶⁴, the Montgomery reduction factor.
const NP: u64 = 0x892bc42c2f2ee42b;

/// R mod p (the Montgomery representation of one).
const R1: [u64; 4] = [
    0x1a9064d81caeba83,
    0xde0d6cb4e5851124,
    0x29fc54b00a7138ba,
    0x49bffffffd5c590e,
];

/// R² mod p, for converting into Montgomery form.
const R2: [u64; 4] = [
    0x27dea312b417e2d2,
    0x88f8105fae1a5d3f,
    0xe479b522d6706e7b,
    0x2ea795a656f62fbd,
];

/// p - 2, the Fermat inversion exponent.
const P_MINUS_2: [u64; 4] = [
    0xe56f9b27e351457b,
    0x21f2934b1a7aeedb,
    0xd603ab4ff58ec745,
    0xb640000002a3a6f1,
];

/// (p - 5) / 8, the exponent of Atkin's square root (p ≡ 5 mod 8).
const SQRT_EXP: [u64; 4] = [
    0x7cadf364fc6a28af,
    0xa43e5269634f5ddb,
    0x3ac07569feb1d8e8,
    0x16c80000005474de,
];

#[inline]
const fn adc(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let t = a as u128 + b as u128 + carry as u128;
    (t as u64, (t >> 64) as u64)
}

#[inline]
const fn sbb(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let t = (a as u128).wrapping_sub(b as u128).wrapping_sub(borrow as u128);
    (t as u64, (t >> 127) as u64)
}

#[inline]
const fn mac(a: u64, b: u64, c: u64, carry: u64) -> (u64, u64) {
    let t = a as u128 + (b as u128) * (c as u128) + carry as u128;
    (t as u64, (t >> 64) as u64)
}

/// An element of F_p in Montgomery form, canonical in [0, p).
#[derive(Clone, Copy, Debug)]
pub(crate) struct Fp(pub(crate) [u64; 4]);

impl Fp {
    pub const fn zero() -> Self {
        Fp([0; 4])
    }

    pub const fn one() -> Self {
        Fp(R1)
    }

    /// Montgomery-encode a small integer.
    pub fn from_u64(v: u64) -> Self {
        Fp(mont_mul(&[v, 0, 0, 0], &R2))
    }

    /// Construct a field element already in Montgomery form. Used for
    /// the precomputed curve constants.
    pub const fn from_mont_limbs(limbs: [u64; 4]) -> Self {
        Fp(limbs)
    }

    /// Parse 32 canonical big-endian bytes. Rejects encodings ≥ p.
    pub fn from_slice(data: &[u8]) -> Result<Self, CryptoError> {
        if data.len() != FP_BYTES {
            return Err(CryptoError::InvalidPointEncoding);
        }
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            let chunk: [u8; 8] = data[8 * (3 - i)..8 * (4 - i)].try_into().unwrap();
            limbs[i] = u64::from_be_bytes(chunk);
        }
        // limbs must be strictly below p
        let mut borrow = 0;
        for i in 0..4 {
            let (_, b) = sbb(limbs[i], P[i], borrow);
            borrow = b;
        }
        if borrow == 0 {
            return Err(CryptoError::InvalidPointEncoding);
        }
        Ok(Fp(mont_mul(&limbs, &R2)))
    }

    /// Canonical big-endian bytes (Montgomery-decoded).
    pub fn to_bytes(&self) -> [u8; FP_BYTES] {
        let raw = mont_mul(&self.0, &[1, 0, 0, 0]);
        let mut out = [0u8; FP_BYTES];
        for i in 0..4 {
            out[8 * (3 - i)..8 * (4 - i)].copy_from_slice(&raw[i].to_be_bytes());
        }
        out
    }

    pub fn add(&self, rhs: &Fp) -> Fp {
        let mut d = [0u64; 4];
        let mut carry = 0;
        for i in 0..4 {
            let (v, c) = adc(self.0[i], rhs.0[i], carry);
            d[i] = v;
            carry = c;
        }
        reduce_once(d, carry)
    }

    pub fn sub(&self, rhs: &Fp) -> Fp {
        let mut d = [0u64; 4];
        let mut borrow = 0;
        for i in 0..4 {
            let (v, b) = sbb(self.0[i], rhs.0[i], borrow);
            d[i] = v;
            borrow = b;
        }
        // Add p back when the subtraction underflowed.
        let mask = borrow.wrapping_neg();
        let mut carry = 0;
        for i in 0..4 {
            let (v, c) = adc(d[i], P[i] & mask, carry);
            d[i] = v;
            carry = c;
        }
        Fp(d)
    }

    pub fn neg(&self) -> Fp {
        Fp::zero().sub(self)
    }

    pub fn double(&self) -> Fp {
        self.add(self)
    }

    pub fn mul(&self, rhs: &Fp) -> Fp {
        Fp(mont_mul(&self.0, &rhs.0))
    }

    pub fn sqr(&self) -> Fp {
        self.mul(self)
    }

    /// Multiply by a small constant via an addition chain.
    pub fn mul_small(&self, c: u64) -> Fp {
        debug_assert!(c > 0);
        let mut acc = Fp::zero();
        let mut base = *self;
        let mut k = c;
        while k > 0 {
            if k & 1 == 1 {
                acc = acc.add(&base);
            }
            base = base.double();
            k >>= 1;
        }
        acc
    }

    /// Fixed-width exponentiation; every iteration squares and performs
    /// a selected multiply, so the sequence of operations does not
    /// depend on the base.
    pub fn pow(&self, exp: &[u64; 4]) -> Fp {
        let mut acc = Fp::one();
        for i in (0..4).rev() {
            for bit in (0..64).rev() {
                acc = acc.sqr();
                let multiplied = acc.mul(self);
                let take = Choice::from(((exp[i] >> bit) & 1) as u8);
                acc = Fp::conditional_select(&acc, &multiplied, take);
            }
        }
        acc
    }

    /// Multiplicative inverse by Fermat's little theorem; maps zero to
    /// zero.
    pub fn invert(&self) -> Fp {
        self.pow(&P_MINUS_2)
    }

    /// Square root by Atkin's method for p ≡ 5 (mod 8):
    /// t = (2a)^((p-5)/8), i = 2a·t², r = a·t·(i - 1). Returns `None`
    /// for quadratic non-residues.
    pub fn sqrt(&self) -> Option<Fp> {
        let a2 = self.double();
        let t = a2.pow(&SQRT_EXP);
        let i = a2.mul(&t).mul(&t);
        let r = self.mul(&t).mul(&i.sub(&Fp::one()));
        if bool::from(r.sqr().ct_eq(self)) {
            Some(r)
        } else {
            None
        }
    }

    pub fn is_zero(&self) -> Choice {
        self.ct_eq(&Fp::zero())
    }

    /// Parity of the canonical representative.
    pub fn is_odd(&self) -> Choice {
        Choice::from(self.to_bytes()[FP_BYTES - 1] & 1)
    }
}

/// One conditional subtraction of p, folding in a carry-out limb.
#[inline]
fn reduce_once(d: [u64; 4], carry: u64) -> Fp {
    let mut e = [0u64; 4];
    let mut borrow = 0;
    for i in 0..4 {
        let (v, b) = sbb(d[i], P[i], borrow);
        e[i] = v;
        borrow = b;
    }
    let (_, borrow) = sbb(carry, 0, borrow);
    // borrow == 1 means d < p, keep d; otherwise keep the difference.
    let keep_d = borrow.wrapping_neg();
    let mut out = [0u64; 4];
    for i in 0..4 {
        out[i] = (d[i] & keep_d) | (e[i] & !keep_d);
    }
    Fp(out)
}

/// CIOS Montgomery multiplication: returns a·b·R⁻¹ mod p.
fn mont_mul(a: &[u64; 4], b: &[u64; 4]) -> [u64; 4] {
    let mut t = [0u64; 6];
    for i in 0..4 {
        // t += a * b[i]
        let mut carry = 0;
        for j in 0..4 {
            let (v, c) = mac(t[j], a[j], b[i], carry);
            t[j] = v;
            carry = c;
        }
        let (v, c) = adc(t[4], carry, 0);
        t[4] = v;
        t[5] = c;

        // fold in m·p so the low limb cancels
        let m = t[0].wrapping_mul(NP);
        let (_, mut carry) = mac(t[0], m, P[0], 0);
        for j in 1..4 {
            let (v, c) = mac(t[j], m, P[j], carry);
            t[j - 1] = v;
            carry = c;
        }
        let (v, c) = adc(t[4], carry, 0);
        t[3] = v;
        t[4] = t[5] + c;
        t[5] = 0;
    }
    reduce_once([t[0], t[1], t[2], t[3]], t[4]).0
}

impl ConditionallySelectable for Fp {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Fp([
            u64::conditional_select(&a.0[0], &b.0[0], choice),
            u64::conditional_select(&a.0[1], &b.0[1], choice),
            u64::conditional_select(&a.0[2], &b.0[2], choice),
            u64::conditional_select(&a.0[3], &b.0[3], choice),
        ])
    }
}

impl ConstantTimeEq for Fp {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[0].ct_eq(&other.0[0])
            & self.0[1].ct_eq(&other.0[1])
            & self.0[2].ct_eq(&other.0[2])
            & self.0[3].ct_eq(&other.0[3])
    }
}

impl PartialEq for Fp {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.ct_eq(other))
    }
}

impl Eq for Fp {}
