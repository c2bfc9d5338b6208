//! G2 point operations on the sextic twist E'(F_p²): y² = x³ + 5u.
//!
//! Jacobian coordinates over F_p². Unlike G1, the twist curve has a
//! large cofactor, so decoded points are additionally checked for
//! prime-order subgroup membership.

use std::sync::OnceLock;

use gmcore_bignum::BigNum;
use gmcore_types::CryptoError;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use super::curve;
use super::fp::Fp;
use super::fp2::{Fp2, FP2_BYTES};

/// Raw serialized length (x ‖ y, each an F_p² pair).
pub const G2_RAW_BYTES: usize = 2 * FP2_BYTES;

/// A point of the group G2.
#[derive(Clone, Copy, Debug)]
pub struct G2 {
    pub(crate) x: Fp2,
    pub(crate) y: Fp2,
    pub(crate) z: Fp2,
}

static BASE_TABLE: OnceLock<Vec<G2>> = OnceLock::new();

/// Twist coefficient b' = 5u.
fn twist_b() -> Fp2 {
    Fp2::new(Fp::zero(), Fp::from_u64(5))
}

impl G2 {
    /// The point at infinity.
    pub fn infinity() -> Self {
        Self {
            x: Fp2::one(),
            y: Fp2::one(),
            z: Fp2::zero(),
        }
    }

    pub fn is_infinity(&self) -> bool {
        bool::from(self.z.is_zero())
    }

    /// The generator P2 from GM/T 0044.
    pub fn generator() -> Self {
        Self::from_affine(
            Fp2::new(curve::p2_x0(), curve::p2_x1()),
            Fp2::new(curve::p2_y0(), curve::p2_y1()),
        )
    }

    pub(crate) fn from_affine(x: Fp2, y: Fp2) -> Self {
        Self {
            x,
            y,
            z: Fp2::one(),
        }
    }

    /// Affine coordinates; fails on the point at infinity.
    pub(crate) fn to_affine(&self) -> Result<(Fp2, Fp2), CryptoError> {
        if self.is_infinity() {
            return Err(CryptoError::PointAtInfinity);
        }
        let z_inv = self.z.invert();
        let z2 = z_inv.sqr();
        Ok((self.x.mul(&z2), self.y.mul(&z2).mul(&z_inv)))
    }

    /// Point doubling (a = 0 formulas).
    pub fn double(&self) -> Self {
        if self.is_infinity() {
            return *self;
        }
        let a = self.x.sqr();
        let b = self.y.sqr();
        let c = b.sqr();
        let d = self.x.add(&b).sqr().sub(&a).sub(&c).double();
        let e = a.mul_small(3);

        let x3 = e.sqr().sub(&d.double());
        let y3 = e.mul(&d.sub(&x3)).sub(&c.mul_small(8));
        let z3 = self.y.mul(&self.z).double();

        Self {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// Point addition.
    pub fn add(&self, other: &Self) -> Self {
        if self.is_infinity() {
            return *other;
        }
        if other.is_infinity() {
            return *self;
        }

        let z1_sq = self.z.sqr();
        let z2_sq = other.z.sqr();
        let u1 = self.x.mul(&z2_sq);
        let u2 = other.x.mul(&z1_sq);
        let s1 = self.y.mul(&z2_sq).mul(&other.z);
        let s2 = other.y.mul(&z1_sq).mul(&self.z);

        if u1 == u2 {
            if s1 == s2 {
                return self.double();
            }
            return Self::infinity();
        }

        let h = u2.sub(&u1);
        let r = s2.sub(&s1);
        let h_sq = h.sqr();
        let h_cu = h_sq.mul(&h);
        let u1h2 = u1.mul(&h_sq);

        let x3 = r.sqr().sub(&h_cu).sub(&u1h2.double());
        let y3 = r.mul(&u1h2.sub(&x3)).sub(&s1.mul(&h_cu));
        let z3 = self.z.mul(&other.z).mul(&h);

        Self {
            x: x3,
            y: y3,
            z: z3,
        }
    }

    /// Negation.
    pub fn neg(&self) -> Self {
        Self {
            x: self.x,
            y: self.y.neg(),
            z: self.z,
        }
    }

    /// [k]·self with the scalar reduced modulo the group order; fixed
    /// 256-iteration ladder.
    pub fn scalar_mul(&self, k: &BigNum) -> Result<Self, CryptoError> {
        Ok(self.mul_bytes(&curve::reduce_scalar(k)?))
    }

    pub(crate) fn mul_bytes(&self, k: &[u8; 32]) -> Self {
        let mut acc = Self::infinity();
        for byte in k {
            for bit in (0..8).rev() {
                acc = acc.double();
                let sum = acc.add(self);
                let take = Choice::from((byte >> bit) & 1);
                acc = Self::conditional_select(&acc, &sum, take);
            }
        }
        acc
    }

    /// [k]·P2 through a lazily built 4-bit window table.
    pub fn scalar_base_mult(k: &BigNum) -> Result<Self, CryptoError> {
        let table = BASE_TABLE.get_or_init(|| {
            let mut table = Vec::with_capacity(16);
            table.push(Self::infinity());
            let gen = Self::generator();
            for i in 1..16 {
                let next = table[i - 1].add(&gen);
                table.push(next);
            }
            table
        });

        let scalar = curve::reduce_scalar(k)?;
        let mut acc = Self::infinity();
        for byte in scalar {
            for nibble in [byte >> 4, byte & 0x0F] {
                for _ in 0..4 {
                    acc = acc.double();
                }
                acc = acc.add(&lookup(table, nibble));
            }
        }
        Ok(acc)
    }

    fn affine_on_curve(x: &Fp2, y: &Fp2) -> bool {
        let rhs = x.sqr().mul(x).add(&twist_b());
        y.sqr() == rhs
    }

    /// Membership in the order-n subgroup. The twist has a large
    /// cofactor, so this is a full scalar multiplication.
    fn in_subgroup(&self) -> bool {
        let mut n = [0u8; 32];
        n.copy_from_slice(&curve::order().to_bytes_be_padded(32));
        self.mul_bytes(&n).is_infinity()
    }

    /// Raw serialization x ‖ y in the SM9 order
    /// x1 ‖ x0 ‖ y1 ‖ y0; the point at infinity is all zeros.
    pub fn marshal(&self) -> [u8; G2_RAW_BYTES] {
        let mut out = [0u8; G2_RAW_BYTES];
        if self.is_infinity() {
            return out;
        }
        let Ok((x, y)) = self.to_affine() else {
            return out;
        };
        out[..FP2_BYTES].copy_from_slice(&x.to_bytes());
        out[FP2_BYTES..].copy_from_slice(&y.to_bytes());
        out
    }

    /// Parse the raw form: range check, curve check, subgroup check.
    pub fn unmarshal(data: &[u8]) -> Result<Self, CryptoError> {
        if data.len() != G2_RAW_BYTES {
            return Err(CryptoError::InvalidPointEncoding);
        }
        if data.iter().all(|&b| b == 0) {
            return Ok(Self::infinity());
        }
        let x = Fp2::from_slice(&data[..FP2_BYTES])?;
        let y = Fp2::from_slice(&data[FP2_BYTES..])?;
        if !Self::affine_on_curve(&x, &y) {
            return Err(CryptoError::InvalidPointEncoding);
        }
        let point = Self::from_affine(x, y);
        if !point.in_subgroup() {
            return Err(CryptoError::NotInSubgroup);
        }
        Ok(point)
    }

    /// Uncompressed serialization 0x04 ‖ x ‖ y.
    pub fn marshal_uncompressed(&self) -> [u8; G2_RAW_BYTES + 1] {
        let mut out = [0u8; G2_RAW_BYTES + 1];
        out[0] = 0x04;
        out[1..].copy_from_slice(&self.marshal());
        out
    }

    /// Compressed serialization (0x02 | y-parity) ‖ x.
    pub fn marshal_compressed(&self) -> Result<[u8; FP2_BYTES + 1], CryptoError> {
        let (x, y) = self.to_affine()?;
        let mut out = [0u8; FP2_BYTES + 1];
        out[0] = 0x02 | y.is_odd().unwrap_u8();
        out[1..].copy_from_slice(&x.to_bytes());
        Ok(out)
    }

    /// Parse the compressed form, recovering y via the F_p² square
    /// root.
    pub fn unmarshal_compressed(data: &[u8]) -> Result<Self, CryptoError> {
        if data.len() != FP2_BYTES + 1 || (data[0] != 0x02 && data[0] != 0x03) {
            return Err(CryptoError::InvalidPointEncoding);
        }
        let x = Fp2::from_slice(&data[1..])?;
        let y_sq = x.sqr().mul(&x).add(&twist_b());
        let y = y_sq.sqrt().ok_or(CryptoError::InvalidPointEncoding)?;
        let want_odd = Choice::from(data[0] & 1);
        let y = Fp2::conditional_select(&y, &y.neg(), y.is_odd() ^ want_odd);
        let point = Self::from_affine(x, y);
        if !point.in_subgroup() {
            return Err(CryptoError::NotInSubgroup);
        }
        Ok(point)
    }
}

/// Constant-time table lookup across all sixteen entries.
fn lookup(table: &[G2], index: u8) -> G2 {
    let mut acc = table[0];
    for (j, entry) in table.iter().enumerate() {
        acc = G2::conditional_select(&acc, entry, (j as u8).ct_eq(&index));
    }
    acc
}

impl ConditionallySelectable for G2 {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: Fp2::conditional_select(&a.x, &b.x, choice),
            y: Fp2::conditional_select(&a.y, &b.y, choice),
            z: Fp2::conditional_select(&a.z, &b.z, choice),
        }
    }
}

impl PartialEq for G2 {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_infinity(), other.is_infinity()) {
            (true, true) => return true,
            (false, false) => {}
            _ => return false,
        }
        let z1_sq = self.z.sqr();
        let z2_sq = other.z.sqr();
        let x_eq = self.x.mul(&z2_sq) == other.x.mul(&z1_sq);
        let y_eq = self.y.mul(&z2_sq).mul(&other.z) == other.y.mul(&z1_sq).mul(&self.z);
        x_eq && y_eq
    }
}

impl Eq for G2 {}
