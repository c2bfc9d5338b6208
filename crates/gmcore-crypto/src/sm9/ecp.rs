//! G1 point operations on E(F_p): y² = x³ + 5.
//!
//! Jacobian projective coordinates (X, Y, Z) with affine
//! (X/Z², Y/Z³); the point at infinity has Z = 0. E(F_p) has prime
//! order n (cofactor one), so on-curve points are automatically in the
//! pairing subgroup.

use std::sync::OnceLock;

use gmcore_bignum::BigNum;
use gmcore_types::CryptoError;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use super::curve;
use super::fp::{Fp, FP_BYTES};

/// Raw serialized length (x ‖ y).
pub const G1_RAW_BYTES: usize = 2 * FP_BYTES;

/// A point of the group G1.
#[derive(Clone, Copy, Debug)]
pub struct G1 {
    pub(crate) x: Fp,
    pub(crate) y: Fp,
    pub(crate) z: Fp,
}

static BASE_TABLE: OnceLock<Vec<G1>> = OnceLock::new();

impl G1 {
    /// The point at infinity.
    pub fn infinity() -> Self {
        Self {
            x: Fp::one(),
            y: Fp::one(),
            z: Fp::zero(),
        }
    }

    pub fn is_infinity(&self) -> bool {
        bool::from(self.z.is_zero())
    }

    /// The generator P1 from GM/T 0044.
    pub fn generator() -> Self {
        Self::from_affine(curve::p1_x(), curve::p1_y())
    }

    pub(crate) fn from_affine(x: Fp, y: Fp) -> Self {
        Self {
            x,
            y,
            z: Fp::one(),
        }
    }

    /// Affine coordinates; fails on the point at infinity.
    pub(crate) fn to_affine(&self) -> Result<(Fp, Fp), CryptoError> {
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

    /// Negation: (X, Y, Z) ↦ (X, -Y, Z).
    pub fn neg(&self) -> Self {
        Self {
            x: self.x,
            y: self.y.neg(),
            z: self.z,
        }
    }

    /// [k]·self. The scalar is reduced modulo the group order and the
    /// ladder always runs 256 double-and-select-add iterations.
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

    /// [k]·P1 through a lazily built 4-bit window table of the
    /// generator.
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

    /// Whether the (affine-decoded) point satisfies y² = x³ + 5.
    fn affine_on_curve(x: &Fp, y: &Fp) -> bool {
        let rhs = x.sqr().mul(x).add(&Fp::from_u64(5));
        y.sqr() == rhs
    }

    /// Raw serialization x ‖ y; the point at infinity is all zeros.
    pub fn marshal(&self) -> [u8; G1_RAW_BYTES] {
        let mut out = [0u8; G1_RAW_BYTES];
        if self.is_infinity() {
            return out;
        }
        let Ok((x, y)) = self.to_affine() else {
            return out;
        };
        out[..FP_BYTES].copy_from_slice(&x.to_bytes());
        out[FP_BYTES..].copy_from_slice(&y.to_bytes());
        out
    }

    /// Parse the raw form, validating range and curve membership.
    pub fn unmarshal(data: &[u8]) -> Result<Self, CryptoError> {
        if data.len() != G1_RAW_BYTES {
            return Err(CryptoError::InvalidPointEncoding);
        }
        if data.iter().all(|&b| b == 0) {
            return Ok(Self::infinity());
        }
        let x = Fp::from_slice(&data[..FP_BYTES])?;
        let y = Fp::from_slice(&data[FP_BYTES..])?;
        if !Self::affine_on_curve(&x, &y) {
            return Err(CryptoError::InvalidPointEncoding);
        }
        Ok(Self::from_affine(x, y))
    }

    /// Uncompressed serialization 0x04 ‖ x ‖ y.
    pub fn marshal_uncompressed(&self) -> [u8; G1_RAW_BYTES + 1] {
        let mut out = [0u8; G1_RAW_BYTES + 1];
        out[0] = 0x04;
        out[1..].copy_from_slice(&self.marshal());
        out
    }

    /// Compressed serialization (0x02 | y-parity) ‖ x. The point at
    /// infinity has no compressed form.
    pub fn marshal_compressed(&self) -> Result<[u8; FP_BYTES + 1], CryptoError> {
        let (x, y) = self.to_affine()?;
        let mut out = [0u8; FP_BYTES + 1];
        out[0] = 0x02 | y.is_odd().unwrap_u8();
        out[1..].copy_from_slice(&x.to_bytes());
        Ok(out)
    }

    /// Parse the compressed form, recovering y from the curve equation.
    pub fn unmarshal_compressed(data: &[u8]) -> Result<Self, CryptoError> {
        if data.len() != FP_BYTES + 1 || (data[0] != 0x02 && data[0] != 0x03) {
            return Err(CryptoError::InvalidPointEncoding);
        }
        let x = Fp::from_slice(&data[1..])?;
        let y_sq = x.sqr().mul(&x).add(&Fp::from_u64(5));
        let y = y_sq.sqrt().ok_or(CryptoError::InvalidPointEncoding)?;
        let want_odd = Choice::from(data[0] & 1);
        let y = Fp::conditional_select(&y, &y.neg(), y.is_odd() ^ want_odd);
        Ok(Self::from_affine(x, y))
    }
}

/// Constant-time table lookup across all sixteen entries.
fn lookup(table: &[G1], index: u8) -> G1 {
    let mut acc = table[0];
    for (j, entry) in table.iter().enumerate() {
        acc = G1::conditional_select(&acc, entry, (j as u8).ct_eq(&index));
    }
    acc
}

impl ConditionallySelectable for G1 {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: Fp::conditional_select(&a.x, &b.x, choice),
            y: Fp::conditional_select(&a.y, &b.y, choice),
            z: Fp::conditional_select(&a.z, &b.z, choice),
        }
    }
}

impl PartialEq for G1 {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_infinity(), other.is_infinity()) {
            (true, true) => return true,
            (false, false) => {}
            _ => return false,
        }
        // Cross-multiplied projective comparison.
        let z1_sq = self.z.sqr();
        let z2_sq = other.z.sqr();
        let x_eq = self.x.mul(&z2_sq) == other.x.mul(&z1_sq);
        let y_eq = self.y.mul(&z2_sq).mul(&other.z) == other.y.mul(&z1_sq).mul(&self.z);
        x_eq && y_eq
    }
}

impl Eq for G1 {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_on_curve() {
        let g = G1::generator();
        let (x, y) = g.to_affine().unwrap();
        assert!(G1::affine_on_curve(&x, &y));
    }

    #[test]
    fn identity_laws() {
        let g = G1::generator();
        let inf = G1::infinity();
        assert_eq!(inf.add(&g), g);
        assert_eq!(g.add(&inf), g);
        assert!(g.add(&g.neg()).is_infinity());
        assert_eq!(g.add(&g.neg()).add(&g), g);
    }

    #[test]
    fn double_matches_add() {
        let g = G1::generator();
        assert_eq!(g.double(), g.add(&g));
        let g4 = g.double().double();
        assert_eq!(g4, g.add(&g).add(&g).add(&g));
    }

    #[test]
    fn order_annihilates_generator() {
        let g = G1::generator();
        let n = curve::order();
        assert!(g.scalar_mul(&n).unwrap().is_infinity());
        // [n-1]P = -P
        let n_minus_1 = n.sub(&BigNum::from_u64(1));
        assert_eq!(g.scalar_mul(&n_minus_1).unwrap(), g.neg());
    }

    #[test]
    fn scalar_mul_small_values() {
        let g = G1::generator();
        assert!(g.scalar_mul(&BigNum::zero()).unwrap().is_infinity());
        assert_eq!(g.scalar_mul(&BigNum::from_u64(1)).unwrap(), g);
        assert_eq!(g.scalar_mul(&BigNum::from_u64(2)).unwrap(), g.double());
        assert_eq!(
            g.scalar_mul(&BigNum::from_u64(5)).unwrap(),
            g.double().double().add(&g)
        );
    }

    #[test]
    fn base_mult_matches_generic_mult() {
        let g = G1::generator();
        for k in [1u64, 2, 15, 16, 17, 0xFFFF_FFFF, 0x1234_5678_9ABC_DEF0] {
            let k = BigNum::from_u64(k);
            assert_eq!(G1::scalar_base_mult(&k).unwrap(), g.scalar_mul(&k).unwrap());
        }
    }

    #[test]
    fn scalar_mul_distributes() {
        let g = G1::generator();
        let a = BigNum::from_u64(1234567);
        let b = BigNum::from_u64(7654321);
        let lhs = g.scalar_mul(&a).unwrap().add(&g.scalar_mul(&b).unwrap());
        let rhs = g.scalar_mul(&a.add(&b)).unwrap();
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn raw_roundtrip() {
        let p = G1::generator().scalar_mul(&BigNum::from_u64(99)).unwrap();
        let bytes = p.marshal();
        assert_eq!(G1::unmarshal(&bytes).unwrap(), p);
    }

    #[test]
    fn infinity_roundtrip_is_all_zero() {
        let inf = G1::infinity();
        let bytes = inf.marshal();
        assert_eq!(bytes, [0u8; G1_RAW_BYTES]);
        assert!(G1::unmarshal(&bytes).unwrap().is_infinity());
    }

    #[test]
    fn compressed_roundtrip_both_parities() {
        for k in [7u64, 8, 1000, 1001] {
            let p = G1::generator().scalar_mul(&BigNum::from_u64(k)).unwrap();
            let bytes = p.marshal_compressed().unwrap();
            assert!(bytes[0] == 0x02 || bytes[0] == 0x03);
            assert_eq!(G1::unmarshal_compressed(&bytes).unwrap(), p);
        }
    }

    #[test]
    fn compressed_infinity_rejected() {
        assert!(G1::infinity().marshal_compressed().is_err());
    }

    #[test]
    fn off_curve_point_rejected() {
        let mut bytes = G1::generator().marshal();
        bytes[G1_RAW_BYTES - 1] ^= 1;
        assert!(matches!(
            G1::unmarshal(&bytes),
            Err(CryptoError::InvalidPointEncoding)
        ));
    }

    #[test]
    fn bad_tag_and_length_rejected() {
        let p = G1::generator();
        let mut compressed = p.marshal_compressed().unwrap();
        compressed[0] = 0x05;
        assert!(G1::unmarshal_compressed(&compressed).is_err());
        assert!(G1::unmarshal(&[0u8; 63]).is_err());
    }

    #[test]
    fn coordinate_above_modulus_rejected() {
        let mut bytes = [0u8; G1_RAW_BYTES];
        bytes[..32].copy_from_slice(&[0xFF; 32]);
        assert!(G1::unmarshal(&bytes).is_err());
    }
}
