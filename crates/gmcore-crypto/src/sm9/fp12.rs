//! F_p¹² = F_p⁴[w]/(w³ - v) arithmetic for SM9 BN256.

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use super::curve::{GAMMA1, GAMMA2};
use super::fp4::Fp4;

/// c0 + c1·w + c2·w² with w³ = v.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Fp12 {
    pub c0: Fp4,
    pub c1: Fp4,
    pub c2: Fp4,
}

impl Fp12 {
    pub const fn one() -> Self {
        Self {
            c0: Fp4::one(),
            c1: Fp4::zero(),
            c2: Fp4::zero(),
        }
    }

    pub const fn new(c0: Fp4, c1: Fp4, c2: Fp4) -> Self {
        Self { c0, c1, c2 }
    }

    pub fn is_one(&self) -> Choice {
        self.ct_eq(&Fp12::one())
    }

    /// Three-term Karatsuba over F_p⁴ (six F_p⁴ multiplies), with the
    /// overflow terms wrapped through w³ = v.
    pub fn mul(&self, rhs: &Fp12) -> Fp12 {
        let v0 = self.c0.mul(&rhs.c0);
        let v1 = self.c1.mul(&rhs.c1);
        let v2 = self.c2.mul(&rhs.c2);

        let t12 = self
            .c1
            .add(&self.c2)
            .mul(&rhs.c1.add(&rhs.c2))
            .sub(&v1)
            .sub(&v2);
        let t01 = self
            .c0
            .add(&self.c1)
            .mul(&rhs.c0.add(&rhs.c1))
            .sub(&v0)
            .sub(&v1);
        let t02 = self
            .c0
            .add(&self.c2)
            .mul(&rhs.c0.add(&rhs.c2))
            .sub(&v0)
            .sub(&v2);

        Fp12 {
            c0: v0.add(&t12.mul_v()),
            c1: t01.add(&v2.mul_v()),
            c2: t02.add(&v1),
        }
    }

    pub fn sqr(&self) -> Fp12 {
        self.mul(self)
    }

    /// Adjugate inversion; zero maps to zero.
    pub fn invert(&self) -> Fp12 {
        let a = self.c0.sqr().sub(&self.c1.mul(&self.c2).mul_v());
        let b = self.c2.sqr().mul_v().sub(&self.c0.mul(&self.c1));
        let c = self.c1.sqr().sub(&self.c0.mul(&self.c2));

        let det = self
            .c0
            .mul(&a)
            .add(&self.c2.mul(&b).mul_v())
            .add(&self.c1.mul(&c).mul_v());
        let inv = det.invert();

        Fp12 {
            c0: a.mul(&inv),
            c1: b.mul(&inv),
            c2: c.mul(&inv),
        }
    }

    /// The p⁶-power Frobenius (w ↦ -w, v ↦ -v). On the cyclotomic
    /// subgroup this is the multiplicative inverse.
    pub fn conjugate(&self) -> Fp12 {
        Fp12 {
            c0: self.c0.conjugate(),
            c1: self.c1.conjugate().neg(),
            c2: self.c2.conjugate(),
        }
    }

    /// The p-power Frobenius:
    /// f^p = φ(c0) + φ(c1)·γ₁·w + φ(c2)·γ₁²·w², with φ the F_p⁴
    /// Frobenius and γ₁ = u^((p-1)/6) ∈ F_p for this curve.
    pub fn frobenius(&self) -> Fp12 {
        Fp12 {
            c0: self.c0.frobenius(),
            c1: self.c1.frobenius().mul_fp(&GAMMA1),
            c2: self.c2.frobenius().mul_fp(&GAMMA2),
        }
    }

    /// The p²-power Frobenius, two applications of [`Fp12::frobenius`].
    pub fn frobenius2(&self) -> Fp12 {
        self.frobenius().frobenius()
    }

    /// Fixed-width exponentiation over a 256-bit big-endian exponent.
    /// Runs all 256 iterations with a selected multiply, so secret
    /// exponents do not shape the instruction stream.
    pub fn pow_bytes(&self, exp: &[u8; 32]) -> Fp12 {
        let mut acc = Fp12::one();
        for byte in exp {
            for bit in (0..8).rev() {
                acc = acc.sqr();
                let multiplied = acc.mul(self);
                let take = Choice::from((byte >> bit) & 1);
                acc = Fp12::conditional_select(&acc, &multiplied, take);
            }
        }
        acc
    }
}

impl ConditionallySelectable for Fp12 {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Fp12 {
            c0: Fp4::conditional_select(&a.c0, &b.c0, choice),
            c1: Fp4::conditional_select(&a.c1, &b.c1, choice),
            c2: Fp4::conditional_select(&a.c2, &b.c2, choice),
        }
    }
}

impl ConstantTimeEq for Fp12 {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.c0.ct_eq(&other.c0) & self.c1.ct_eq(&other.c1) & self.c2.ct_eq(&other.c2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::fp::Fp;
    use super::super::fp2::Fp2;

    fn sample(seed: u64) -> Fp12 {
        let e = |k: u64| Fp::from_u64(seed.wrapping_mul(k).wrapping_add(k));
        Fp12::new(
            Fp4::new(Fp2::new(e(1), e(2)), Fp2::new(e(3), e(4))),
            Fp4::new(Fp2::new(e(5), e(6)), Fp2::new(e(7), e(8))),
            Fp4::new(Fp2::new(e(9), e(10)), Fp2::new(e(11), e(12))),
        )
    }

    #[test]
    fn ring_identities() {
        let a = sample(17);
        let b = sample(39);
        assert_eq!(a.mul(&Fp12::one()), a);
        assert_eq!(a.mul(&b), b.mul(&a));
        assert_eq!(a.sqr(), a.mul(&a));
    }

    #[test]
    fn associativity() {
        let a = sample(5);
        let b = sample(6);
        let c = sample(7);
        assert_eq!(a.mul(&b).mul(&c), a.mul(&b.mul(&c)));
    }

    #[test]
    fn inversion() {
        let a = sample(123);
        assert_eq!(a.mul(&a.invert()), Fp12::one());
    }

    #[test]
    fn conjugate_is_involution() {
        let a = sample(9);
        assert_eq!(a.conjugate().conjugate(), a);
    }

    #[test]
    fn frobenius_commutes_with_mul() {
        let a = sample(21);
        let b = sample(42);
        assert_eq!(a.frobenius().mul(&b.frobenius()), a.mul(&b).frobenius());
    }

    #[test]
    fn frobenius_order_twelve() {
        let a = sample(3);
        let mut f = a;
        for _ in 0..12 {
            f = f.frobenius();
        }
        assert_eq!(f, a);
        // six applications are the conjugation
        let mut g = a;
        for _ in 0..6 {
            g = g.frobenius();
        }
        assert_eq!(g, a.conjugate());
    }

    #[test]
    fn pow_matches_repeated_mul() {
        let a = sample(77);
        let mut exp = [0u8; 32];
        exp[31] = 13;
        let mut expect = Fp12::one();
        for _ in 0..13 {
            expect = expect.mul(&a);
        }
        assert_eq!(a.pow_bytes(&exp), expect);
    }
}
