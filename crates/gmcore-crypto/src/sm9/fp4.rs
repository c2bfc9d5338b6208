//! F_p⁴ = F_p²[v]/(v² - u) arithmetic for SM9 BN256.

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use super::curve::BETA_FROB;
use super::fp::Fp;
use super::fp2::Fp2;

/// c0 + c1·v with v² = u.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Fp4 {
    pub c0: Fp2,
    pub c1: Fp2,
}

impl Fp4 {
    pub const fn zero() -> Self {
        Self {
            c0: Fp2::zero(),
            c1: Fp2::zero(),
        }
    }

    pub const fn one() -> Self {
        Self {
            c0: Fp2::one(),
            c1: Fp2::zero(),
        }
    }

    pub const fn new(c0: Fp2, c1: Fp2) -> Self {
        Self { c0, c1 }
    }

    pub fn add(&self, rhs: &Fp4) -> Fp4 {
        Fp4 {
            c0: self.c0.add(&rhs.c0),
            c1: self.c1.add(&rhs.c1),
        }
    }

    pub fn sub(&self, rhs: &Fp4) -> Fp4 {
        Fp4 {
            c0: self.c0.sub(&rhs.c0),
            c1: self.c1.sub(&rhs.c1),
        }
    }

    pub fn neg(&self) -> Fp4 {
        Fp4 {
            c0: self.c0.neg(),
            c1: self.c1.neg(),
        }
    }

    /// Karatsuba over F_p²: (c0·d0 + c1·d1·u) + (c0·d1 + c1·d0)·v.
    pub fn mul(&self, rhs: &Fp4) -> Fp4 {
        let cross = self.c0.add(&self.c1).mul(&rhs.c0.add(&rhs.c1));
        let v0 = self.c0.mul(&rhs.c0);
        let v1 = self.c1.mul(&rhs.c1);
        Fp4 {
            c0: v1.mul_u().add(&v0),
            c1: cross.sub(&v0).sub(&v1),
        }
    }

    pub fn sqr(&self) -> Fp4 {
        self.mul(self)
    }

    /// (c0 + c1·v)⁻¹ = (c0 - c1·v) / (c0² - c1²·u); zero maps to zero.
    pub fn invert(&self) -> Fp4 {
        let denom = self.c0.sqr().sub(&self.c1.sqr().mul_u());
        let inv = denom.invert();
        Fp4 {
            c0: self.c0.mul(&inv),
            c1: self.c1.neg().mul(&inv),
        }
    }

    /// Multiply by v: (c0 + c1·v)·v = c1·u + c0·v.
    pub fn mul_v(&self) -> Fp4 {
        Fp4 {
            c0: self.c1.mul_u(),
            c1: self.c0,
        }
    }

    /// v ↦ -v, the p²-power Frobenius on F_p⁴.
    pub fn conjugate(&self) -> Fp4 {
        Fp4 {
            c0: self.c0,
            c1: self.c1.neg(),
        }
    }

    /// The p-power Frobenius: (a + b·v)^p = ā + b̄·β·v with
    /// β = (-2)^((p-1)/4) ∈ F_p.
    pub fn frobenius(&self) -> Fp4 {
        Fp4 {
            c0: self.c0.conjugate(),
            c1: self.c1.conjugate().mul_fp(&BETA_FROB),
        }
    }

    /// Multiply by an F_p scalar.
    pub fn mul_fp(&self, s: &Fp) -> Fp4 {
        Fp4 {
            c0: self.c0.mul_fp(s),
            c1: self.c1.mul_fp(s),
        }
    }
}

impl ConditionallySelectable for Fp4 {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Fp4 {
            c0: Fp2::conditional_select(&a.c0, &b.c0, choice),
            c1: Fp2::conditional_select(&a.c1, &b.c1, choice),
        }
    }
}

impl ConstantTimeEq for Fp4 {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.c0.ct_eq(&other.c0) & self.c1.ct_eq(&other.c1)
    }
}
