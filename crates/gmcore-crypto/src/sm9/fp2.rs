//! F_p² = F_p[u]/(u² + 2) arithmetic for SM9 BN256.

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use super::fp::{Fp, FP_BYTES};
use gmcore_types::CryptoError;

/// Serialized length of an F_p² element.
pub(crate) const FP2_BYTES: usize = 2 * FP_BYTES;

/// c0 + c1·u with u² = -2.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Fp2 {
    pub c0: Fp,
    pub c1: Fp,
}

impl Fp2 {
    pub const fn zero() -> Self {
        Self {
            c0: Fp::zero(),
            c1: Fp::zero(),
        }
    }

    pub const fn one() -> Self {
        Self {
            c0: Fp::one(),
            c1: Fp::zero(),
        }
    }

    pub const fn new(c0: Fp, c1: Fp) -> Self {
        Self { c0, c1 }
    }

    pub fn is_zero(&self) -> Choice {
        self.c0.is_zero() & self.c1.is_zero()
    }

    pub fn add(&self, rhs: &Fp2) -> Fp2 {
        Fp2 {
            c0: self.c0.add(&rhs.c0),
            c1: self.c1.add(&rhs.c1),
        }
    }

    pub fn sub(&self, rhs: &Fp2) -> Fp2 {
        Fp2 {
            c0: self.c0.sub(&rhs.c0),
            c1: self.c1.sub(&rhs.c1),
        }
    }

    pub fn neg(&self) -> Fp2 {
        Fp2 {
            c0: self.c0.neg(),
            c1: self.c1.neg(),
        }
    }

    pub fn double(&self) -> Fp2 {
        Fp2 {
            c0: self.c0.double(),
            c1: self.c1.double(),
        }
    }

    /// Karatsuba: (a0 + a1·u)(b0 + b1·u) =
    /// (a0·b0 - 2·a1·b1) + (a0·b1 + a1·b0)·u, three base multiplies.
    pub fn mul(&self, rhs: &Fp2) -> Fp2 {
        let cross = self.c0.add(&self.c1).mul(&rhs.c0.add(&rhs.c1));
        let v0 = self.c0.mul(&rhs.c0);
        let v1 = self.c1.mul(&rhs.c1);
        Fp2 {
            c0: v0.sub(&v1.double()),
            c1: cross.sub(&v0).sub(&v1),
        }
    }

    /// (a0 + a1·u)² = (a0² - 2·a1²) + 2·a0·a1·u, using
    /// (a0 + a1)(a0 - a1) = a0² - a1².
    pub fn sqr(&self) -> Fp2 {
        let a1_sq = self.c1.sqr();
        let c0 = self
            .c0
            .add(&self.c1)
            .mul(&self.c0.sub(&self.c1))
            .sub(&a1_sq);
        let c1 = self.c0.mul(&self.c1).double();
        Fp2 { c0, c1 }
    }

    /// (a0 + a1·u)⁻¹ = (a0 - a1·u) / (a0² + 2·a1²); zero maps to zero.
    pub fn invert(&self) -> Fp2 {
        let norm = self.c0.sqr().add(&self.c1.sqr().double());
        let inv = norm.invert();
        Fp2 {
            c0: self.c0.mul(&inv),
            c1: self.c1.neg().mul(&inv),
        }
    }

    /// Multiply by an F_p scalar.
    pub fn mul_fp(&self, s: &Fp) -> Fp2 {
        Fp2 {
            c0: self.c0.mul(s),
            c1: self.c1.mul(s),
        }
    }

    /// Multiply by a small integer constant.
    pub fn mul_small(&self, c: u64) -> Fp2 {
        Fp2 {
            c0: self.c0.mul_small(c),
            c1: self.c1.mul_small(c),
        }
    }

    /// Multiply by u: (a0 + a1·u)·u = -2·a1 + a0·u.
    pub fn mul_u(&self) -> Fp2 {
        Fp2 {
            c0: self.c1.double().neg(),
            c1: self.c0,
        }
    }

    /// Complex conjugation, which is the p-power Frobenius on F_p².
    pub fn conjugate(&self) -> Fp2 {
        Fp2 {
            c0: self.c0,
            c1: self.c1.neg(),
        }
    }

    /// Square root via the norm map: with n = a0² + 2·a1² a square in
    /// F_p, a root x0 + x1·u satisfies x0² = (a0 ± √n)/2 and
    /// x1 = a1 / (2·x0). Returns `None` for non-squares.
    pub fn sqrt(&self) -> Option<Fp2> {
        if bool::from(self.c1.is_zero()) {
            // Purely real: either √a0 exists, or a0 = -2·x1² for some x1.
            if let Some(r) = self.c0.sqrt() {
                return Some(Fp2::new(r, Fp::zero()));
            }
            let x1_sq = self.c0.neg().mul(&Fp::from_u64(2).invert());
            return x1_sq.sqrt().map(|x1| Fp2::new(Fp::zero(), x1));
        }

        let n = self.c0.sqr().add(&self.c1.sqr().double());
        let m = n.sqrt()?;
        let half = Fp::from_u64(2).invert();

        let mut x0_sq = self.c0.add(&m).mul(&half);
        let x0 = match x0_sq.sqrt() {
            Some(r) => r,
            None => {
                x0_sq = self.c0.sub(&m).mul(&half);
                x0_sq.sqrt()?
            }
        };
        let x1 = self.c1.mul(&x0.double().invert());
        let cand = Fp2::new(x0, x1);
        if cand.sqr() == *self {
            Some(cand)
        } else {
            None
        }
    }

    /// Parity of the canonical encoding: the constant term decides,
    /// falling back to the u coefficient when it is zero.
    pub fn is_odd(&self) -> Choice {
        let c0_zero = self.c0.is_zero();
        Choice::conditional_select(&self.c0.is_odd(), &self.c1.is_odd(), c0_zero)
    }

    /// SM9 serialization: the u coefficient first, then the constant
    /// term, 32 big-endian bytes each.
    pub fn to_bytes(&self) -> [u8; FP2_BYTES] {
        let mut out = [0u8; FP2_BYTES];
        out[..FP_BYTES].copy_from_slice(&self.c1.to_bytes());
        out[FP_BYTES..].copy_from_slice(&self.c0.to_bytes());
        out
    }

    /// Parse the SM9 serialization, rejecting out-of-range components.
    pub fn from_slice(data: &[u8]) -> Result<Fp2, CryptoError> {
        if data.len() != FP2_BYTES {
            return Err(CryptoError::InvalidPointEncoding);
        }
        Ok(Fp2 {
            c1: Fp::from_slice(&data[..FP_BYTES])?,
            c0: Fp::from_slice(&data[FP_BYTES..])?,
        })
    }
}

impl ConditionallySelectable for Fp2 {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Fp2 {
            c0: Fp::conditional_select(&a.c0, &b.c0, choice),
            c1: Fp::conditional_select(&a.c1, &b.c1, choice),
        }
    }
}

impl ConstantTimeEq for Fp2 {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.c0.ct_eq(&other.c0) & self.c1.ct_eq(&other.c1)
    }
}
