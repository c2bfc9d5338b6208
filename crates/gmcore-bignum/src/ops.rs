//! Arithmetic and modular operations for BigNum.

use crate::bignum::{BigNum, DoubleLimb, Limb, LIMB_BITS};
use gmcore_types::CryptoError;

impl BigNum {
    /// self + other.
    pub fn add(&self, other: &BigNum) -> BigNum {
        let a = self.limbs();
        let b = other.limbs();
        let max_len = a.len().max(b.len());
        let mut limbs = vec![0u64; max_len + 1];
        let mut carry: DoubleLimb = 0;
        for (i, limb) in limbs.iter_mut().enumerate().take(max_len) {
            let av = a.get(i).copied().unwrap_or(0) as DoubleLimb;
            let bv = b.get(i).copied().unwrap_or(0) as DoubleLimb;
            let sum = av + bv + carry;
            *limb = sum as Limb;
            carry = sum >> LIMB_BITS;
        }
        limbs[max_len] = carry as Limb;
        BigNum::from_limbs(limbs)
    }

    /// self - other. The caller must guarantee self >= other.
    pub fn sub(&self, other: &BigNum) -> BigNum {
        debug_assert!(self >= other);
        let a = self.limbs();
        let b = other.limbs();
        let mut limbs = vec![0u64; a.len()];
        let mut borrow: u64 = 0;
        for (i, limb) in limbs.iter_mut().enumerate() {
            let bv = b.get(i).copied().unwrap_or(0);
            let (d1, b1) = a[i].overflowing_sub(bv);
            let (d2, b2) = d1.overflowing_sub(borrow);
            *limb = d2;
            borrow = (b1 as u64) + (b2 as u64);
        }
        BigNum::from_limbs(limbs)
    }

    /// self * other.
    pub fn mul(&self, other: &BigNum) -> BigNum {
        let a = self.limbs();
        let b = other.limbs();
        if self.is_zero() || other.is_zero() {
            return BigNum::zero();
        }
        let mut limbs = vec![0u64; a.len() + b.len()];
        for i in 0..a.len() {
            let mut carry: DoubleLimb = 0;
            for j in 0..b.len() {
                let cur = a[i] as DoubleLimb * b[j] as DoubleLimb
                    + limbs[i + j] as DoubleLimb
                    + carry;
                limbs[i + j] = cur as Limb;
                carry = cur >> LIMB_BITS;
            }
            limbs[i + b.len()] = carry as Limb;
        }
        BigNum::from_limbs(limbs)
    }

    /// Division with remainder: (quotient, remainder).
    pub fn div_rem(&self, divisor: &BigNum) -> Result<(BigNum, BigNum), CryptoError> {
        if divisor.is_zero() {
            return Err(CryptoError::BnDivisionByZero);
        }
        if self < divisor {
            return Ok((BigNum::zero(), self.clone()));
        }

        // Binary long division; operand widths here stay within a few
        // hundred bits, so the quadratic cost is irrelevant.
        let bits = self.bit_len();
        let mut quotient = vec![0u64; bits.div_ceil(LIMB_BITS)];
        let mut remainder = BigNum::zero();
        for i in (0..bits).rev() {
            remainder = remainder.shl1_or(self.bit(i));
            if remainder >= *divisor {
                remainder = remainder.sub(divisor);
                quotient[i / LIMB_BITS] |= 1u64 << (i % LIMB_BITS);
            }
        }
        Ok((BigNum::from_limbs(quotient), remainder))
    }

    /// Shift left by one bit, placing `bit` into the vacated position.
    fn shl1_or(&self, bit: bool) -> BigNum {
        let a = self.limbs();
        let mut limbs = vec![0u64; a.len() + 1];
        let mut carry = bit as u64;
        for (i, &limb) in a.iter().enumerate() {
            limbs[i] = (limb << 1) | carry;
            carry = limb >> 63;
        }
        limbs[a.len()] = carry;
        BigNum::from_limbs(limbs)
    }

    /// self mod modulus.
    pub fn mod_reduce(&self, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        Ok(self.div_rem(modulus)?.1)
    }

    /// (self + other) mod modulus.
    pub fn mod_add(&self, other: &BigNum, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        self.add(other).mod_reduce(modulus)
    }

    /// (self - other) mod modulus. `other` is reduced first, so the
    /// difference never goes below zero.
    pub fn mod_sub(&self, other: &BigNum, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        let rhs = other.mod_reduce(modulus)?;
        self.add(&modulus.sub(&rhs)).mod_reduce(modulus)
    }

    /// (self * other) mod modulus.
    pub fn mod_mul(&self, other: &BigNum, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        self.mul(other).mod_reduce(modulus)
    }

    /// self^exp mod modulus, by square-and-multiply.
    pub fn mod_exp(&self, exp: &BigNum, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        if modulus.is_zero() {
            return Err(CryptoError::BnDivisionByZero);
        }
        let mut result = BigNum::from_u64(1).mod_reduce(modulus)?;
        let base = self.mod_reduce(modulus)?;
        for i in (0..exp.bit_len()).rev() {
            result = result.mod_mul(&result, modulus)?;
            if exp.bit(i) {
                result = result.mod_mul(&base, modulus)?;
            }
        }
        Ok(result)
    }

    /// Modular inverse by Fermat's little theorem: self^(modulus-2).
    ///
    /// The modulus must be prime (the group orders used here are). The
    /// exponentiation route is preferred over the extended Euclidean
    /// algorithm for its more uniform execution profile.
    pub fn mod_inv(&self, modulus: &BigNum) -> Result<BigNum, CryptoError> {
        if self.mod_reduce(modulus)?.is_zero() {
            return Err(CryptoError::BnNoInverse);
        }
        let exp = modulus.sub(&BigNum::from_u64(2));
        self.mod_exp(&exp, modulus)
    }
}
