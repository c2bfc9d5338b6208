//! BN256 curve parameters for SM9 (GM/T 0044 / GB/T 38635).
//!
//! Curve E(F_p): y² = x³ + 5 (a = 0, b = 5)
//! Twist E'(F_p²): y² = x³ + 5u (sextic M-twist)
//! Tower: F_p² = F_p[u]/(u² + 2), F_p⁴ = F_p²[v]/(v² - u),
//!        F_p¹² = F_p⁴[w]/(w³ - v)

use gmcore_bignum::BigNum;
use gmcore_types::CryptoError;

use super::fp::Fp;

/// Subgroup order n.
pub fn order() -> BigNum {
    BigNum::from_bytes_be(&hex(
        "B640000002A3A6F1D603AB4FF58EC74449F2934B18EA8BEEE56EE19CD69ECF25",
    ))
}

/// Generator P1 of E(F_p) — x coordinate.
pub(crate) fn p1_x() -> Fp {
    fp_const("93DE051D62BF718FF5ED0704487D01D6E1E4086909DC3280E8C4E4817C66DDDD")
}

/// Generator P1 of E(F_p) — y coordinate.
pub(crate) fn p1_y() -> Fp {
    fp_const("21FE8DDA4F21E607631065125C395BBC1C1C00CBFA6024350C464CD70A3EA616")
}

/// Generator P2 of E'(F_p²) — x, constant term.
pub(crate) fn p2_x0() -> Fp {
    fp_const("3722755292130B08D2AAB97FD34EC120EE265948D19C17ABF9B7213BAF82D65B")
}

/// Generator P2 of E'(F_p²) — x, coefficient of u.
pub(crate) fn p2_x1() -> Fp {
    fp_const("85AEF3D078640C98597B6027B441A01FF1DD2C190F5E93C454806C11D8806141")
}

/// Generator P2 of E'(F_p²) — y, constant term.
pub(crate) fn p2_y0() -> Fp {
    fp_const("A7CF28D519BE3DA65F3170153D278FF247EFBA98A71A08116215BBA5C999A7C7")
}

/// Generator P2 of E'(F_p²) — y, coefficient of u.
pub(crate) fn p2_y1() -> Fp {
    fp_const("17509B092E845C1266BA0D262CBEE6ED0736A96FA347C8BD856DC76B84EBEB96")
}

/// BN parameter t of the SM9 curve.
pub(crate) const U_PARAM: u64 = 0x600000000058F98A;

/// Miller loop count 6t + 2 (66 bits).
pub(crate) const SIX_U_PLUS_2: u128 = 0x2400000000215D93E;

/// Bit length of [`SIX_U_PLUS_2`].
pub(crate) const SIX_U_PLUS_2_BITS: u32 = 66;

// Frobenius multipliers, Montgomery form. All four land in F_p for this
// curve's tower; the canonical values are recorded alongside.

/// β = (-2)^((p-1)/4), the F_p⁴ Frobenius multiplier.
/// = 0x6C648DE5DC0A3F2CF55ACC93EE0BAF159F9D411806DC5177F5B21FD3DA24D011
pub(crate) const BETA_FROB: Fp = Fp::from_mont_limbs([
    0x39b4ef0f3ee72529,
    0xdb043bf508582782,
    0xb8554ab054ac91e3,
    0x9848eec25498cab5,
]);

/// γ₁ = u^((p-1)/6), the F_p¹² Frobenius multiplier for the w slot.
/// = 0x3F23EA58E5720BDB843C6CFA9C08674947C5C86E0DDD04EDA91D8354377B698B
pub(crate) const GAMMA1: Fp = Fp::from_mont_limbs([
    0x1a98dfbd4575299f,
    0x9ec8547b245c54fd,
    0xf51f5eac13df846c,
    0x9ef74015d5a16393,
]);

/// γ₂ = γ₁², the multiplier for the w² slot.
/// = 0x0000000000000000F300000002A3A6F2780272354F8B78F4D5FC11967BE65334
pub(crate) const GAMMA2: Fp = Fp::from_mont_limbs([
    0xb626197dce4736ca,
    0x08296b3557ed0186,
    0x9c705db2fd91512a,
    0x1c753e748601c992,
]);

/// Twist-Frobenius x multiplier (u^((p-1)/3))⁻¹ for π(Q) on E'.
/// = 0xB640000002A3A6F0E303AB4FF2EB2052A9F02115CAEF75E70F738991676AF24A
pub(crate) const TWIST_ALPHA: Fp = Fp::from_mont_limbs([
    0x646a4b5a4e6783b9,
    0xd5e4017f8d980f9d,
    0x8d8bf6fd0cdfe790,
    0x2d4ac18b775a8f7b,
]);

/// Twist-Frobenius y multiplier (u^((p-1)/2))⁻¹ for π(Q) on E'.
/// = 0x49DB721A269967C4E0A8DEBC0783182F82555233139E9D63EFBD7B54092C756C
pub(crate) const TWIST_BETA: Fp = Fp::from_mont_limbs([
    0xabbaac18a46a2054,
    0x46ee57561222c759,
    0x1dae609fa0e23561,
    0x1df7113dae0adc3c,
]);

/// Reduce a scalar modulo the group order into fixed-width big-endian
/// bytes for the constant-time ladders.
pub(crate) fn reduce_scalar(k: &BigNum) -> Result<[u8; 32], CryptoError> {
    let reduced = k.mod_reduce(&order())?;
    let bytes = reduced.to_bytes_be_padded(32);
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

fn fp_const(s: &str) -> Fp {
    // Curve constants are canonical by construction.
    Fp::from_slice(&hex(s)).expect("curve constant out of range")
}

fn hex(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_has_expected_width() {
        assert_eq!(order().bit_len(), 256);
    }

    #[test]
    fn miller_param_consistent_with_u() {
        assert_eq!(SIX_U_PLUS_2, 6 * U_PARAM as u128 + 2);
        assert_eq!(128 - SIX_U_PLUS_2.leading_zeros(), SIX_U_PLUS_2_BITS);
    }

    #[test]
    fn gamma2_is_gamma1_squared() {
        assert_eq!(GAMMA1.sqr(), GAMMA2);
    }

    #[test]
    fn beta_frob_squares_to_minus_one() {
        // β² = (-2)^((p-1)/2) = -1 since -2 is a non-residue mod p.
        assert_eq!(BETA_FROB.sqr(), Fp::one().neg());
    }

    #[test]
    fn gamma1_sixth_power_consistency() {
        // γ₁⁶ = u^(p-1) = (u²)^((p-1)/2) = (-2)^((p-1)/2) = -1.
        let g2 = GAMMA1.sqr();
        let g6 = g2.sqr().mul(&g2);
        assert_eq!(g6, Fp::one().neg());
        // and γ₁³ = β
        assert_eq!(GAMMA1.sqr().mul(&GAMMA1), BETA_FROB);
    }

    #[test]
    fn twist_constants_invert_the_direct_powers() {
        // TWIST_ALPHA = (u^((p-1)/3))⁻¹ = (γ₁²)⁻¹, TWIST_BETA = β⁻¹.
        assert_eq!(TWIST_ALPHA.mul(&GAMMA2), Fp::one());
        assert_eq!(TWIST_BETA.mul(&BETA_FROB), Fp::one());
    }

    #[test]
    fn scalar_reduction_pads() {
        let k = BigNum::from_u64(5);
        let bytes = reduce_scalar(&k).unwrap();
        assert_eq!(bytes[31], 5);
        assert!(bytes[..31].iter().all(|&b| b == 0));

        let n = order();
        assert_eq!(reduce_scalar(&n).unwrap(), [0u8; 32]);
    }
}
