//! R-ate pairing on BN256 for SM9.
//!
//! e(P, Q) with P ∈ E(F_p), Q ∈ E'(F_p²): a Miller loop over the
//! binary expansion of 6t + 2, two Frobenius adjustment steps, then the
//! final exponentiation to (p¹² - 1)/n.

use gmcore_types::CryptoError;

use super::curve::{SIX_U_PLUS_2, SIX_U_PLUS_2_BITS, TWIST_ALPHA, TWIST_BETA, U_PARAM};
use super::ecp::G1;
use super::ecp2::G2;
use super::fp::Fp;
use super::fp12::Fp12;
use super::fp2::Fp2;
use super::fp4::Fp4;

/// The Miller function f_{6t+2,Q}(P) with the R-ate adjustment lines,
/// before final exponentiation.
pub(crate) fn miller(p: &G1, q: &G2) -> Result<Fp12, CryptoError> {
    if p.is_infinity() || q.is_infinity() {
        return Ok(Fp12::one());
    }

    let (px, py) = p.to_affine()?;
    let (qx, qy) = q.to_affine()?;
    let q_affine = G2::from_affine(qx, qy);

    let mut t = q_affine;
    let mut f = Fp12::one();

    // The loop count is public, so branching on its bits is fine.
    for i in (0..SIX_U_PLUS_2_BITS - 1).rev() {
        f = f.sqr();
        let (line, t_next) = line_double(&t, &px, &py)?;
        f = f.mul(&line);
        t = t_next;

        if (SIX_U_PLUS_2 >> i) & 1 == 1 {
            let (line, t_next) = line_add(&t, &q_affine, &px, &py)?;
            f = f.mul(&line);
            t = t_next;
        }
    }

    // Adjustment: Q1 = π(Q), Q2 = -π²(Q).
    let q1 = twist_frobenius(&q_affine)?;
    let q2 = twist_frobenius(&q1)?.neg();

    let (line, t_next) = line_add(&t, &q1, &px, &py)?;
    f = f.mul(&line);
    t = t_next;

    let (line, _) = line_add(&t, &q2, &px, &py)?;
    Ok(f.mul(&line))
}

/// f^((p¹² - 1)/n): the easy part (p⁶ - 1)(p² + 1) by conjugation and
/// Frobenius, then the hard part (p⁴ - p² + 1)/n with the
/// Devegili–Scott–Dahab chain.
pub(crate) fn final_exponentiation(f: &Fp12) -> Fp12 {
    // Easy part: f ← f^((p⁶-1)(p²+1)). Afterwards f is unitary, so
    // conjugation inverts it.
    let mut t1 = f.conjugate().mul(&f.invert());
    t1 = t1.frobenius2().mul(&t1);

    // Hard part.
    let fp = t1.frobenius();
    let fp2 = fp.frobenius();
    let fp3 = fp2.frobenius();

    let fu = pow_u(&t1);
    let fu2 = pow_u(&fu);
    let fu3 = pow_u(&fu2);

    let y0 = fp.mul(&fp2).mul(&fp3);
    let y1 = t1.conjugate();
    let y2 = fu2.frobenius2();
    let y3 = fu.frobenius().conjugate();
    let y4 = fu.mul(&fu2.frobenius()).conjugate();
    let y5 = fu2.conjugate();
    let y6 = fu3.mul(&fu3.frobenius()).conjugate();

    let mut t0 = y6.sqr().mul(&y4).mul(&y5);
    let mut acc = y3.mul(&y5).mul(&t0);
    t0 = t0.mul(&y2);
    acc = acc.sqr().mul(&t0).sqr();
    t0 = acc.mul(&y1);
    acc = acc.mul(&y0);
    t0 = t0.sqr().mul(&acc);
    t0
}

/// The composed R-ate pairing.
pub(crate) fn pairing(p: &G1, q: &G2) -> Result<Fp12, CryptoError> {
    Ok(final_exponentiation(&miller(p, q)?))
}

/// Exponentiation by the public BN parameter t.
fn pow_u(f: &Fp12) -> Fp12 {
    let mut acc = Fp12::one();
    for i in (0..63).rev() {
        acc = acc.sqr();
        if (U_PARAM >> i) & 1 == 1 {
            acc = acc.mul(f);
        }
    }
    acc
}

/// The Frobenius endomorphism carried to the twist:
/// π(x, y) = (x̄·α, ȳ·β) with α = (u^((p-1)/3))⁻¹, β = (u^((p-1)/2))⁻¹.
fn twist_frobenius(q: &G2) -> Result<G2, CryptoError> {
    let (x, y) = q.to_affine()?;
    Ok(G2::from_affine(
        x.conjugate().mul_fp(&TWIST_ALPHA),
        y.conjugate().mul_fp(&TWIST_BETA),
    ))
}

/// Tangent line at T evaluated at P, and the doubled point.
///
/// The line (λ·x_T - y_T) + y_P·v - λ·x_P·w² embeds into F_p¹² as
/// c0 = Fp4(λ·x_T - y_T, (y_P, 0)), c2 = Fp4(-λ·x_P, 0).
fn line_double(t: &G2, px: &Fp, py: &Fp) -> Result<(Fp12, G2), CryptoError> {
    let (tx, ty) = t.to_affine()?;

    // λ = 3·x_T² / 2·y_T (a = 0)
    let lambda = tx.sqr().mul_small(3).mul(&ty.double().invert());

    Ok((embed_line(&lambda, &tx, &ty, px, py), t.double()))
}

/// Chord line through T and Q evaluated at P, and T + Q.
fn line_add(t: &G2, q: &G2, px: &Fp, py: &Fp) -> Result<(Fp12, G2), CryptoError> {
    let (tx, ty) = t.to_affine()?;
    let (qx, qy) = q.to_affine()?;

    if tx == qx {
        if ty == qy {
            return line_double(t, px, py);
        }
        // Vertical line; its contribution cancels in the final
        // exponentiation.
        return Ok((Fp12::one(), G2::infinity()));
    }

    let lambda = qy.sub(&ty).mul(&qx.sub(&tx).invert());

    Ok((embed_line(&lambda, &tx, &ty, px, py), t.add(q)))
}

fn embed_line(lambda: &Fp2, tx: &Fp2, ty: &Fp2, px: &Fp, py: &Fp) -> Fp12 {
    let c0 = Fp4::new(
        lambda.mul(tx).sub(ty),
        Fp2::new(*py, Fp::zero()),
    );
    let c2 = Fp4::new(lambda.mul_fp(px).neg(), Fp2::zero());
    Fp12::new(c0, Fp4::zero(), c2)
}
