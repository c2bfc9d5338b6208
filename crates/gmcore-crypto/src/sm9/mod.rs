//! SM9 identity-based cryptography over BN256 (GB/T 38635 / GM/T 0044).
//!
//! The pairing core: Montgomery base-field arithmetic, the
//! F_p → F_p² → F_p⁴ → F_p¹² extension tower, the curve groups [`G1`]
//! and [`G2`], the R-ate pairing into [`Gt`], and the Key Generation
//! Center key subsystem binding user identities to private group
//! elements. Signature and encryption schemes consume these primitives
//! from higher layers.

mod curve;
mod ecp;
mod ecp2;
mod fp;
mod fp12;
mod fp2;
mod fp4;
mod gt;
mod hash;
mod key;
mod pairing;

pub use ecp::{G1, G1_RAW_BYTES};
pub use ecp2::{G2, G2_RAW_BYTES};
pub use gt::{Gt, GT_BYTES};
pub use key::{
    EncryptMasterPrivateKey, EncryptMasterPublicKey, EncryptPrivateKey, SignMasterPrivateKey,
    SignMasterPublicKey, SignPrivateKey,
};

/// hid byte for signature keys (GM/T 0044.2).
pub const HID_SIGN: u8 = 0x01;

/// hid byte for key-exchange keys (GM/T 0044.3).
pub const HID_KEY_EXCHANGE: u8 = 0x02;

/// hid byte for encryption keys (GM/T 0044.4).
pub const HID_ENCRYPT: u8 = 0x03;

/// The group order n shared by G1, G2 and GT.
pub fn order() -> gmcore_bignum::BigNum {
    curve::order()
}
