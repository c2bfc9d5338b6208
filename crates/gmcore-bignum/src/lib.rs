#![forbid(unsafe_code)]
#![doc = "Unsigned big-number arithmetic for gmcore."]

mod bignum;
mod ops;

pub use bignum::BigNum;
