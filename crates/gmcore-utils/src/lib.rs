#![forbid(unsafe_code)]
#![doc = "Encoding utilities for gmcore: ASN.1 DER, Base64, PEM."]

#[cfg(feature = "asn1")]
pub mod asn1;

#[cfg(feature = "base64")]
pub mod base64;

#[cfg(feature = "pem")]
pub mod pem;
