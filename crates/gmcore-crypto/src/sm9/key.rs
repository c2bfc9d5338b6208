//! SM9 master and user key material (KGC side).
//!
//! Two independent master pairs exist: the signature pair publishes on
//! G2 and extracts user keys on G1; the encryption pair is the mirror
//! image. Master public keys carry two lazily initialized caches — the
//! pairing against the opposite generator and a GT window table — so
//! protocol layers can exponentiate the pairing base cheaply.

use std::sync::OnceLock;

use gmcore_bignum::BigNum;
use gmcore_types::CryptoError;
use gmcore_utils::{asn1, pem};

use super::curve;
use super::ecp::G1;
use super::ecp2::G2;
use super::gt::{Gt, GtTable};
use super::hash;

/// Uniform scalar in [1, n-1] by rejection sampling.
pub(crate) fn random_scalar() -> Result<BigNum, CryptoError> {
    let n = curve::order();
    loop {
        let mut buf = [0u8; 32];
        getrandom::getrandom(&mut buf).map_err(|_| CryptoError::BnRandGenFail)?;
        let val = BigNum::from_bytes_be(&buf);
        if !val.is_zero() && val < n {
            return Ok(val);
        }
    }
}

/// The t1/t2 extraction scalars shared by both key flavors:
/// t1 = H1(uid ‖ hid) + d, t2 = d·t1⁻¹ mod n.
fn extraction_scalar(d: &BigNum, uid: &[u8], hid: u8) -> Result<BigNum, CryptoError> {
    let n = curve::order();
    let mut id = uid.to_vec();
    id.push(hid);

    let t1 = hash::h1(&id)?.mod_add(d, &n)?;
    if t1.is_zero() {
        return Err(CryptoError::RegenerateMaster);
    }
    let t1_inv = t1.mod_inv(&n)?;
    d.mod_mul(&t1_inv, &n)
}

/// [H1(uid ‖ hid)] used for user public key derivation.
fn identity_scalar(uid: &[u8], hid: u8) -> Result<BigNum, CryptoError> {
    let mut id = uid.to_vec();
    id.push(hid);
    hash::h1(&id)
}

fn unmarshal_g1_tagged(bytes: &[u8]) -> Result<G1, CryptoError> {
    match bytes.first() {
        Some(&0x04) => G1::unmarshal(&bytes[1..]),
        Some(&0x02) | Some(&0x03) => G1::unmarshal_compressed(bytes),
        _ => Err(CryptoError::InvalidPointEncoding),
    }
}

fn unmarshal_g2_tagged(bytes: &[u8]) -> Result<G2, CryptoError> {
    match bytes.first() {
        Some(&0x04) => G2::unmarshal(&bytes[1..]),
        Some(&0x02) | Some(&0x03) => G2::unmarshal_compressed(bytes),
        _ => Err(CryptoError::InvalidPointEncoding),
    }
}

/// GMSSL-compatible public key PEM: the body is
/// `SEQUENCE { BIT STRING }` with no algorithm identifier. Returns the
/// BIT STRING payload.
fn pem_public_bits(text: &str) -> Result<Vec<u8>, CryptoError> {
    let block = pem::parse_first(text)?;
    let mut dec = asn1::Decoder::new(&block.data);
    let mut seq = dec.read_sequence().map_err(|_| CryptoError::InvalidPem)?;
    if !dec.is_empty() {
        return Err(CryptoError::InvalidPem);
    }
    let bits = seq.read_bit_string()?;
    if !seq.is_empty() {
        return Err(CryptoError::InvalidAsn1);
    }
    Ok(bits.to_vec())
}

fn bit_string_asn1(payload: &[u8]) -> Vec<u8> {
    let mut enc = asn1::Encoder::new();
    enc.write_bit_string(payload);
    enc.finish()
}

fn integer_asn1(value: &BigNum) -> Vec<u8> {
    let mut enc = asn1::Encoder::new();
    enc.write_integer(&value.to_bytes_be());
    enc.finish()
}

// ---------------------------------------------------------------------------
// Signature flavor: master public on G2, user keys on G1
// ---------------------------------------------------------------------------

/// Signature master public key [d]·P2.
pub struct SignMasterPublicKey {
    point: G2,
    base: OnceLock<Gt>,
    table: OnceLock<GtTable>,
}

impl SignMasterPublicKey {
    fn from_point(point: G2) -> Self {
        Self {
            point,
            base: OnceLock::new(),
            table: OnceLock::new(),
        }
    }

    /// The raw group element.
    pub fn point(&self) -> &G2 {
        &self.point
    }

    /// e(P1, masterPub), computed at most once and shared thereafter.
    pub fn pair(&self) -> Result<Gt, CryptoError> {
        if let Some(g) = self.base.get() {
            return Ok(*g);
        }
        let g = Gt::pair(&G1::generator(), &self.point)?;
        Ok(*self.base.get_or_init(|| g))
    }

    /// [r]·e(P1, masterPub) through the lazily built window table.
    pub fn scalar_base_mult(&self, r: &BigNum) -> Result<Gt, CryptoError> {
        let table = match self.table.get() {
            Some(table) => table,
            None => {
                let base = self.pair()?;
                self.table.get_or_init(|| GtTable::new(&base.p))
            }
        };
        Ok(Gt {
            p: table.pow(&curve::reduce_scalar(r)?),
        })
    }

    /// User public key [H1(uid ‖ hid)]·P2 + masterPub.
    pub fn generate_user_public_key(&self, uid: &[u8], hid: u8) -> Result<G2, CryptoError> {
        let h = identity_scalar(uid, hid)?;
        Ok(G2::scalar_base_mult(&h)?.add(&self.point))
    }

    /// DER `BIT STRING` of the uncompressed point.
    pub fn marshal_asn1(&self) -> Vec<u8> {
        bit_string_asn1(&self.point.marshal_uncompressed())
    }

    /// DER `BIT STRING` of the compressed point.
    pub fn marshal_compressed_asn1(&self) -> Result<Vec<u8>, CryptoError> {
        Ok(bit_string_asn1(&self.point.marshal_compressed()?))
    }

    /// Parse a tagged point (uncompressed or compressed).
    pub fn unmarshal_raw(bytes: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self::from_point(unmarshal_g2_tagged(bytes)?))
    }

    /// Parse the DER `BIT STRING` form, rejecting trailing bytes.
    pub fn unmarshal_asn1(der: &[u8]) -> Result<Self, CryptoError> {
        let mut dec = asn1::Decoder::new(der);
        let bits = dec.read_bit_string()?;
        if !dec.is_empty() {
            return Err(CryptoError::InvalidAsn1);
        }
        Self::unmarshal_raw(bits)
    }

    /// Parse the GMSSL PEM envelope (input only).
    pub fn parse_from_pem(text: &str) -> Result<Self, CryptoError> {
        Self::unmarshal_raw(&pem_public_bits(text)?)
    }
}

impl Clone for SignMasterPublicKey {
    fn clone(&self) -> Self {
        let cloned = Self::from_point(self.point);
        if let Some(base) = self.base.get() {
            let _ = cloned.base.set(*base);
        }
        if let Some(table) = self.table.get() {
            let _ = cloned.table.set(table.clone());
        }
        cloned
    }
}

impl PartialEq for SignMasterPublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point
    }
}

impl Eq for SignMasterPublicKey {}

impl core::fmt::Debug for SignMasterPublicKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SignMasterPublicKey")
            .field("point", &self.point)
            .finish()
    }
}

/// Signature master private key d with its embedded public half.
pub struct SignMasterPrivateKey {
    d: BigNum,
    public: SignMasterPublicKey,
}

impl SignMasterPrivateKey {
    /// Sample a fresh master pair.
    pub fn generate() -> Result<Self, CryptoError> {
        Self::from_scalar(random_scalar()?)
    }

    /// Rebuild a master pair from a stored scalar in [1, n-1].
    pub fn from_scalar(d: BigNum) -> Result<Self, CryptoError> {
        if d.is_zero() || d >= curve::order() {
            return Err(CryptoError::InvalidKey);
        }
        let public = SignMasterPublicKey::from_point(G2::scalar_base_mult(&d)?);
        Ok(Self { d, public })
    }

    pub fn public(&self) -> &SignMasterPublicKey {
        &self.public
    }

    /// Extract the user signature key [t2]·P1 for an identity.
    ///
    /// Fails with [`CryptoError::RegenerateMaster`] when
    /// H1(uid ‖ hid) + d ≡ 0 (mod n); the caller must sample a new
    /// master pair rather than retry.
    pub fn generate_user_key(&self, uid: &[u8], hid: u8) -> Result<SignPrivateKey, CryptoError> {
        let t2 = extraction_scalar(&self.d, uid, hid)?;
        Ok(SignPrivateKey {
            point: G1::scalar_base_mult(&t2)?,
            master: Some(self.public.clone()),
        })
    }

    /// DER `INTEGER d`.
    pub fn marshal_asn1(&self) -> Vec<u8> {
        integer_asn1(&self.d)
    }

    /// Parse `INTEGER d` and recompute the public half.
    pub fn unmarshal_asn1(der: &[u8]) -> Result<Self, CryptoError> {
        let mut dec = asn1::Decoder::new(der);
        let d = BigNum::from_bytes_be(dec.read_integer()?);
        if !dec.is_empty() {
            return Err(CryptoError::InvalidAsn1);
        }
        Self::from_scalar(d)
    }
}

/// User signature private key [t2]·P1, optionally bound to its master
/// public key.
#[derive(Clone)]
pub struct SignPrivateKey {
    point: G1,
    master: Option<SignMasterPublicKey>,
}

impl SignPrivateKey {
    /// The private group element.
    pub fn private_key(&self) -> &G1 {
        &self.point
    }

    pub fn master_public(&self) -> Option<&SignMasterPublicKey> {
        self.master.as_ref()
    }

    /// Bind the master public key; the first binding wins.
    pub fn set_master_public_key(&mut self, master: &SignMasterPublicKey) {
        if self.master.is_none() {
            self.master = Some(master.clone());
        }
    }

    /// DER `BIT STRING` of the uncompressed private point. The master
    /// public key travels separately.
    pub fn marshal_asn1(&self) -> Vec<u8> {
        bit_string_asn1(&self.point.marshal_uncompressed())
    }

    /// DER `BIT STRING` of the compressed private point.
    pub fn marshal_compressed_asn1(&self) -> Result<Vec<u8>, CryptoError> {
        Ok(bit_string_asn1(&self.point.marshal_compressed()?))
    }

    /// Parse a tagged point; the master public key must be injected via
    /// [`SignPrivateKey::set_master_public_key`].
    pub fn unmarshal_raw(bytes: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self {
            point: unmarshal_g1_tagged(bytes)?,
            master: None,
        })
    }

    /// Parse either the bare `BIT STRING` form or
    /// `SEQUENCE { BIT STRING priv, BIT STRING masterPub OPTIONAL }`.
    pub fn unmarshal_asn1(der: &[u8]) -> Result<Self, CryptoError> {
        let mut dec = asn1::Decoder::new(der);
        let tag = dec.peek_tag()?;

        if tag.constructed && tag.number == 0x10 {
            let mut seq = dec.read_sequence()?;
            if !dec.is_empty() {
                return Err(CryptoError::InvalidAsn1);
            }
            let mut key = Self::unmarshal_raw(seq.read_bit_string()?)?;
            if !seq.is_empty() {
                let master = SignMasterPublicKey::unmarshal_raw(seq.read_bit_string()?)?;
                if !seq.is_empty() {
                    return Err(CryptoError::InvalidAsn1);
                }
                key.set_master_public_key(&master);
            }
            return Ok(key);
        }

        let bits = dec.read_bit_string()?;
        if !dec.is_empty() {
            return Err(CryptoError::InvalidAsn1);
        }
        Self::unmarshal_raw(bits)
    }
}

// ---------------------------------------------------------------------------
// Encryption flavor: master public on G1, user keys on G2
// ---------------------------------------------------------------------------

/// Encryption master public key [d]·P1.
pub struct EncryptMasterPublicKey {
    point: G1,
    base: OnceLock<Gt>,
    table: OnceLock<GtTable>,
}

impl EncryptMasterPublicKey {
    fn from_point(point: G1) -> Self {
        Self {
            point,
            base: OnceLock::new(),
            table: OnceLock::new(),
        }
    }

    /// The raw group element.
    pub fn point(&self) -> &G1 {
        &self.point
    }

    /// e(masterPub, P2), computed at most once and shared thereafter.
    pub fn pair(&self) -> Result<Gt, CryptoError> {
        if let Some(g) = self.base.get() {
            return Ok(*g);
        }
        let g = Gt::pair(&self.point, &G2::generator())?;
        Ok(*self.base.get_or_init(|| g))
    }

    /// [r]·e(masterPub, P2) through the lazily built window table.
    pub fn scalar_base_mult(&self, r: &BigNum) -> Result<Gt, CryptoError> {
        let table = match self.table.get() {
            Some(table) => table,
            None => {
                let base = self.pair()?;
                self.table.get_or_init(|| GtTable::new(&base.p))
            }
        };
        Ok(Gt {
            p: table.pow(&curve::reduce_scalar(r)?),
        })
    }

    /// User public key [H1(uid ‖ hid)]·P1 + masterPub.
    pub fn generate_user_public_key(&self, uid: &[u8], hid: u8) -> Result<G1, CryptoError> {
        let h = identity_scalar(uid, hid)?;
        Ok(G1::scalar_base_mult(&h)?.add(&self.point))
    }

    /// DER `BIT STRING` of the uncompressed point.
    pub fn marshal_asn1(&self) -> Vec<u8> {
        bit_string_asn1(&self.point.marshal_uncompressed())
    }

    /// DER `BIT STRING` of the compressed point.
    pub fn marshal_compressed_asn1(&self) -> Result<Vec<u8>, CryptoError> {
        Ok(bit_string_asn1(&self.point.marshal_compressed()?))
    }

    /// Parse a tagged point (uncompressed or compressed).
    pub fn unmarshal_raw(bytes: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self::from_point(unmarshal_g1_tagged(bytes)?))
    }

    /// Parse the DER `BIT STRING` form, rejecting trailing bytes.
    pub fn unmarshal_asn1(der: &[u8]) -> Result<Self, CryptoError> {
        let mut dec = asn1::Decoder::new(der);
        let bits = dec.read_bit_string()?;
        if !dec.is_empty() {
            return Err(CryptoError::InvalidAsn1);
        }
        Self::unmarshal_raw(bits)
    }

    /// Parse the GMSSL PEM envelope (input only).
    pub fn parse_from_pem(text: &str) -> Result<Self, CryptoError> {
        Self::unmarshal_raw(&pem_public_bits(text)?)
    }
}

impl Clone for EncryptMasterPublicKey {
    fn clone(&self) -> Self {
        let cloned = Self::from_point(self.point);
        if let Some(base) = self.base.get() {
            let _ = cloned.base.set(*base);
        }
        if let Some(table) = self.table.get() {
            let _ = cloned.table.set(table.clone());
        }
        cloned
    }
}

impl PartialEq for EncryptMasterPublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point
    }
}

impl core::fmt::Debug for EncryptMasterPublicKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EncryptMasterPublicKey")
            .field("point", &self.point)
            .finish()
    }
}

impl Eq for EncryptMasterPublicKey {}

/// Encryption master private key d with its embedded public half.
pub struct EncryptMasterPrivateKey {
    d: BigNum,
    public: EncryptMasterPublicKey,
}

impl EncryptMasterPrivateKey {
    /// Sample a fresh master pair.
    pub fn generate() -> Result<Self, CryptoError> {
        Self::from_scalar(random_scalar()?)
    }

    /// Rebuild a master pair from a stored scalar in [1, n-1].
    pub fn from_scalar(d: BigNum) -> Result<Self, CryptoError> {
        if d.is_zero() || d >= curve::order() {
            return Err(CryptoError::InvalidKey);
        }
        let public = EncryptMasterPublicKey::from_point(G1::scalar_base_mult(&d)?);
        Ok(Self { d, public })
    }

    pub fn public(&self) -> &EncryptMasterPublicKey {
        &self.public
    }

    /// Extract the user encryption key [t2]·P2 for an identity.
    pub fn generate_user_key(&self, uid: &[u8], hid: u8) -> Result<EncryptPrivateKey, CryptoError> {
        let t2 = extraction_scalar(&self.d, uid, hid)?;
        Ok(EncryptPrivateKey {
            point: G2::scalar_base_mult(&t2)?,
            master: Some(self.public.clone()),
        })
    }

    /// DER `INTEGER d`.
    pub fn marshal_asn1(&self) -> Vec<u8> {
        integer_asn1(&self.d)
    }

    /// Parse `INTEGER d` and recompute the public half.
    pub fn unmarshal_asn1(der: &[u8]) -> Result<Self, CryptoError> {
        let mut dec = asn1::Decoder::new(der);
        let d = BigNum::from_bytes_be(dec.read_integer()?);
        if !dec.is_empty() {
            return Err(CryptoError::InvalidAsn1);
        }
        Self::from_scalar(d)
    }
}

/// User encryption private key [t2]·P2, optionally bound to its master
/// public key.
#[derive(Clone)]
pub struct EncryptPrivateKey {
    point: G2,
    master: Option<EncryptMasterPublicKey>,
}

impl EncryptPrivateKey {
    /// The private group element.
    pub fn private_key(&self) -> &G2 {
        &self.point
    }

    pub fn master_public(&self) -> Option<&EncryptMasterPublicKey> {
        self.master.as_ref()
    }

    /// Bind the master public key; the first binding wins.
    pub fn set_master_public_key(&mut self, master: &EncryptMasterPublicKey) {
        if self.master.is_none() {
            self.master = Some(master.clone());
        }
    }

    /// DER `BIT STRING` of the uncompressed private point.
    pub fn marshal_asn1(&self) -> Vec<u8> {
        bit_string_asn1(&self.point.marshal_uncompressed())
    }

    /// DER `BIT STRING` of the compressed private point.
    pub fn marshal_compressed_asn1(&self) -> Result<Vec<u8>, CryptoError> {
        Ok(bit_string_asn1(&self.point.marshal_compressed()?))
    }

    /// Parse a tagged point; the master public key must be injected via
    /// [`EncryptPrivateKey::set_master_public_key`].
    pub fn unmarshal_raw(bytes: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self {
            point: unmarshal_g2_tagged(bytes)?,
            master: None,
        })
    }

    /// Parse either the bare `BIT STRING` form or
    /// `SEQUENCE { BIT STRING priv, BIT STRING masterPub OPTIONAL }`.
    pub fn unmarshal_asn1(der: &[u8]) -> Result<Self, CryptoError> {
        let mut dec = asn1::Decoder::new(der);
        let tag = dec.peek_tag()?;

        if tag.constructed && tag.number == 0x10 {
            let mut seq = dec.read_sequence()?;
            if !dec.is_empty() {
                return Err(CryptoError::InvalidAsn1);
            }
            let mut key = Self::unmarshal_raw(seq.read_bit_string()?)?;
            if !seq.is_empty() {
                let master = EncryptMasterPublicKey::unmarshal_raw(seq.read_bit_string()?)?;
                if !seq.is_empty() {
                    return Err(CryptoError::InvalidAsn1);
                }
                key.set_master_public_key(&master);
            }
            return Ok(key);
        }

        let bits = dec.read_bit_string()?;
        if !dec.is_empty() {
            return Err(CryptoError::InvalidAsn1);
        }
        Self::unmarshal_raw(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sm9::HID_SIGN;

    #[test]
    fn random_scalar_in_range() {
        let n = curve::order();
        for _ in 0..8 {
            let k = random_scalar().unwrap();
            assert!(!k.is_zero());
            assert!(k < n);
        }
    }

    #[test]
    fn master_scalar_bounds_enforced() {
        assert!(SignMasterPrivateKey::from_scalar(BigNum::zero()).is_err());
        assert!(SignMasterPrivateKey::from_scalar(curve::order()).is_err());
        assert!(SignMasterPrivateKey::from_scalar(BigNum::from_u64(1)).is_ok());
    }

    #[test]
    fn sign_master_asn1_roundtrip() {
        let master = SignMasterPrivateKey::from_scalar(BigNum::from_u64(0xABCDEF)).unwrap();
        let der = master.marshal_asn1();
        let parsed = SignMasterPrivateKey::unmarshal_asn1(&der).unwrap();
        assert_eq!(parsed.public(), master.public());

        let pub_der = master.public().marshal_asn1();
        let parsed_pub = SignMasterPublicKey::unmarshal_asn1(&pub_der).unwrap();
        assert_eq!(&parsed_pub, master.public());
    }

    #[test]
    fn encrypt_master_asn1_roundtrip() {
        let master = EncryptMasterPrivateKey::from_scalar(BigNum::from_u64(0x13579B)).unwrap();
        let der = master.marshal_asn1();
        let parsed = EncryptMasterPrivateKey::unmarshal_asn1(&der).unwrap();
        assert_eq!(parsed.public(), master.public());
    }

    #[test]
    fn trailing_der_bytes_rejected() {
        let master = SignMasterPrivateKey::from_scalar(BigNum::from_u64(7)).unwrap();
        let mut der = master.marshal_asn1();
        der.push(0);
        assert!(SignMasterPrivateKey::unmarshal_asn1(&der).is_err());
    }

    #[test]
    fn user_key_sequence_roundtrip() {
        let master = SignMasterPrivateKey::from_scalar(BigNum::from_u64(0x55AA55)).unwrap();
        let user = master.generate_user_key(b"alice@example.com", HID_SIGN).unwrap();

        // Bare form loses the master public key.
        let bare = user.marshal_asn1();
        let mut parsed = SignPrivateKey::unmarshal_asn1(&bare).unwrap();
        assert_eq!(parsed.private_key(), user.private_key());
        assert!(parsed.master_public().is_none());
        parsed.set_master_public_key(master.public());
        assert_eq!(parsed.master_public().unwrap(), master.public());

        // Sequence form carries both.
        let mut enc = asn1::Encoder::new();
        let mut inner = asn1::Encoder::new();
        inner.write_bit_string(&user.private_key().marshal_uncompressed());
        inner.write_bit_string(&master.public().point().marshal_uncompressed());
        enc.write_sequence(&inner.finish());
        let seq_der = enc.finish();

        let parsed = SignPrivateKey::unmarshal_asn1(&seq_der).unwrap();
        assert_eq!(parsed.private_key(), user.private_key());
        assert_eq!(parsed.master_public().unwrap(), master.public());
    }

    #[test]
    fn first_master_binding_wins() {
        let master1 = SignMasterPrivateKey::from_scalar(BigNum::from_u64(11)).unwrap();
        let master2 = SignMasterPrivateKey::from_scalar(BigNum::from_u64(22)).unwrap();
        let user = master1.generate_user_key(b"id", HID_SIGN).unwrap();

        let mut parsed = SignPrivateKey::unmarshal_asn1(&user.marshal_asn1()).unwrap();
        parsed.set_master_public_key(master1.public());
        parsed.set_master_public_key(master2.public());
        assert_eq!(parsed.master_public().unwrap(), master1.public());
    }

    #[test]
    fn compressed_asn1_forms_parse_back() {
        let master = EncryptMasterPrivateKey::from_scalar(BigNum::from_u64(0xC0FFEE)).unwrap();
        let der = master.public().marshal_compressed_asn1().unwrap();
        let parsed = EncryptMasterPublicKey::unmarshal_asn1(&der).unwrap();
        assert_eq!(&parsed, master.public());

        let user = master.generate_user_key(b"bob", crate::sm9::HID_ENCRYPT).unwrap();
        let der = user.marshal_compressed_asn1().unwrap();
        let parsed = EncryptPrivateKey::unmarshal_asn1(&der).unwrap();
        assert_eq!(parsed.private_key(), user.private_key());
    }

    #[test]
    fn pem_parse_roundtrip() {
        let master = SignMasterPrivateKey::from_scalar(BigNum::from_u64(31337)).unwrap();

        // Build the GMSSL envelope: SEQUENCE { BIT STRING point }.
        let mut inner = asn1::Encoder::new();
        inner.write_bit_string(&master.public().point().marshal_uncompressed());
        let mut outer = asn1::Encoder::new();
        outer.write_sequence(&inner.finish());
        let doc = pem::encode("SM9 SIGN MASTER PUBLIC KEY", &outer.finish());

        let parsed = SignMasterPublicKey::parse_from_pem(&doc).unwrap();
        assert_eq!(&parsed, master.public());
    }

    #[test]
    fn pem_trailing_bytes_rejected() {
        let master = SignMasterPrivateKey::from_scalar(BigNum::from_u64(99)).unwrap();
        let mut inner = asn1::Encoder::new();
        inner.write_bit_string(&master.public().point().marshal_uncompressed());
        let mut outer = asn1::Encoder::new();
        outer.write_sequence(&inner.finish());
        let mut body = outer.finish();
        body.push(0x00);
        let doc = pem::encode("SM9 SIGN MASTER PUBLIC KEY", &body);
        assert!(SignMasterPublicKey::parse_from_pem(&doc).is_err());
    }

    #[test]
    fn lazy_pair_cache_is_stable() {
        let master = SignMasterPrivateKey::from_scalar(BigNum::from_u64(5)).unwrap();
        let first = master.public().pair().unwrap();
        let second = master.public().pair().unwrap();
        assert_eq!(first, second);

        // The clone carries the initialized cache by value.
        let clone = master.public().clone();
        assert_eq!(clone.pair().unwrap(), first);
    }
}
