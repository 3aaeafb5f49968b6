use alloy_primitives::{keccak256, Address};
use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::{CryptoRng, RngCore};
use std::fmt::{Debug, Formatter};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes")]
    InvalidSecret,
    #[error("invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// A secp256k1 signing key. Identities and operators are both just one of
/// these plus the address derived from it.
#[derive(Clone)]
pub struct SecretKey(SigningKey);

impl SecretKey {
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        // Rejection-sample until the bytes land inside the scalar field.
        loop {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            if let Ok(key) = SigningKey::from_slice(&bytes) {
                return SecretKey(key);
            }
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        SigningKey::from_slice(bytes).map(SecretKey).map_err(|_| KeyError::InvalidSecret)
    }

    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str.trim_start_matches("0x"))?;
        Self::from_slice(&bytes)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(*self.0.verifying_key())
    }

    pub fn address(&self) -> Address {
        self.public_key().address()
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.0
    }
}

impl Debug for SecretKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey(<redacted>, address: {})", self.address())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// The 20-byte address: keccak256 of the uncompressed SEC1 point, last 20 bytes.
    pub fn address(&self) -> Address {
        let point = self.0.to_encoded_point(false);
        let digest = keccak256(&point.as_bytes()[1..]);
        Address::from_slice(&digest[12..])
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(value: VerifyingKey) -> Self {
        PublicKey(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn deterministic_address_derivation() {
        let key = SecretKey::from_slice(&[0x11; 32]).unwrap();
        let again = SecretKey::from_slice(&[0x11; 32]).unwrap();
        assert_eq!(key.address(), again.address());
        assert_eq!(key.public_key().address(), key.address());
    }

    #[test]
    fn from_hex_accepts_prefixed_and_bare() {
        let bare = SecretKey::from_hex(&"22".repeat(32)).unwrap();
        let prefixed = SecretKey::from_hex(&format!("0x{}", "22".repeat(32))).unwrap();
        assert_eq!(bare.address(), prefixed.address());
    }

    #[test]
    fn zero_key_is_rejected() {
        assert!(SecretKey::from_slice(&[0u8; 32]).is_err());
        assert!(SecretKey::from_slice(&[1, 2, 3]).is_err());
    }

    #[test]
    fn random_keys_differ() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = SecretKey::random(&mut rng);
        let b = SecretKey::random(&mut rng);
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn debug_does_not_leak_the_scalar() {
        let key = SecretKey::from_slice(&[0x33; 32]).unwrap();
        let rendered = format!("{key:?}");
        assert!(rendered.contains("redacted"));
        assert!(!rendered.contains("33333333"));
    }
}
