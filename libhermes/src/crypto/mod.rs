mod keys;

pub use keys::{KeyError, PublicKey, SecretKey};

use crate::error::ProtocolError;
use alloy_primitives::{keccak256, Address};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// A 65-byte recoverable ECDSA signature, laid out as `r ‖ s ‖ v` with
/// `v ∈ {27, 28}`, the format the settlement contracts consume.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(serialize_with = "crate::helpers::to_hex", deserialize_with = "crate::helpers::sig_from_hex")]
    bytes: [u8; 65],
}

impl Signature {
    pub fn from_bytes(bytes: [u8; 65]) -> Self {
        Signature { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.bytes
    }

    fn split(&self) -> Option<(EcdsaSignature, RecoveryId)> {
        let signature = EcdsaSignature::from_slice(&self.bytes[..64]).ok()?;
        let recovery = RecoveryId::from_byte(self.bytes[64].checked_sub(27)?)?;
        Some((signature, recovery))
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.bytes))
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({self})")
    }
}

/// Sign the keccak256 hash of `message` with `key`.
///
/// The fresh signature is checked against the signer's own address before it
/// is returned. A signer that cannot reproduce its own signature is a fatal
/// bug, so that check panics rather than erroring.
pub fn sign_message(message: &[u8], key: &SecretKey) -> Result<Signature, ProtocolError> {
    let digest = keccak256(message);
    let (signature, recovery) = key
        .signing_key()
        .sign_prehash_recoverable(digest.as_slice())
        .map_err(|e| ProtocolError::Signing(e.to_string()))?;
    let mut bytes = [0u8; 65];
    bytes[..64].copy_from_slice(signature.to_bytes().as_slice());
    bytes[64] = recovery.to_byte() + 27;
    let signature = Signature { bytes };
    assert!(
        verify_signature(message, &signature, key.address()),
        "freshly produced signature failed self-verification"
    );
    Ok(signature)
}

/// Recover the address that signed the keccak256 hash of `message`.
/// Returns `None` for malformed signatures instead of failing.
pub fn recover_signer(message: &[u8], signature: &Signature) -> Option<Address> {
    let digest = keccak256(message);
    let (signature, recovery) = signature.split()?;
    let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recovery).ok()?;
    Some(PublicKey::from(key).address())
}

/// Check that `signature` over `message` recovers to `expected_signer`.
/// Never panics: malformed input is simply a mismatch.
pub fn verify_signature(message: &[u8], signature: &Signature, expected_signer: Address) -> bool {
    recover_signer(message, signature) == Some(expected_signer)
}
