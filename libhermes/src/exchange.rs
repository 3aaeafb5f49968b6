use crate::crypto::{verify_signature, Signature};
use crate::encoder::MessageEncoder;
use crate::error::ProtocolError;
use crate::promise::Promise;
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// A payer-signed wrapper binding a [`Promise`] to one agreement and one
/// recipient. Validated, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeMessage {
    pub promise: Promise,
    pub agreement_id: u64,
    pub agreement_total: U256,
    /// The payee this message is addressed to.
    pub party: Address,
    pub hash: B256,
    pub signature: Signature,
}

impl ExchangeMessage {
    /// Signing bytes: `hash(promise) ‖ agreementId ‖ agreementTotal ‖ party (raw 20 bytes)`.
    pub fn signing_bytes(promise_hash: B256, agreement_id: u64, agreement_total: U256, party: Address) -> Vec<u8> {
        MessageEncoder::new()
            .hash(promise_hash)
            .uint(agreement_id)
            .uint(agreement_total)
            .address(party)
            .finish()
    }
}

/// Validation shared by the provider and the relay.
///
/// Recomputes the wrapper's signing bytes and checks the payer's signature,
/// rejects a message addressed to anyone but `receiver` (so a message signed
/// for one payee cannot be replayed against another), then validates the
/// embedded promise against the same payer. Invoice checks are the provider's
/// concern and happen on top of this.
pub fn validate_exchange_message(receiver: Address, msg: &ExchangeMessage, payer: Address) -> Result<(), ProtocolError> {
    let message = ExchangeMessage::signing_bytes(msg.promise.hash, msg.agreement_id, msg.agreement_total, msg.party);
    if !verify_signature(&message, &msg.signature, payer) {
        return Err(ProtocolError::SignatureMismatch { context: "exchange message", expected_signer: payer });
    }
    if receiver != msg.party {
        return Err(ProtocolError::PartyMismatch { party: msg.party, receiver });
    }
    msg.promise.validate(payer)
}
