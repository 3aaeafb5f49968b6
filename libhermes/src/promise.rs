use crate::channel::ChannelState;
use crate::crypto::{sign_message, verify_signature, SecretKey, Signature};
use crate::encoder::MessageEncoder;
use crate::error::ProtocolError;
use alloy_primitives::{keccak256, Address, B256, U256};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

/// A signed claim that a channel's counter-party will release a cumulative
/// `amount`, redeemable by whoever can reveal the preimage of `hashlock`.
///
/// `amount` is a running total for the channel, never an increment, so the
/// newest promise supersedes every older one and replaying an old promise
/// gains nothing. A promise is immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promise {
    pub chain_id: u64,
    /// Channel address the promise settles against.
    pub channel_id: Address,
    /// Total cumulative amount released once this promise settles.
    pub amount: U256,
    /// Fee paid to whoever submits the settlement transaction.
    pub fee: U256,
    pub hashlock: B256,
    /// keccak256 of the canonical encoding below.
    pub hash: B256,
    pub signature: Signature,
    /// Receiver identity used for settlement routing, when known.
    pub receiver: Option<Address>,
}

impl Promise {
    /// Canonical signing bytes: `chainId ‖ channelId (word) ‖ amount ‖ fee ‖ hashlock`.
    pub fn signing_bytes(chain_id: u64, channel_id: Address, amount: U256, fee: U256, hashlock: B256) -> Vec<u8> {
        MessageEncoder::new()
            .uint(chain_id)
            .address_word(channel_id)
            .uint(amount)
            .uint(fee)
            .hash(hashlock)
            .finish()
    }

    pub fn create(
        chain_id: u64,
        channel_id: Address,
        amount: U256,
        fee: U256,
        hashlock: B256,
        key: &SecretKey,
        receiver: Option<Address>,
    ) -> Result<Self, ProtocolError> {
        let message = Self::signing_bytes(chain_id, channel_id, amount, fee, hashlock);
        let signature = sign_message(&message, key)?;
        Ok(Promise { chain_id, channel_id, amount, fee, hashlock, hash: keccak256(&message), signature, receiver })
    }

    /// Recompute the canonical encoding and check the signature against
    /// `expected_signer`. Any single-byte difference in any field fails.
    pub fn validate(&self, expected_signer: Address) -> Result<(), ProtocolError> {
        let message = Self::signing_bytes(self.chain_id, self.channel_id, self.amount, self.fee, self.hashlock);
        if !verify_signature(&message, &self.signature, expected_signer) {
            return Err(ProtocolError::SignatureMismatch { context: "promise", expected_signer });
        }
        Ok(())
    }
}

/// Invoice-and-promise in one step, for the case where a single party both
/// bills and pays (no separate provider). Draws a fresh preimage from `rng`
/// and promises `settled + amount_to_pay + fee`, returning the promise
/// together with its HTLC lock.
pub fn generate_promise<R: RngCore + CryptoRng>(
    amount_to_pay: U256,
    fee: U256,
    channel_state: &ChannelState,
    channel_id: Address,
    key: &SecretKey,
    receiver: Option<Address>,
    rng: &mut R,
) -> Result<(Promise, B256), ProtocolError> {
    let amount = channel_state.settled + amount_to_pay + fee;
    let mut lock = B256::ZERO;
    rng.fill_bytes(&mut lock.0);
    let hashlock = keccak256(lock);
    let promise = Promise::create(crate::DEFAULT_CHAIN_ID, channel_id, amount, fee, hashlock, key, receiver)?;
    Ok((promise, lock))
}
