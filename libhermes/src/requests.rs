//! Authorization messages for the off-channel-payment operations: channel
//! exits, fast withdrawals, beneficiary changes, stake adjustments, identity
//! registration and URL updates.
//!
//! Each signer is a thin field list over [`MessageEncoder`], reproducing the
//! byte layout the verifying contract expects. The ASCII prefixes are domain
//! separators so a signature for one operation can never be replayed as
//! another; the nonce fields are replay protection and must be strictly
//! increasing per signer or channel — the consuming contract enforces both,
//! together with `valid_until` expiry.

use crate::crypto::{sign_message, SecretKey, Signature};
use crate::encoder::MessageEncoder;
use crate::error::ProtocolError;
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

pub const EXIT_REQUEST_PREFIX: &str = "Exit request:";
pub const STAKE_RETURN_PREFIX: &str = "Stake return request";
pub const STAKE_GOAL_UPDATE_PREFIX: &str = "Stake goal update request";

/// A request to close a channel towards `beneficiary`, valid until the given
/// block time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitRequest {
    pub channel_id: Address,
    pub beneficiary: Address,
    pub valid_until: u64,
    pub signature: Signature,
}

/// Layout: `prefix ‖ channelId (raw) ‖ beneficiary (raw) ‖ validUntil`.
pub fn sign_exit_request(
    channel_id: Address,
    beneficiary: Address,
    valid_until: u64,
    operator: &SecretKey,
) -> Result<ExitRequest, ProtocolError> {
    let message = MessageEncoder::with_prefix(EXIT_REQUEST_PREFIX)
        .address(channel_id)
        .address(beneficiary)
        .uint(valid_until)
        .finish();
    let signature = sign_message(&message, operator)?;
    Ok(ExitRequest { channel_id, beneficiary, valid_until, signature })
}

/// A withdrawal that skips the exit delay because both the identity and the
/// hermes signed off on it. Each signature is verified independently by the
/// contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastWithdrawalRequest {
    pub channel_id: Address,
    pub amount: U256,
    pub fee: U256,
    pub beneficiary: Address,
    pub valid_until: u64,
    pub nonce: u64,
    pub identity_signature: Signature,
    pub hermes_signature: Signature,
}

/// Layout: `prefix ‖ chainId ‖ channelId (word) ‖ amount ‖ fee ‖ beneficiary (word) ‖ validUntil ‖ nonce`,
/// signed once by the identity and once by hermes.
#[allow(clippy::too_many_arguments)]
pub fn sign_fast_withdrawal(
    chain_id: u64,
    channel_id: Address,
    amount: U256,
    fee: U256,
    beneficiary: Address,
    valid_until: u64,
    nonce: u64,
    identity: &SecretKey,
    hermes: &SecretKey,
) -> Result<FastWithdrawalRequest, ProtocolError> {
    let message = MessageEncoder::with_prefix(EXIT_REQUEST_PREFIX)
        .uint(chain_id)
        .address_word(channel_id)
        .uint(amount)
        .uint(fee)
        .address_word(beneficiary)
        .uint(valid_until)
        .uint(nonce)
        .finish();
    let identity_signature = sign_message(&message, identity)?;
    let hermes_signature = sign_message(&message, hermes)?;
    Ok(FastWithdrawalRequest {
        channel_id,
        amount,
        fee,
        beneficiary,
        valid_until,
        nonce,
        identity_signature,
        hermes_signature,
    })
}

/// Layout: `chainId ‖ registry (raw) ‖ identity (raw) ‖ newBeneficiary (raw) ‖ registryNonce`.
pub fn sign_beneficiary_change(
    chain_id: u64,
    registry: Address,
    new_beneficiary: Address,
    registry_nonce: u64,
    identity: &SecretKey,
) -> Result<Signature, ProtocolError> {
    let message = MessageEncoder::new()
        .uint(chain_id)
        .address(registry)
        .address(identity.address())
        .address(new_beneficiary)
        .uint(registry_nonce)
        .finish();
    sign_message(&message, identity)
}

/// Layout: `chainId ‖ channelId (word) ‖ amount ‖ preimage ‖ beneficiary (raw)`.
pub fn sign_pay_and_settle_beneficiary(
    chain_id: u64,
    channel_id: Address,
    amount: U256,
    preimage: B256,
    beneficiary: Address,
    identity: &SecretKey,
) -> Result<Signature, ProtocolError> {
    let message = MessageEncoder::new()
        .uint(chain_id)
        .address_word(channel_id)
        .uint(amount)
        .hash(preimage)
        .address(beneficiary)
        .finish();
    sign_message(&message, identity)
}

/// Layout: `prefix ‖ chainId ‖ channelId (raw) ‖ amount ‖ fee ‖ channelNonce`.
pub fn sign_stake_return(
    chain_id: u64,
    channel_id: Address,
    amount: U256,
    fee: U256,
    channel_nonce: u64,
    identity: &SecretKey,
) -> Result<Signature, ProtocolError> {
    let message = MessageEncoder::with_prefix(STAKE_RETURN_PREFIX)
        .uint(chain_id)
        .address(channel_id)
        .uint(amount)
        .uint(fee)
        .uint(channel_nonce)
        .finish();
    sign_message(&message, identity)
}

/// Layout: `chainId=1 ‖ registry (raw) ‖ hermesId (raw) ‖ stake ‖ fee ‖ beneficiary (raw)`.
pub fn sign_identity_registration(
    registry: Address,
    hermes_id: Address,
    stake: U256,
    fee: U256,
    beneficiary: Address,
    identity: &SecretKey,
) -> Result<Signature, ProtocolError> {
    let message = MessageEncoder::new()
        .uint(crate::DEFAULT_CHAIN_ID)
        .address(registry)
        .address(hermes_id)
        .uint(stake)
        .uint(fee)
        .address(beneficiary)
        .finish();
    sign_message(&message, identity)
}

/// Layout: `chainId=1 ‖ registry (raw) ‖ hermesId (raw) ‖ fee`.
pub fn sign_channel_opening(
    registry: Address,
    hermes_id: Address,
    fee: U256,
    identity: &SecretKey,
) -> Result<Signature, ProtocolError> {
    let message = MessageEncoder::new()
        .uint(crate::DEFAULT_CHAIN_ID)
        .address(registry)
        .address(hermes_id)
        .uint(fee)
        .finish();
    sign_message(&message, identity)
}

/// Layout: `prefix ‖ chainId ‖ channelId (raw) ‖ stakeGoal ‖ channelNonce`.
pub fn sign_stake_goal_update(
    chain_id: u64,
    channel_id: Address,
    stake_goal: U256,
    channel_nonce: u64,
    identity: &SecretKey,
) -> Result<Signature, ProtocolError> {
    let message = MessageEncoder::with_prefix(STAKE_GOAL_UPDATE_PREFIX)
        .uint(chain_id)
        .address(channel_id)
        .uint(stake_goal)
        .uint(channel_nonce)
        .finish();
    sign_message(&message, identity)
}

/// Layout: `registry (raw) ‖ hermesId (raw) ‖ url bytes ‖ nonce`.
pub fn sign_url_update(
    registry: Address,
    hermes_id: Address,
    url: &str,
    nonce: u64,
    identity: &SecretKey,
) -> Result<Signature, ProtocolError> {
    let message = MessageEncoder::new()
        .address(registry)
        .address(hermes_id)
        .bytes(url.as_bytes())
        .uint(nonce)
        .finish();
    sign_message(&message, identity)
}
