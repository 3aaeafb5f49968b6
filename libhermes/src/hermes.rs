use crate::channel::ChannelState;
use crate::crypto::SecretKey;
use crate::error::ProtocolError;
use crate::exchange::{validate_exchange_message, ExchangeMessage};
use crate::ledger::{ChannelRegistry, TokenLedger};
use crate::promise::Promise;
use alloy_primitives::{Address, U256};
use log::*;
use std::collections::BTreeMap;

/// The relaying settlement agent ("hermes").
///
/// It bridges two otherwise independent channels: a verified debit against the
/// payer's channel produces exactly one credit promise against the receiver's
/// outgoing channel, for the identical amount and under the same hashlock, so
/// the receiver can redeem with the preimage the original provider reveals.
///
/// The relay owns a cache of every channel it has touched, keyed by channel
/// address. All operations take `&mut self`, which serializes channel updates
/// within one relay; a concurrent wrapper must keep one critical section per
/// channel and lock payer before payee channels in a fixed global order.
#[derive(Debug)]
pub struct HermesRelay<R, T> {
    operator: SecretKey,
    registry: R,
    token: T,
    channels: BTreeMap<Address, ChannelState>,
}

impl<R: ChannelRegistry, T: TokenLedger> HermesRelay<R, T> {
    pub fn new(operator: SecretKey, registry: R, token: T) -> Self {
        HermesRelay { operator, registry, token, channels: BTreeMap::new() }
    }

    pub fn address(&self) -> Address {
        self.operator.address()
    }

    pub fn channel_state(&self, channel_id: &Address) -> Option<&ChannelState> {
        self.channels.get(channel_id)
    }

    fn ensure_incoming_channel(&mut self, channel_id: Address, agreement_id: u64) -> Result<(), ProtocolError> {
        if !self.channels.contains_key(&channel_id) {
            let record = self.registry.channel_record(channel_id)?;
            let balance = self.token.balance_of(channel_id)?;
            debug!("caching payer channel {channel_id} with balance {balance}");
            self.channels.insert(channel_id, ChannelState::incoming(&record, balance));
        }
        if let Some(state) = self.channels.get_mut(&channel_id) {
            state.agreements.entry(agreement_id).or_insert(U256::ZERO);
        }
        Ok(())
    }

    fn ensure_outgoing_channel(&mut self, receiver: Address) -> Result<Address, ProtocolError> {
        let channel_id = self.registry.outgoing_channel_id(receiver)?;
        if !self.channels.contains_key(&channel_id) {
            let record = self.registry.channel_record(channel_id)?;
            debug!("caching outgoing channel {channel_id} for receiver {receiver}");
            self.channels.insert(channel_id, ChannelState::from_record(&record));
        }
        Ok(channel_id)
    }

    /// Verify an exchange message from `payer` and relay its value to
    /// `receiver`'s outgoing channel, returning the new promise signed with
    /// the relay's own key.
    ///
    /// Every collaborator lookup completes before any cached state changes, so
    /// a failed lookup, an insufficient balance or a stale promise base all
    /// leave both channels exactly as they were. Once the checks pass, the
    /// payer debit and the receiver credit are committed together.
    pub fn exchange_promise(
        &mut self,
        msg: &ExchangeMessage,
        payer: Address,
        receiver: Address,
    ) -> Result<Promise, ProtocolError> {
        validate_exchange_message(receiver, msg, payer)?;

        let payer_channel = msg.promise.channel_id;
        let agreement_id = msg.agreement_id;
        self.ensure_incoming_channel(payer_channel, agreement_id)?;
        let outgoing_id = self.ensure_outgoing_channel(receiver)?;

        let incoming = &self.channels[&payer_channel];
        let covered = incoming.agreement_total(agreement_id);
        // The part of the agreement not yet covered by earlier promises.
        let amount = msg.agreement_total.checked_sub(covered).ok_or(ProtocolError::StaleAgreementTotal {
            agreement_id,
            total: msg.agreement_total,
            covered,
        })?;
        if incoming.balance < amount {
            return Err(ProtocolError::InsufficientBalance {
                channel_id: payer_channel,
                balance: incoming.balance,
                required: amount,
            });
        }
        // The payer promise must extend our view of the channel, not some stale base.
        let expected = incoming.promised + amount;
        if msg.promise.amount != expected {
            return Err(ProtocolError::PromiseBaseMismatch { expected, actual: msg.promise.amount });
        }

        let outgoing_promised = self.channels[&outgoing_id].promised + amount;
        // Issue the outgoing promise before committing, so even a signing
        // failure cannot leave a debit without its matching credit.
        let promise = Promise::create(
            msg.promise.chain_id,
            outgoing_id,
            outgoing_promised,
            U256::ZERO,
            msg.promise.hashlock,
            &self.operator,
            Some(receiver),
        )?;

        if let Some(state) = self.channels.get_mut(&payer_channel) {
            state.balance -= amount;
            *state.agreements.entry(agreement_id).or_insert(U256::ZERO) += amount;
            state.promised += amount;
        }
        if let Some(state) = self.channels.get_mut(&outgoing_id) {
            state.promised = outgoing_promised;
        }
        info!("relayed {amount} from channel {payer_channel} to {outgoing_id} for {receiver}");
        Ok(promise)
    }
}
