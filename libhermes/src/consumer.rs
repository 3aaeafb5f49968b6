use crate::channel::ChannelState;
use crate::crypto::{sign_message, SecretKey};
use crate::error::{LookupError, ProtocolError};
use crate::exchange::ExchangeMessage;
use crate::invoice::Invoice;
use crate::ledger::ChannelRegistry;
use crate::promise::Promise;
use alloy_primitives::{keccak256, Address};
use log::*;

/// The paying side of a channel.
///
/// The consumer is the only writer of its own channel mirror: every exchange
/// message it emits advances `promised` and the referenced agreement total,
/// and nothing else does. Operations must be serialized per consumer, which
/// `&mut self` already enforces.
#[derive(Debug)]
pub struct Consumer {
    operator: SecretKey,
    channel_id: Address,
    chain_id: u64,
    state: ChannelState,
}

impl Consumer {
    pub fn new(operator: SecretKey, channel_id: Address) -> Self {
        Consumer { operator, channel_id, chain_id: crate::DEFAULT_CHAIN_ID, state: ChannelState::default() }
    }

    /// Resolve the channel address for this identity and `relay` through the
    /// registry collaborator.
    pub fn connect<R: ChannelRegistry>(operator: SecretKey, relay: Address, registry: &R) -> Result<Self, LookupError> {
        let channel_id = registry.channel_address(operator.address(), relay)?;
        Ok(Consumer::new(operator, channel_id))
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn address(&self) -> Address {
        self.operator.address()
    }

    pub fn channel_id(&self) -> Address {
        self.channel_id
    }

    pub fn state(&self) -> &ChannelState {
        &self.state
    }

    /// Answer an invoice with a signed exchange message addressed to `party`.
    ///
    /// The promised amount is cumulative: the previous channel total plus
    /// whatever part of the invoice's agreement total this channel has not
    /// covered yet, plus the fee. The channel mirror advances only after the
    /// message is fully constructed and signed; a failure anywhere leaves it
    /// untouched.
    pub fn create_exchange_message(&mut self, invoice: &Invoice, party: Address) -> Result<ExchangeMessage, ProtocolError> {
        let covered = self.state.agreement_total(invoice.agreement_id);
        let diff = invoice.agreement_total.checked_sub(covered).ok_or(ProtocolError::StaleAgreementTotal {
            agreement_id: invoice.agreement_id,
            total: invoice.agreement_total,
            covered,
        })?;
        let amount = self.state.promised + diff + invoice.fee;

        let promise =
            Promise::create(self.chain_id, self.channel_id, amount, invoice.fee, invoice.hashlock, &self.operator, None)?;
        let message =
            ExchangeMessage::signing_bytes(promise.hash, invoice.agreement_id, invoice.agreement_total, party);
        let signature = sign_message(&message, &self.operator)?;

        self.state.agreements.insert(invoice.agreement_id, invoice.agreement_total);
        self.state.promised = amount;
        debug!("consumer {} promised {amount} on channel {}", self.address(), self.channel_id);

        Ok(ExchangeMessage {
            promise,
            agreement_id: invoice.agreement_id,
            agreement_total: invoice.agreement_total,
            party,
            hash: keccak256(&message),
            signature,
        })
    }
}
