use crate::error::LookupError;
use crate::ledger::{ChannelRecord, ChannelRegistry, TokenLedger};
use crate::settlement::{SettlementGateway, SettlementRequest};
use alloy_primitives::{Address, U256};
use std::cell::Cell;
use std::collections::BTreeMap;

/// In-memory stand-in for all three on-chain collaborators.
///
/// Lookups can be tripped after a configurable number of successes, which is
/// how the relay-atomicity tests simulate a collaborator dying mid-exchange.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: BTreeMap<Address, ChannelRecord>,
    balances: BTreeMap<Address, U256>,
    consumer_channels: BTreeMap<(Address, Address), Address>,
    outgoing_channels: BTreeMap<Address, Address>,
    settlements: Vec<SettlementRequest>,
    lookups_left: Cell<Option<u32>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        MemoryLedger::default()
    }

    /// Register a consumer channel for `identity` paying through `relay`,
    /// with `balance` on deposit.
    pub fn register_consumer_channel(&mut self, identity: Address, relay: Address, channel_id: Address, balance: U256) {
        self.consumer_channels.insert((identity, relay), channel_id);
        self.records.entry(channel_id).or_default();
        self.balances.insert(channel_id, balance);
    }

    /// Register the relay's outgoing channel towards `receiver`.
    pub fn register_outgoing_channel(&mut self, receiver: Address, channel_id: Address, record: ChannelRecord) {
        self.outgoing_channels.insert(receiver, channel_id);
        self.records.insert(channel_id, record);
    }

    /// Let the next `n` lookups succeed, then answer every call with
    /// [`LookupError::Unavailable`] until rearmed.
    pub fn fail_after_lookups(&self, n: u32) {
        self.lookups_left.set(Some(n));
    }

    pub fn settlements(&self) -> &[SettlementRequest] {
        &self.settlements
    }

    fn tick(&self) -> Result<(), LookupError> {
        if let Some(left) = self.lookups_left.get() {
            if left == 0 {
                return Err(LookupError::Unavailable("ledger offline".into()));
            }
            self.lookups_left.set(Some(left - 1));
        }
        Ok(())
    }
}

impl ChannelRegistry for MemoryLedger {
    fn channel_address(&self, identity: Address, relay: Address) -> Result<Address, LookupError> {
        self.tick()?;
        self.consumer_channels.get(&(identity, relay)).copied().ok_or(LookupError::UnknownChannel(identity))
    }

    fn outgoing_channel_id(&self, receiver: Address) -> Result<Address, LookupError> {
        self.tick()?;
        self.outgoing_channels.get(&receiver).copied().ok_or(LookupError::UnknownChannel(receiver))
    }

    fn channel_record(&self, channel_id: Address) -> Result<ChannelRecord, LookupError> {
        self.tick()?;
        self.records.get(&channel_id).copied().ok_or(LookupError::UnknownChannel(channel_id))
    }
}

impl TokenLedger for MemoryLedger {
    fn balance_of(&self, channel_id: Address) -> Result<U256, LookupError> {
        self.tick()?;
        self.balances.get(&channel_id).copied().ok_or(LookupError::UnknownChannel(channel_id))
    }
}

impl SettlementGateway for MemoryLedger {
    fn settle_promise(&mut self, request: &SettlementRequest) -> Result<(), LookupError> {
        self.tick()?;
        self.settlements.push(*request);
        Ok(())
    }
}
