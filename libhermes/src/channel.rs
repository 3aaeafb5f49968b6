use crate::ledger::ChannelRecord;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Off-chain mirror of one payment channel's ledger.
///
/// `promised` and every entry of `agreements` are non-decreasing for the whole
/// life of the mirror; callers only ever advance them through the agents in
/// this crate, which validate before they write. The mirror lives for a single
/// relay/session and is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelState {
    /// Amount already withdrawn on-chain.
    pub settled: U256,
    /// On-chain deposit still available to cover new promises.
    pub balance: U256,
    /// Cumulative amount covered by every promise issued so far.
    pub promised: U256,
    /// Running total per agreement id.
    pub agreements: BTreeMap<u64, U256>,
}

impl ChannelState {
    /// Seed for a payer channel the relay sees for the first time: the deposit
    /// comes from the token ledger, nothing has been promised through us yet.
    pub fn incoming(record: &ChannelRecord, balance: U256) -> Self {
        ChannelState { settled: record.settled, balance, promised: U256::ZERO, agreements: BTreeMap::new() }
    }

    /// Mirror of an on-chain record, used to seed the relay's outgoing channels.
    pub fn from_record(record: &ChannelRecord) -> Self {
        ChannelState {
            settled: record.settled,
            balance: record.balance,
            promised: record.promised,
            agreements: BTreeMap::new(),
        }
    }

    /// Running total for an agreement, zero if we have never seen it.
    pub fn agreement_total(&self, agreement_id: u64) -> U256 {
        self.agreements.get(&agreement_id).copied().unwrap_or(U256::ZERO)
    }
}
