use crate::error::LookupError;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// On-chain view of a channel, as reported by the channel ledger collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub settled: U256,
    pub balance: U256,
    pub promised: U256,
}

/// Read-only boundary to the contract registry that maps identities to
/// channel addresses and serves channel records. The core never reimplements
/// contract-side validation; it only mirrors what this boundary reports.
pub trait ChannelRegistry {
    /// Channel address for `identity` paying through `relay`.
    fn channel_address(&self, identity: Address, relay: Address) -> Result<Address, LookupError>;

    /// The relay's outgoing channel towards `receiver`.
    fn outgoing_channel_id(&self, receiver: Address) -> Result<Address, LookupError>;

    fn channel_record(&self, channel_id: Address) -> Result<ChannelRecord, LookupError>;
}

/// Token balance boundary, consulted once when a channel is first cached.
pub trait TokenLedger {
    fn balance_of(&self, channel_id: Address) -> Result<U256, LookupError>;
}

impl<T: ChannelRegistry + ?Sized> ChannelRegistry for &T {
    fn channel_address(&self, identity: Address, relay: Address) -> Result<Address, LookupError> {
        (**self).channel_address(identity, relay)
    }

    fn outgoing_channel_id(&self, receiver: Address) -> Result<Address, LookupError> {
        (**self).outgoing_channel_id(receiver)
    }

    fn channel_record(&self, channel_id: Address) -> Result<ChannelRecord, LookupError> {
        (**self).channel_record(channel_id)
    }
}

impl<T: TokenLedger + ?Sized> TokenLedger for &T {
    fn balance_of(&self, channel_id: Address) -> Result<U256, LookupError> {
        (**self).balance_of(channel_id)
    }
}
