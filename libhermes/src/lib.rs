pub mod channel;
pub mod consumer;
pub mod crypto;
pub mod encoder;
pub mod error;
pub mod exchange;
pub mod helpers;
pub mod hermes;
pub mod invoice;
pub mod ledger;
pub mod promise;
pub mod provider;
pub mod requests;
pub mod settlement;

#[cfg(feature = "dummy_ledger")]
pub mod memory_ledger;

pub use alloy_primitives::{Address, B256, U256};

/// Chain id used when none is given explicitly (mainnet, or a local devnet).
pub const DEFAULT_CHAIN_ID: u64 = 1;
