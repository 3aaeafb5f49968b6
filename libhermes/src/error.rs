use alloy_primitives::{Address, B256, U256};
use thiserror::Error;

/// A failure while querying one of the on-chain collaborators.
///
/// Lookups are read-only, so these errors are safe to retry. They must never
/// be surfaced as a protocol violation and must never leave cached channel
/// state half-updated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("no channel record found for {0}")]
    UnknownChannel(Address),
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

/// Everything that can go wrong while constructing, validating or relaying a
/// payment message. Each variant names the invariant that broke; none of them
/// is ever downgraded to a warning, and no state is written once one fires.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("{context} signature does not verify against {expected_signer}")]
    SignatureMismatch { context: &'static str, expected_signer: Address },
    #[error("exchange message is addressed to {party}, not to receiver {receiver}")]
    PartyMismatch { party: Address, receiver: Address },
    #[error("no outstanding invoice for hashlock {0}")]
    UnknownInvoice(B256),
    #[error("an invoice with hashlock {0} is already outstanding")]
    HashlockCollision(B256),
    #[error("agreement {agreement_id} mismatch: invoice says {expected}, message says {actual}")]
    AgreementMismatch { agreement_id: u64, expected: U256, actual: U256 },
    #[error("agreement {agreement_id} total {total} is below the {covered} already covered")]
    StaleAgreementTotal { agreement_id: u64, total: U256, covered: U256 },
    #[error("channel {channel_id} balance {balance} cannot cover {required}")]
    InsufficientBalance { channel_id: Address, balance: U256, required: U256 },
    #[error("promise amount {actual} does not extend the promised total to {expected}")]
    PromiseBaseMismatch { expected: U256, actual: U256 },
    #[error("no promises have been recorded")]
    NoPromises,
    #[error("signing failed: {0}")]
    Signing(String),
    #[error(transparent)]
    Lookup(#[from] LookupError),
}
