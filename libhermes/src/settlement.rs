use crate::crypto::Signature;
use crate::encoder::MessageEncoder;
use crate::error::LookupError;
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// 4-byte selector of `settlePromise(uint256,uint256,bytes32,bytes32,bytes memory)`.
pub const SETTLE_PROMISE_SELECTOR: [u8; 4] = [0x8e, 0x24, 0x28, 0x0c];

/// One on-chain settlement call: redeem exactly one promise, revealing the
/// invoice preimage for the first and only time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRequest {
    /// Identity the settled funds are credited to.
    pub identity: Address,
    pub amount: U256,
    pub fee: U256,
    pub preimage: B256,
    pub signature: Signature,
}

/// Boundary that submits settlement calls to the channel contract.
pub trait SettlementGateway {
    fn settle_promise(&mut self, request: &SettlementRequest) -> Result<(), LookupError>;
}

impl SettlementRequest {
    /// The exact calldata the contract accepts: the selector, four word-aligned
    /// fields, then the signature as a dynamic byte array.
    pub fn payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(4 + 4 * 32 + 160);
        payload.extend_from_slice(&SETTLE_PROMISE_SELECTOR);
        let body = MessageEncoder::new()
            .address_word(self.identity)
            .uint(self.amount)
            .uint(self.fee)
            .hash(self.preimage)
            .finish();
        payload.extend_from_slice(&body);
        payload.extend_from_slice(&serialise_signature(&self.signature));
        payload
    }
}

/// Encode a signature as a Solidity `bytes memory` argument with its fixed
/// 3-word header: the offset word (160), the length word (65), the 65
/// signature bytes and a zero footer padding the tail to a word boundary.
pub fn serialise_signature(signature: &Signature) -> Vec<u8> {
    let mut out = Vec::with_capacity(160);
    out.extend_from_slice(&U256::from(160u64).to_be_bytes::<32>());
    out.extend_from_slice(&U256::from(65u64).to_be_bytes::<32>());
    out.extend_from_slice(signature.as_bytes());
    out.extend_from_slice(&[0u8; 31]);
    out
}
