use alloy_primitives::ruint::UintTryFrom;
use alloy_primitives::{Address, B256, U256};

/// Deterministic byte-string builder for everything that gets signed.
///
/// The verifying contract hashes the raw concatenation of fields, so the
/// encoding carries no lengths, no tags and no structure: integers are 32-byte
/// big-endian words, addresses are either a zero-padded word or the raw 20
/// bytes depending on the message layout, and hashes and prefixes go in
/// verbatim. Any reordering or width change produces a different hash and
/// therefore a verification failure.
#[derive(Debug, Default, Clone)]
pub struct MessageEncoder {
    buf: Vec<u8>,
}

impl MessageEncoder {
    pub fn new() -> Self {
        MessageEncoder { buf: Vec::new() }
    }

    /// Start the message with an ASCII domain-separation prefix.
    pub fn with_prefix(prefix: &str) -> Self {
        let mut encoder = MessageEncoder::new();
        encoder.buf.extend_from_slice(prefix.as_bytes());
        encoder
    }

    /// Append an integer as a 32-byte big-endian word.
    pub fn uint<T>(mut self, value: T) -> Self
    where
        U256: UintTryFrom<T>,
    {
        self.buf.extend_from_slice(&U256::from(value).to_be_bytes::<32>());
        self
    }

    /// Append an address left-zero-padded to a full 32-byte word.
    pub fn address_word(mut self, address: Address) -> Self {
        self.buf.extend_from_slice(&[0u8; 12]);
        self.buf.extend_from_slice(address.as_slice());
        self
    }

    /// Append an address as its raw 20 bytes.
    pub fn address(mut self, address: Address) -> Self {
        self.buf.extend_from_slice(address.as_slice());
        self
    }

    /// Append a 32-byte hash verbatim.
    pub fn hash(mut self, hash: B256) -> Self {
        self.buf.extend_from_slice(hash.as_slice());
        self
    }

    /// Append raw variable-length bytes verbatim.
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn uint_is_a_big_endian_word() {
        let bytes = MessageEncoder::new().uint(0x0102u64).finish();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[30..], &[0x01, 0x02]);
        assert!(bytes[..30].iter().all(|b| *b == 0));
    }

    #[test]
    fn address_widths() {
        let address = Address::repeat_byte(0x42);
        let padded = MessageEncoder::new().address_word(address).finish();
        assert_eq!(padded.len(), 32);
        assert_eq!(&padded[..12], &[0u8; 12]);
        assert_eq!(&padded[12..], address.as_slice());

        let raw = MessageEncoder::new().address(address).finish();
        assert_eq!(raw, address.as_slice());
    }

    #[test]
    fn prefix_and_field_order() {
        let hash = B256::repeat_byte(0x07);
        let bytes = MessageEncoder::with_prefix("Exit request:").hash(hash).uint(5u64).finish();
        assert_eq!(&bytes[..13], b"Exit request:");
        assert_eq!(&bytes[13..45], hash.as_slice());
        assert_eq!(bytes[44 + 32], 5);

        // Swapping the fields yields a different string
        let swapped = MessageEncoder::with_prefix("Exit request:").uint(5u64).hash(hash).finish();
        assert_ne!(bytes, swapped);
    }

    #[test]
    fn raw_bytes_are_unframed() {
        let bytes = MessageEncoder::new().bytes(b"https://example.org").uint(1u64).finish();
        assert_eq!(&bytes[..19], b"https://example.org");
        assert_eq!(bytes.len(), 19 + 32);
    }
}
