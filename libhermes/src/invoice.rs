use crate::error::ProtocolError;
use alloy_primitives::{keccak256, B256, U256};
use log::*;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A hash-locked request for payment under one agreement.
///
/// The preimage is the HTLC secret: it stays with the issuing provider and
/// must never travel in any protocol message until settlement reveals it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub preimage: B256,
    /// keccak256 of the preimage; also the invoice's identity.
    pub hashlock: B256,
    pub agreement_id: u64,
    /// Cumulative amount billed under the agreement, this invoice included.
    pub agreement_total: U256,
    pub fee: U256,
}

/// Provider-side book of outstanding invoices and per-agreement totals.
#[derive(Debug, Clone, Default)]
pub struct InvoiceLedger {
    invoices: BTreeMap<B256, Invoice>,
    agreements: BTreeMap<u64, U256>,
    last_agreement_id: u64,
}

impl InvoiceLedger {
    pub fn new() -> Self {
        InvoiceLedger::default()
    }

    /// Issue a new invoice for `amount`.
    ///
    /// Without an `agreement_id` the next sequential id is allocated with a
    /// zero running total. A caller-supplied id that has never been seen
    /// defines the agreement on first use instead of erroring. The preimage
    /// defaults to 32 fresh random bytes; tests may inject one.
    pub fn generate_invoice<R: RngCore + CryptoRng>(
        &mut self,
        amount: U256,
        agreement_id: Option<u64>,
        fee: U256,
        preimage: Option<B256>,
        rng: &mut R,
    ) -> Result<Invoice, ProtocolError> {
        let preimage = preimage.unwrap_or_else(|| {
            let mut secret = B256::ZERO;
            rng.fill_bytes(&mut secret.0);
            secret
        });
        let hashlock = keccak256(preimage);
        // Two outstanding invoices may never share a hashlock.
        if self.invoices.contains_key(&hashlock) {
            return Err(ProtocolError::HashlockCollision(hashlock));
        }

        let agreement_id = match agreement_id {
            Some(id) => id,
            None => {
                self.last_agreement_id += 1;
                self.agreements.insert(self.last_agreement_id, U256::ZERO);
                self.last_agreement_id
            }
        };

        let total = self.agreements.entry(agreement_id).or_insert(U256::ZERO);
        *total += amount;
        let invoice = Invoice { preimage, hashlock, agreement_id, agreement_total: *total, fee };
        self.invoices.insert(hashlock, invoice);
        debug!("issued invoice under agreement {agreement_id}, total now {}", invoice.agreement_total);
        Ok(invoice)
    }

    pub fn invoice(&self, hashlock: &B256) -> Option<&Invoice> {
        self.invoices.get(hashlock)
    }

    pub fn agreement_total(&self, agreement_id: u64) -> U256 {
        self.agreements.get(&agreement_id).copied().unwrap_or(U256::ZERO)
    }

    pub fn last_agreement_id(&self) -> u64 {
        self.last_agreement_id
    }

    /// Check an exchange message's invoice reference. Both the agreement id
    /// and the cumulative total must match the stored invoice exactly; a
    /// mismatch means a replayed or stale reference, or a payer trying to
    /// under- or over-pay the agreement.
    pub fn validate_invoice(&self, hashlock: B256, agreement_id: u64, agreement_total: U256) -> Result<(), ProtocolError> {
        let invoice = self.invoices.get(&hashlock).ok_or(ProtocolError::UnknownInvoice(hashlock))?;
        if invoice.agreement_id != agreement_id || invoice.agreement_total != agreement_total {
            return Err(ProtocolError::AgreementMismatch {
                agreement_id,
                expected: invoice.agreement_total,
                actual: agreement_total,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(99)
    }

    #[test]
    fn fresh_agreements_get_sequential_ids() {
        let mut ledger = InvoiceLedger::new();
        let mut rng = rng();
        let first = ledger.generate_invoice(U256::from(100), None, U256::ZERO, None, &mut rng).unwrap();
        let second = ledger.generate_invoice(U256::from(50), None, U256::ZERO, None, &mut rng).unwrap();
        assert_eq!(first.agreement_id, 1);
        assert_eq!(second.agreement_id, 2);
        assert_eq!(ledger.last_agreement_id(), 2);
    }

    #[test]
    fn totals_accumulate_and_never_decrease() {
        let mut ledger = InvoiceLedger::new();
        let mut rng = rng();
        let amounts = [100u64, 250, 180, 1];
        let mut sum = U256::ZERO;
        let id = ledger.generate_invoice(U256::ZERO, None, U256::ZERO, None, &mut rng).unwrap().agreement_id;
        for amount in amounts {
            let before = ledger.agreement_total(id);
            let invoice =
                ledger.generate_invoice(U256::from(amount), Some(id), U256::ZERO, None, &mut rng).unwrap();
            sum += U256::from(amount);
            assert_eq!(invoice.agreement_total, sum);
            assert!(ledger.agreement_total(id) >= before);
        }
        assert_eq!(ledger.agreement_total(id), sum);
    }

    #[test]
    fn first_use_defines_an_unknown_agreement() {
        let mut ledger = InvoiceLedger::new();
        let invoice =
            ledger.generate_invoice(U256::from(77), Some(1234), U256::ZERO, None, &mut rng()).unwrap();
        assert_eq!(invoice.agreement_id, 1234);
        assert_eq!(invoice.agreement_total, U256::from(77));
    }

    #[test]
    fn hashlock_collision_is_rejected() {
        let mut ledger = InvoiceLedger::new();
        let mut rng = rng();
        let secret = B256::repeat_byte(0x55);
        ledger.generate_invoice(U256::from(10), None, U256::ZERO, Some(secret), &mut rng).unwrap();
        let err = ledger
            .generate_invoice(U256::from(10), None, U256::ZERO, Some(secret), &mut rng)
            .unwrap_err();
        assert_eq!(err, ProtocolError::HashlockCollision(keccak256(secret)));
    }

    #[test]
    fn injected_preimage_is_used_verbatim() {
        let mut ledger = InvoiceLedger::new();
        let secret = B256::repeat_byte(0xAA);
        let invoice =
            ledger.generate_invoice(U256::from(10), None, U256::ZERO, Some(secret), &mut rng()).unwrap();
        assert_eq!(invoice.preimage, secret);
        assert_eq!(invoice.hashlock, keccak256(secret));
        assert_eq!(ledger.invoice(&invoice.hashlock), Some(&invoice));
    }

    #[test]
    fn validate_invoice_requires_exact_match() {
        let mut ledger = InvoiceLedger::new();
        let invoice = ledger.generate_invoice(U256::from(10), None, U256::from(1), None, &mut rng()).unwrap();

        ledger.validate_invoice(invoice.hashlock, invoice.agreement_id, invoice.agreement_total).unwrap();

        let err = ledger.validate_invoice(B256::repeat_byte(0x01), invoice.agreement_id, invoice.agreement_total);
        assert_eq!(err, Err(ProtocolError::UnknownInvoice(B256::repeat_byte(0x01))));

        assert!(ledger.validate_invoice(invoice.hashlock, invoice.agreement_id + 1, invoice.agreement_total).is_err());
        assert!(ledger
            .validate_invoice(invoice.hashlock, invoice.agreement_id, invoice.agreement_total + U256::from(1))
            .is_err());
    }
}
