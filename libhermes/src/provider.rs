use crate::crypto::SecretKey;
use crate::error::ProtocolError;
use crate::exchange::{validate_exchange_message, ExchangeMessage};
use crate::invoice::{Invoice, InvoiceLedger};
use crate::promise::Promise;
use crate::settlement::{SettlementGateway, SettlementRequest};
use alloy_primitives::{Address, U256};
use log::*;
use rand::{CryptoRng, RngCore};

/// The paid side of the protocol: issues invoices, verifies what comes back,
/// hoards promises and settles the best one.
#[derive(Debug)]
pub struct Provider {
    identity: SecretKey,
    ledger: InvoiceLedger,
    promises: Vec<Promise>,
}

impl Provider {
    pub fn new(identity: SecretKey) -> Self {
        Provider { identity, ledger: InvoiceLedger::new(), promises: Vec::new() }
    }

    pub fn address(&self) -> Address {
        self.identity.address()
    }

    pub fn ledger(&self) -> &InvoiceLedger {
        &self.ledger
    }

    pub fn generate_invoice<R: RngCore + CryptoRng>(
        &mut self,
        amount: U256,
        agreement_id: Option<u64>,
        fee: U256,
        rng: &mut R,
    ) -> Result<Invoice, ProtocolError> {
        self.ledger.generate_invoice(amount, agreement_id, fee, None, rng)
    }

    /// Full inbound validation: the shared signature/party/promise checks,
    /// then the invoice reference against our own book. Any failure rejects
    /// the message outright.
    pub fn validate_exchange_message(&self, msg: &ExchangeMessage, payer: Address) -> Result<(), ProtocolError> {
        validate_exchange_message(self.address(), msg, payer)?;
        self.ledger.validate_invoice(msg.promise.hashlock, msg.agreement_id, msg.agreement_total)
    }

    pub fn save_promise(&mut self, promise: Promise) {
        debug!("provider {} stored promise for {}", self.address(), promise.amount);
        self.promises.push(promise);
    }

    pub fn promises(&self) -> &[Promise] {
        &self.promises
    }

    /// The promise with the largest cumulative amount. It supersedes every
    /// other stored promise, so it is the only one worth settling.
    pub fn biggest_promise(&self) -> Option<&Promise> {
        self.promises.iter().max_by_key(|promise| promise.amount)
    }

    /// Redeem one promise on-chain, defaulting to the biggest stored one. The
    /// matching invoice supplies the preimage; settling a promise whose
    /// hashlock we never invoiced is a hard error.
    pub fn settle_promise<G: SettlementGateway>(
        &self,
        gateway: &mut G,
        promise: Option<&Promise>,
    ) -> Result<(), ProtocolError> {
        let promise = match promise {
            Some(promise) => promise,
            None => self.biggest_promise().ok_or(ProtocolError::NoPromises)?,
        };
        let invoice = self.ledger.invoice(&promise.hashlock).ok_or(ProtocolError::UnknownInvoice(promise.hashlock))?;
        let request = SettlementRequest {
            identity: promise.receiver.unwrap_or(self.address()),
            amount: promise.amount,
            fee: promise.fee,
            preimage: invoice.preimage,
            signature: promise.signature,
        };
        info!("settling promise of {} for {}", request.amount, request.identity);
        gateway.settle_promise(&request)?;
        Ok(())
    }
}
