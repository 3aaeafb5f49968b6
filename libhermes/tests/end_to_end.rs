//! Full protocol scenario: provider invoices, consumer answers, hermes relays
//! between the two channels, provider settles the winning promise.

use libhermes::consumer::Consumer;
use libhermes::crypto::SecretKey;
use libhermes::hermes::HermesRelay;
use libhermes::ledger::ChannelRecord;
use libhermes::memory_ledger::MemoryLedger;
use libhermes::provider::Provider;
use libhermes::{Address, U256};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn key(byte: u8) -> SecretKey {
    SecretKey::from_slice(&[byte; 32]).unwrap()
}

const PAYER_CHANNEL: Address = Address::repeat_byte(0xC0);
const OUTGOING_CHANNEL: Address = Address::repeat_byte(0xD0);

#[test]
fn invoice_relay_and_settle() {
    env_logger::try_init().ok();
    let consumer_key = key(0x11);
    let hermes_key = key(0x33);
    let mut chain = MemoryLedger::new();
    let mut provider = Provider::new(key(0x22));
    let mut rng = StdRng::seed_from_u64(2024);

    chain.register_consumer_channel(consumer_key.address(), hermes_key.address(), PAYER_CHANNEL, U256::from(5000));
    chain.register_outgoing_channel(provider.address(), OUTGOING_CHANNEL, ChannelRecord::default());

    let mut consumer = Consumer::connect(consumer_key, hermes_key.address(), &chain).unwrap();
    assert_eq!(consumer.channel_id(), PAYER_CHANNEL);

    let follow_up_preimage;
    {
        let mut hermes = HermesRelay::new(hermes_key, &chain, &chain);

        // First invoice opens a new agreement for 1000 units.
        let invoice = provider.generate_invoice(U256::from(1000), None, U256::ZERO, &mut rng).unwrap();
        assert_eq!(invoice.agreement_total, U256::from(1000));

        let msg = consumer.create_exchange_message(&invoice, provider.address()).unwrap();
        provider.validate_exchange_message(&msg, consumer.address()).unwrap();

        let promise = hermes.exchange_promise(&msg, consumer.address(), provider.address()).unwrap();
        assert_eq!(promise.amount, U256::from(1000));
        assert_eq!(promise.channel_id, OUTGOING_CHANNEL);
        assert_eq!(promise.hashlock, invoice.hashlock);
        promise.validate(hermes.address()).unwrap();
        provider.save_promise(promise);

        // Second invoice for 500 on the same agreement relays the increment only.
        let invoice =
            provider.generate_invoice(U256::from(500), Some(invoice.agreement_id), U256::ZERO, &mut rng).unwrap();
        assert_eq!(invoice.agreement_total, U256::from(1500));
        follow_up_preimage = invoice.preimage;

        let msg = consumer.create_exchange_message(&invoice, provider.address()).unwrap();
        provider.validate_exchange_message(&msg, consumer.address()).unwrap();

        let promise = hermes.exchange_promise(&msg, consumer.address(), provider.address()).unwrap();
        assert_eq!(promise.amount, U256::from(1500));
        promise.validate(hermes.address()).unwrap();
        provider.save_promise(promise);

        let payer_state = hermes.channel_state(&PAYER_CHANNEL).unwrap();
        assert_eq!(payer_state.balance, U256::from(3500));
        assert_eq!(payer_state.promised, U256::from(1500));
        assert_eq!(hermes.channel_state(&OUTGOING_CHANNEL).unwrap().promised, U256::from(1500));
    }

    // Settle the biggest promise, revealing the second invoice's preimage.
    provider.settle_promise(&mut chain, None).unwrap();
    let settled = &chain.settlements()[0];
    assert_eq!(settled.amount, U256::from(1500));
    assert_eq!(settled.identity, provider.address());
    assert_eq!(settled.preimage, follow_up_preimage);
}
