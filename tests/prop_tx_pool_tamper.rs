// Copyright (c) 2026 Peerpool
// Licensed under the Apache License, Version 2.0

#![forbid(unsafe_code)]

use proptest::prelude::*;

use peerpool::core::txpool::{TransactionPool, TxPoolError};
use peerpool::core::types::Transaction;
use serde_json::Number;

fn arb_tx() -> impl Strategy<Value = Transaction> {
    ("[a-z0-9]{1,12}", "[a-z0-9]{1,12}", any::<u64>(), any::<u32>(), "[a-f0-9]{0,16}").prop_map(
        |(s, r, amount, ts, sig)| {
            Transaction::new_signed(s, r, Number::from(amount), Number::from(ts), sig)
                .expect("encode")
        },
    )
}

proptest! {
    #[test]
    fn tampered_field_is_rejected(tx in arb_tx(), field in 0usize..5) {
        let mut bad = tx.clone();
        match field {
            0 => bad.sender.push('x'),
            1 => bad.receiver.push('x'),
            2 => bad.amount = Number::from(tx.amount.as_u64().unwrap_or(0).wrapping_add(1)),
            3 => bad.timestamp = Number::from(tx.timestamp.as_u64().unwrap_or(0) + 1),
            _ => bad.signature.push('0'),
        }

        let mut pool = TransactionPool::default();
        pool.initialize();
        prop_assert_eq!(
            pool.process_transaction(&bad.to_json_bytes().unwrap()),
            Err(TxPoolError::InvalidHash)
        );
        prop_assert!(pool.get_transaction(&bad.hash).is_none());
        prop_assert!(pool.get_transaction_pool().is_empty());
        prop_assert_eq!(pool.processed_count(), 0);
    }

    #[test]
    fn resubmission_admits_once(tx in arb_tx(), repeats in 1usize..5) {
        let mut pool = TransactionPool::default();
        pool.initialize();
        let raw = tx.to_json_bytes().unwrap();

        prop_assert_eq!(pool.process_transaction(&raw), Ok(tx.hash.clone()));
        for _ in 0..repeats {
            prop_assert_eq!(
                pool.process_transaction(&raw),
                Err(TxPoolError::AlreadyProcessed(tx.hash.clone()))
            );
        }
        prop_assert_eq!(pool.get_transaction_pool(), vec![tx]);
    }

    #[test]
    fn processed_leaves_pending_view_but_stays_retrievable(
        txs in proptest::collection::vec(arb_tx(), 1..16)
    ) {
        let mut pool = TransactionPool::default();
        pool.initialize();
        let mut admitted = Vec::new();
        for tx in txs.iter() {
            if let Ok(h) = pool.process_transaction(&tx.to_json_bytes().unwrap()) {
                admitted.push(h);
            }
        }

        let target = admitted[0].clone();
        pool.mark_transaction_processed(&target).unwrap();
        prop_assert!(pool.get_transaction_pool().iter().all(|t| t.hash != target));
        prop_assert!(pool.get_transaction(&target).is_some());
        prop_assert_eq!(pool.pending_count(), admitted.len() - 1);
    }
}
