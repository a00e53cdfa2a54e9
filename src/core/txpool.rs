// Copyright (c) 2026 Peerpool
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! Transaction intake pool: admission, dedup and pending/processed staging.
//!
//! ## Admission order
//! 1. Decode the raw bytes as a JSON object and extract
//!    `sender, receiver, amount, timestamp, signature, hash` in that order.
//!    Undecodable input, or the first absent or wrongly typed field, is
//!    reported as [`TxPoolError::MissingField`].
//! 2. Recompute the canonical digest ([`crate::core::types::canonical_hash`]).
//! 3. Reject any hash already known, pending or processed.
//! 4. Enforce `max_pending`, then stage as pending.
//!
//! Records are kept until [`TransactionPool::shutdown`].

use crate::config::PoolConfig;
use crate::core::types::{canonical_hash, Transaction, TxStatus};
use crate::monitoring::metrics::Metrics;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Transaction pool errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TxPoolError {
    /// `initialize` has not been called (or the pool was shut down).
    #[error("transaction pool not initialized")]
    NotInitialized,
    /// Input did not decode, or a required field is absent or mistyped.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    /// Declared hash does not match the canonical digest.
    #[error("invalid transaction hash")]
    InvalidHash,
    /// A transaction with this hash was already admitted.
    #[error("transaction {0} already processed")]
    AlreadyProcessed(String),
    /// Hash is not currently pending.
    #[error("transaction {0} not found in pool")]
    NotFoundInPool(String),
    /// `max_pending` reached.
    #[error("transaction pool full")]
    PoolFull,
}

#[derive(Clone, Debug)]
struct PoolEntry {
    tx: Transaction,
    status: TxStatus,
    // admission sequence, orders the pending view
    seq: u64,
}

/// In-memory transaction pool.
pub struct TransactionPool {
    cfg: PoolConfig,
    initialized: bool,
    records: BTreeMap<String, PoolEntry>,
    next_seq: u64,
    last_error: String,
    metrics: Option<Arc<Metrics>>,
}

impl Default for TransactionPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

fn str_field(obj: &Map<String, Value>, name: &'static str) -> Result<String, TxPoolError> {
    match obj.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(TxPoolError::MissingField(name)),
    }
}

fn num_field(obj: &Map<String, Value>, name: &'static str) -> Result<Number, TxPoolError> {
    match obj.get(name) {
        Some(Value::Number(n)) => Ok(n.clone()),
        _ => Err(TxPoolError::MissingField(name)),
    }
}

/// Decode raw ingestion bytes into a transaction (no hash check).
pub fn decode_transaction(raw: &[u8]) -> Result<Transaction, TxPoolError> {
    let obj = match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(m)) => m,
        _ => Map::new(),
    };
    Ok(Transaction {
        sender: str_field(&obj, "sender")?,
        receiver: str_field(&obj, "receiver")?,
        amount: num_field(&obj, "amount")?,
        timestamp: num_field(&obj, "timestamp")?,
        signature: str_field(&obj, "signature")?,
        hash: str_field(&obj, "hash")?,
    })
}

impl TransactionPool {
    /// Create an uninitialized pool.
    pub fn new(cfg: PoolConfig) -> Self {
        Self {
            cfg,
            initialized: false,
            records: BTreeMap::new(),
            next_seq: 0,
            last_error: String::new(),
            metrics: None,
        }
    }

    /// Attach a metrics sink.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Mark the pool ready and clear the retained error.
    pub fn initialize(&mut self) {
        self.initialized = true;
        self.last_error.clear();
        info!("transaction pool initialized");
    }

    /// Drop every record and return to the uninitialized state.
    pub fn shutdown(&mut self) {
        self.records.clear();
        self.next_seq = 0;
        self.initialized = false;
        self.sync_pending_gauge();
        info!("transaction pool shut down");
    }

    /// Whether `initialize` has been called since the last shutdown.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Basic liveness check.
    pub fn health_check(&self) -> bool {
        self.initialized
    }

    /// Validate, dedup and stage a raw transaction. Returns the admitted hash.
    pub fn process_transaction(&mut self, raw: &[u8]) -> Result<String, TxPoolError> {
        match self.admit(raw) {
            Ok(hash) => {
                if let Some(m) = &self.metrics {
                    m.tx_admitted_total.inc();
                }
                self.sync_pending_gauge();
                info!(hash = %hash, pending = self.pending_count(), "transaction admitted");
                Ok(hash)
            }
            Err(e) => {
                if let Some(m) = &self.metrics {
                    m.tx_rejected_total.inc();
                }
                Err(self.fail(e))
            }
        }
    }

    fn admit(&mut self, raw: &[u8]) -> Result<String, TxPoolError> {
        if !self.initialized {
            return Err(TxPoolError::NotInitialized);
        }
        let mut tx = decode_transaction(raw)?;

        let expected = canonical_hash(
            &tx.sender,
            &tx.receiver,
            &tx.amount,
            &tx.timestamp,
            &tx.signature,
        )
        .map_err(|_| TxPoolError::InvalidHash)?;
        if !expected.eq_ignore_ascii_case(&tx.hash) {
            return Err(TxPoolError::InvalidHash);
        }
        tx.hash = expected;

        if self.records.contains_key(&tx.hash) {
            return Err(TxPoolError::AlreadyProcessed(tx.hash));
        }
        if self.cfg.max_pending != 0 && self.pending_count() >= self.cfg.max_pending {
            return Err(TxPoolError::PoolFull);
        }

        let hash = tx.hash.clone();
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        self.records.insert(
            hash.clone(),
            PoolEntry {
                tx,
                status: TxStatus::Pending,
                seq,
            },
        );
        Ok(hash)
    }

    /// Look up a pending or processed transaction.
    pub fn get_transaction(&self, hash: &str) -> Option<Transaction> {
        self.records
            .get(&hash.to_ascii_lowercase())
            .map(|e| e.tx.clone())
    }

    /// Status of a known transaction.
    pub fn transaction_status(&self, hash: &str) -> Option<TxStatus> {
        self.records
            .get(&hash.to_ascii_lowercase())
            .map(|e| e.status)
    }

    /// Snapshot of pending transactions in admission order.
    pub fn get_transaction_pool(&self) -> Vec<Transaction> {
        let mut pending: Vec<&PoolEntry> = self
            .records
            .values()
            .filter(|e| e.status == TxStatus::Pending)
            .collect();
        pending.sort_by_key(|e| e.seq);
        pending.into_iter().map(|e| e.tx.clone()).collect()
    }

    /// Move a pending transaction to processed.
    pub fn mark_transaction_processed(&mut self, hash: &str) -> Result<(), TxPoolError> {
        let key = hash.to_ascii_lowercase();
        let pending = matches!(self.records.get(&key), Some(e) if e.status == TxStatus::Pending);
        if !pending {
            return Err(self.fail(TxPoolError::NotFoundInPool(hash.to_string())));
        }
        if let Some(e) = self.records.get_mut(&key) {
            e.status = TxStatus::Processed;
        }
        if let Some(m) = &self.metrics {
            m.tx_processed_total.inc();
        }
        self.sync_pending_gauge();
        info!(hash = %key, "transaction processed");
        Ok(())
    }

    /// Number of pending transactions.
    pub fn pending_count(&self) -> usize {
        self.records
            .values()
            .filter(|e| e.status == TxStatus::Pending)
            .count()
    }

    /// Number of processed transactions.
    pub fn processed_count(&self) -> usize {
        self.records.len() - self.pending_count()
    }

    /// Most recent failure message ("" if none or cleared).
    pub fn last_error(&self) -> &str {
        &self.last_error
    }

    /// Forget the retained failure message.
    pub fn clear_last_error(&mut self) {
        self.last_error.clear();
    }

    fn fail(&mut self, e: TxPoolError) -> TxPoolError {
        debug!(error = %e, "transaction pool operation rejected");
        self.last_error = e.to_string();
        e
    }

    fn sync_pending_gauge(&self) {
        if let Some(m) = &self.metrics {
            m.tx_pending.set(self.pending_count() as i64);
        }
    }
}
