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
#![warn(missing_docs)]

//! Transaction record and canonical digest.
//!
//! ## Canonical bytes
//! The digest input is compact JSON with a fixed key order and no whitespace:
//!
//! ```text
//! {"sender":<str>,"receiver":<str>,"amount":<num>,"timestamp":<num>,"signature":<str>}
//! ```
//!
//! Numbers keep the literal text they were submitted with (`1e2` stays `1e2`,
//! 30-digit integers are not rounded).
//!
//! `hash = lowercase_hex(SHA-256(canonical bytes))`. Producers must encode the
//! same way; [`canonical_hash`] is the reference implementation.

use ring::digest;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use thiserror::Error;

/// Canonical encoding error.
#[derive(Debug, Error)]
pub enum CodecError {
    /// JSON serialization failed.
    #[error("serialization")]
    Serialize,
}

/// A staged transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender address (opaque).
    pub sender: String,
    /// Receiver address (opaque).
    pub receiver: String,
    /// Amount, carried as given.
    pub amount: Number,
    /// Producer timestamp, carried as given.
    pub timestamp: Number,
    /// Signature (opaque, not verified here).
    pub signature: String,
    /// Lowercase hex SHA-256 over the canonical bytes.
    pub hash: String,
}

/// Pool status of an admitted transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    /// Admitted, awaiting processing.
    Pending,
    /// Marked processed; still retrievable by hash.
    Processed,
}

// Field order here *is* the canonical key order.
#[derive(Serialize)]
struct CanonicalFields<'a> {
    sender: &'a str,
    receiver: &'a str,
    amount: &'a Number,
    timestamp: &'a Number,
    signature: &'a str,
}

/// Canonical bytes over every field except `hash`.
pub fn canonical_bytes(
    sender: &str,
    receiver: &str,
    amount: &Number,
    timestamp: &Number,
    signature: &str,
) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(&CanonicalFields {
        sender,
        receiver,
        amount,
        timestamp,
        signature,
    })
    .map_err(|_| CodecError::Serialize)
}

/// Lowercase hex SHA-256 of the canonical bytes.
pub fn canonical_hash(
    sender: &str,
    receiver: &str,
    amount: &Number,
    timestamp: &Number,
    signature: &str,
) -> Result<String, CodecError> {
    let bytes = canonical_bytes(sender, receiver, amount, timestamp, signature)?;
    let d = digest::digest(&digest::SHA256, &bytes);
    Ok(hex::encode(d.as_ref()))
}

impl Transaction {
    /// Build a transaction and fill in its canonical hash.
    pub fn new_signed(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: Number,
        timestamp: Number,
        signature: impl Into<String>,
    ) -> Result<Self, CodecError> {
        let sender = sender.into();
        let receiver = receiver.into();
        let signature = signature.into();
        let hash = canonical_hash(&sender, &receiver, &amount, &timestamp, &signature)?;
        Ok(Self {
            sender,
            receiver,
            amount,
            timestamp,
            signature,
            hash,
        })
    }

    /// Recompute the digest over the non-hash fields.
    pub fn compute_hash(&self) -> Result<String, CodecError> {
        canonical_hash(
            &self.sender,
            &self.receiver,
            &self.amount,
            &self.timestamp,
            &self.signature,
        )
    }

    /// True if the declared hash matches the recomputed one (case-insensitive).
    pub fn hash_matches(&self) -> bool {
        match self.compute_hash() {
            Ok(h) => h.eq_ignore_ascii_case(&self.hash),
            Err(_) => false,
        }
    }

    /// Wire form (JSON bytes including `hash`).
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(self).map_err(|_| CodecError::Serialize)
    }
}
