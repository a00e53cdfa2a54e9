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

#![allow(dead_code)]

use async_trait::async_trait;
use peerpool::core::types::Transaction;
use peerpool::networking::transport::{PeerTransport, TransportError};
use serde_json::{Number, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Script {
    probes: VecDeque<Result<(), TransportError>>,
    deliveries: VecDeque<Result<(), TransportError>>,
    probed: Vec<String>,
    delivered: Vec<(String, Value)>,
}

/// Scripted transport: queued outcomes are consumed in call order, an empty
/// queue means success. Clones share the same script.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Script>>,
}

impl MockTransport {
    pub fn push_probe(&self, res: Result<(), TransportError>) {
        self.inner.lock().unwrap().probes.push_back(res);
    }

    pub fn push_delivery(&self, res: Result<(), TransportError>) {
        self.inner.lock().unwrap().deliveries.push_back(res);
    }

    pub fn probed(&self) -> Vec<String> {
        self.inner.lock().unwrap().probed.clone()
    }

    pub fn delivered(&self) -> Vec<(String, Value)> {
        self.inner.lock().unwrap().delivered.clone()
    }
}

#[async_trait]
impl PeerTransport for MockTransport {
    async fn probe(&self, address: &str) -> Result<(), TransportError> {
        let mut s = self.inner.lock().unwrap();
        s.probed.push(address.to_string());
        s.probes.pop_front().unwrap_or(Ok(()))
    }

    async fn deliver(&self, address: &str, message: &Value) -> Result<(), TransportError> {
        let mut s = self.inner.lock().unwrap();
        s.delivered.push((address.to_string(), message.clone()));
        s.deliveries.pop_front().unwrap_or(Ok(()))
    }
}

pub fn refused() -> TransportError {
    TransportError::Request("connection refused".to_string())
}

/// The reference transaction used across tests.
pub fn sample_tx() -> Transaction {
    Transaction::new_signed(
        "0xabc",
        "0xdef",
        Number::from(100u64),
        Number::from(1234567890u64),
        "0x123",
    )
    .expect("sample tx")
}
