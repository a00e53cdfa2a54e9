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

//! Outbound peer transport.
//!
//! A probe is an HTTP GET to the peer address; any completed response counts as
//! alive, whatever the status code. A delivery is an HTTP POST of the JSON
//! payload; again only transport-level success is observed.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::RegistryConfig;

/// Transport errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Request did not complete within the configured timeout.
    #[error("timed out")]
    Timeout,
    /// Connection or protocol failure.
    #[error("{0}")]
    Request(String),
    /// HTTP client could not be built.
    #[error("client setup")]
    Client,
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// Outbound capability used by the peer registry.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Liveness probe against `address`.
    async fn probe(&self, address: &str) -> Result<(), TransportError>;
    /// Deliver `message` to `address`.
    async fn deliver(&self, address: &str, message: &Value) -> Result<(), TransportError>;
}

/// `reqwest`-backed HTTP transport.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with a per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|_| TransportError::Client)?;
        Ok(Self { client })
    }

    /// Build from registry settings.
    pub fn from_config(cfg: &RegistryConfig) -> Result<Self, TransportError> {
        Self::new(cfg.request_timeout())
    }
}

#[async_trait]
impl PeerTransport for HttpTransport {
    async fn probe(&self, address: &str) -> Result<(), TransportError> {
        self.client.get(address).send().await?;
        Ok(())
    }

    async fn deliver(&self, address: &str, message: &Value) -> Result<(), TransportError> {
        self.client.post(address).json(message).send().await?;
        Ok(())
    }
}
