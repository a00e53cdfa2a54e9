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

//! Peer registry and connection manager.
//!
//! ## Peer lifecycle
//! ```text
//! unknown --add_peer--> registered(false) --connect_to_peer ok--> registered(true)
//!    ^                          |                                      |
//!    +--------remove_peer-------+--------------------------------------+
//! ```
//! A failed probe never changes `connected`. There is no implicit disconnect.
//!
//! ## Failure reporting
//! Every fallible operation returns [`PeerRegistryError`]. The message of the
//! latest failure is also retained ([`PeerRegistry::last_error`]) until the next
//! failure or an explicit [`PeerRegistry::clear_last_error`]; successes never
//! touch it.
//!
//! The only awaits are the transport calls in [`PeerRegistry::connect_to_peer`],
//! [`PeerRegistry::send_message`] and [`PeerRegistry::broadcast_message`].

use crate::config::RegistryConfig;
use crate::monitoring::metrics::Metrics;
use crate::networking::transport::{HttpTransport, PeerTransport, TransportError};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Peer registry errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PeerRegistryError {
    /// `initialize` has not been called (or the registry was shut down).
    #[error("peer registry not initialized")]
    NotInitialized,
    /// A peer with this id is already registered.
    #[error("peer {0} already exists")]
    DuplicatePeer(String),
    /// No peer with this id.
    #[error("peer {0} not found")]
    PeerNotFound(String),
    /// Peer is registered but has never been probed successfully.
    #[error("peer {0} not connected")]
    PeerNotConnected(String),
    /// Liveness probe failed.
    #[error("failed to connect to peer {id}: {cause}")]
    ConnectionFailed {
        /// Peer id.
        id: String,
        /// Transport failure.
        cause: TransportError,
    },
    /// Message delivery failed.
    #[error("failed to send message to peer {id}: {cause}")]
    SendFailed {
        /// Peer id.
        id: String,
        /// Transport failure.
        cause: TransportError,
    },
    /// `max_peers` reached.
    #[error("peer registry full")]
    RegistryFull,
}

/// A known peer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    /// Caller-chosen unique id.
    pub id: String,
    /// Endpoint URL.
    pub address: String,
    /// Set by a successful liveness probe.
    pub connected: bool,
}

/// Per-peer outcome of a broadcast.
pub type BroadcastReport = Vec<(String, Result<(), PeerRegistryError>)>;

/// Peer registry.
pub struct PeerRegistry<T: PeerTransport> {
    cfg: RegistryConfig,
    transport: T,
    initialized: bool,
    peers: BTreeMap<String, Peer>,
    last_error: String,
    metrics: Option<Arc<Metrics>>,
}

impl PeerRegistry<HttpTransport> {
    /// Registry over the HTTP transport, timeout taken from `cfg`.
    pub fn from_config(cfg: RegistryConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::from_config(&cfg)?;
        Ok(Self::new(cfg, transport))
    }
}

impl<T: PeerTransport> PeerRegistry<T> {
    /// Create an uninitialized registry.
    pub fn new(cfg: RegistryConfig, transport: T) -> Self {
        Self {
            cfg,
            transport,
            initialized: false,
            peers: BTreeMap::new(),
            last_error: String::new(),
            metrics: None,
        }
    }

    /// Attach a metrics sink.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Mark the registry ready and clear the retained error.
    pub fn initialize(&mut self) {
        self.initialized = true;
        self.last_error.clear();
        info!("peer registry initialized");
    }

    /// Drop every peer and return to the uninitialized state.
    pub fn shutdown(&mut self) {
        self.peers.clear();
        self.initialized = false;
        self.sync_gauges();
        info!("peer registry shut down");
    }

    /// Whether `initialize` has been called since the last shutdown.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Basic liveness check.
    pub fn health_check(&self) -> bool {
        self.initialized
    }

    /// Register a new peer with `connected = false`.
    pub fn add_peer(&mut self, id: &str, address: &str) -> Result<(), PeerRegistryError> {
        if !self.initialized {
            return Err(self.fail(PeerRegistryError::NotInitialized));
        }
        if self.peers.contains_key(id) {
            return Err(self.fail(PeerRegistryError::DuplicatePeer(id.to_string())));
        }
        if self.cfg.max_peers != 0 && self.peers.len() >= self.cfg.max_peers {
            return Err(self.fail(PeerRegistryError::RegistryFull));
        }
        self.peers.insert(
            id.to_string(),
            Peer {
                id: id.to_string(),
                address: address.to_string(),
                connected: false,
            },
        );
        self.sync_gauges();
        info!(peer = id, address, "peer added");
        Ok(())
    }

    /// Forget a peer.
    pub fn remove_peer(&mut self, id: &str) -> Result<(), PeerRegistryError> {
        if self.peers.remove(id).is_none() {
            return Err(self.fail(PeerRegistryError::PeerNotFound(id.to_string())));
        }
        self.sync_gauges();
        info!(peer = id, "peer removed");
        Ok(())
    }

    /// Probe the peer's address; on success mark it connected.
    pub async fn connect_to_peer(&mut self, id: &str) -> Result<(), PeerRegistryError> {
        let address = match self.peers.get(id) {
            Some(p) => p.address.clone(),
            None => return Err(self.fail(PeerRegistryError::PeerNotFound(id.to_string()))),
        };

        match self.transport.probe(&address).await {
            Ok(()) => {
                if let Some(p) = self.peers.get_mut(id) {
                    p.connected = true;
                }
                self.sync_gauges();
                info!(peer = id, address = %address, "peer connected");
                Ok(())
            }
            Err(cause) => {
                if let Some(m) = &self.metrics {
                    m.probe_failed_total.inc();
                }
                warn!(peer = id, address = %address, error = %cause, "liveness probe failed");
                Err(self.fail(PeerRegistryError::ConnectionFailed {
                    id: id.to_string(),
                    cause,
                }))
            }
        }
    }

    /// Deliver `message` to a connected peer.
    pub async fn send_message(
        &mut self,
        id: &str,
        message: &Value,
    ) -> Result<(), PeerRegistryError> {
        let (address, connected) = match self.peers.get(id) {
            Some(p) => (p.address.clone(), p.connected),
            None => return Err(self.fail(PeerRegistryError::PeerNotFound(id.to_string()))),
        };
        if !connected {
            return Err(self.fail(PeerRegistryError::PeerNotConnected(id.to_string())));
        }

        let res = self.transport.deliver(&address, message).await;
        self.on_delivery(id, res)
    }

    /// Deliver `message` to every connected peer concurrently.
    ///
    /// Returns one entry per connected peer, in id order. Each failure is
    /// recorded as the last error in turn, so the retained message belongs to
    /// the last failing peer.
    pub async fn broadcast_message(&mut self, message: &Value) -> BroadcastReport {
        let targets: Vec<(String, String)> = self
            .peers
            .values()
            .filter(|p| p.connected)
            .map(|p| (p.id.clone(), p.address.clone()))
            .collect();

        let transport = &self.transport;
        let outcomes = join_all(
            targets
                .iter()
                .map(|(_, addr)| transport.deliver(addr.as_str(), message)),
        )
        .await;

        targets
            .into_iter()
            .zip(outcomes)
            .map(|((id, _), res)| {
                let r = self.on_delivery(&id, res);
                (id, r)
            })
            .collect()
    }

    fn on_delivery(
        &mut self,
        id: &str,
        res: Result<(), TransportError>,
    ) -> Result<(), PeerRegistryError> {
        match res {
            Ok(()) => {
                if let Some(m) = &self.metrics {
                    m.messages_sent_total.inc();
                }
                debug!(peer = id, "message delivered");
                Ok(())
            }
            Err(cause) => {
                if let Some(m) = &self.metrics {
                    m.messages_failed_total.inc();
                }
                warn!(peer = id, error = %cause, "message delivery failed");
                Err(self.fail(PeerRegistryError::SendFailed {
                    id: id.to_string(),
                    cause,
                }))
            }
        }
    }

    /// Snapshot of every registered peer, ordered by id.
    pub fn get_peers(&self) -> Vec<Peer> {
        self.peers.values().cloned().collect()
    }

    /// Look up one peer.
    pub fn get_peer(&self, id: &str) -> Option<Peer> {
        self.peers.get(id).cloned()
    }

    /// Peers with `connected = true`.
    pub fn connected_peers(&self) -> Vec<Peer> {
        self.peers.values().filter(|p| p.connected).cloned().collect()
    }

    /// Number of registered peers.
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Most recent failure message ("" if none or cleared).
    pub fn last_error(&self) -> &str {
        &self.last_error
    }

    /// Forget the retained failure message.
    pub fn clear_last_error(&mut self) {
        self.last_error.clear();
    }

    fn fail(&mut self, e: PeerRegistryError) -> PeerRegistryError {
        debug!(error = %e, "peer registry operation rejected");
        self.last_error = e.to_string();
        e
    }

    fn sync_gauges(&self) {
        if let Some(m) = &self.metrics {
            m.peers_known.set(self.peers.len() as i64);
            m.peers_connected
                .set(self.peers.values().filter(|p| p.connected).count() as i64);
        }
    }
}
