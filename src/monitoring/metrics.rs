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

//! Prometheus metrics for the peer registry and transaction pool.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Metrics errors.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Metric creation, registration or encoding failed.
    #[error("prometheus")]
    Prom,
}

/// Metrics container.
#[derive(Clone)]
pub struct Metrics {
    /// Registry.
    pub registry: Registry,

    /// Known peers gauge.
    pub peers_known: IntGauge,
    /// Connected peers gauge.
    pub peers_connected: IntGauge,
    /// Failed liveness probes.
    pub probe_failed_total: IntCounter,
    /// Delivered messages.
    pub messages_sent_total: IntCounter,
    /// Failed message deliveries.
    pub messages_failed_total: IntCounter,

    /// Pending transactions gauge.
    pub tx_pending: IntGauge,
    /// Admitted transactions.
    pub tx_admitted_total: IntCounter,
    /// Rejected submissions (any reason).
    pub tx_rejected_total: IntCounter,
    /// Transactions moved to processed.
    pub tx_processed_total: IntCounter,
}

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<IntGauge, MetricsError> {
    let g = IntGauge::new(name, help).map_err(|_| MetricsError::Prom)?;
    registry
        .register(Box::new(g.clone()))
        .map_err(|_| MetricsError::Prom)?;
    Ok(g)
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, MetricsError> {
    let c = IntCounter::new(name, help).map_err(|_| MetricsError::Prom)?;
    registry
        .register(Box::new(c.clone()))
        .map_err(|_| MetricsError::Prom)?;
    Ok(c)
}

impl Metrics {
    /// Create and register metrics.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let peers_known = gauge(&registry, "peerpool_peers_known", "Registered peers")?;
        let peers_connected = gauge(&registry, "peerpool_peers_connected", "Connected peers")?;
        let probe_failed_total = counter(
            &registry,
            "peerpool_probe_failed_total",
            "Failed liveness probes",
        )?;
        let messages_sent_total =
            counter(&registry, "peerpool_messages_sent_total", "Delivered messages")?;
        let messages_failed_total = counter(
            &registry,
            "peerpool_messages_failed_total",
            "Failed message deliveries",
        )?;

        let tx_pending = gauge(&registry, "peerpool_tx_pending", "Pending transactions")?;
        let tx_admitted_total =
            counter(&registry, "peerpool_tx_admitted_total", "Admitted transactions")?;
        let tx_rejected_total = counter(
            &registry,
            "peerpool_tx_rejected_total",
            "Rejected transaction submissions",
        )?;
        let tx_processed_total = counter(
            &registry,
            "peerpool_tx_processed_total",
            "Transactions marked processed",
        )?;

        Ok(Self {
            registry,
            peers_known,
            peers_connected,
            probe_failed_total,
            messages_sent_total,
            messages_failed_total,
            tx_pending,
            tx_admitted_total,
            tx_rejected_total,
            tx_processed_total,
        })
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, MetricsError> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buf)
            .map_err(|_| MetricsError::Prom)?;
        String::from_utf8(buf).map_err(|_| MetricsError::Prom)
    }
}
