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

//! Peerpool - in-memory peer registry and transaction intake pool.
//!
//! This crate provides:
//! - A peer registry that probes liveness and delivers JSON messages over HTTP
//! - A transaction pool with canonical-digest validation and idempotent admission
//! - TOML configuration, Prometheus metrics and structured logging helpers
//!
//! The two components are independent; an orchestrator reads connected peers
//! from the registry to decide where to broadcast pooled transactions.

/// Node configuration (TOML).
pub mod config;
/// Transaction types and the transaction pool.
pub mod core;
/// Observability (metrics, structured logging helpers).
pub mod monitoring;
/// Peer registry and outbound transport.
pub mod networking;
