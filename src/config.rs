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

//! Node configuration (TOML).
//!
//! ```text
//! [registry]
//! request_timeout_ms = 10000
//! max_peers = 0            # 0 => unbounded
//!
//! [pool]
//! max_pending = 0          # 0 => unbounded
//!
//! [logging]
//! level = "info"
//! json = false
//! ```
//!
//! Every field is optional; an empty document yields [`NodeConfig::default`].

use crate::monitoring::logging::parse_level;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use thiserror::Error;

/// Default timeout for a single probe or delivery.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Config errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Cannot read config file.
    #[error("read config")]
    Read,
    /// Cannot parse TOML.
    #[error("parse config: {0}")]
    Parse(String),
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Config root.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Peer registry settings.
    pub registry: RegistryConfig,
    /// Transaction pool settings.
    pub pool: PoolConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Peer registry settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Per-request timeout for probes and deliveries, in ms.
    pub request_timeout_ms: u64,
    /// Max registered peers (0 => unbounded).
    pub max_peers: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_peers: 0,
        }
    }
}

impl RegistryConfig {
    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Transaction pool settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Max pending transactions (0 => unbounded).
    pub max_pending: usize,
}

/// Logging settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Max level: trace, debug, info, warn, error or off.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl NodeConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: NodeConfig = toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|_| ConfigError::Read)?;
        Self::from_toml_str(&raw)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("registry.request_timeout_ms must be > 0"));
        }
        if parse_level(&self.logging.level).is_none() {
            return Err(ConfigError::Invalid("logging.level is not a known level"));
        }
        Ok(())
    }
}
