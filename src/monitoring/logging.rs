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

//! Structured logging setup.

use crate::config::LoggingConfig;
use tracing_subscriber::filter::LevelFilter;

/// Parse a level name ("trace".."error", "off").
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    level.trim().parse::<LevelFilter>().ok()
}

/// Install the global subscriber. Returns false if one was already installed.
pub fn init(cfg: &LoggingConfig) -> bool {
    let level = parse_level(&cfg.level).unwrap_or(LevelFilter::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(level);

    if cfg.json {
        builder.json().try_init().is_ok()
    } else {
        builder.compact().try_init().is_ok()
    }
}
