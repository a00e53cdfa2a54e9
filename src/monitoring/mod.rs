#![forbid(unsafe_code)]

//! Metrics and logging setup.

pub mod logging;
pub mod metrics;
