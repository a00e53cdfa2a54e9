#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Networking: peer registry and HTTP transport.

pub mod peer_registry;
pub mod transport;
