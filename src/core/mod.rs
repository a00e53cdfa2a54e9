#![forbid(unsafe_code)]

//! Transaction record, canonical digest and intake pool.

pub mod txpool;
pub mod types;
