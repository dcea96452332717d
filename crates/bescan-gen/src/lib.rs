//! Data-source generator for `bescan`.
//!
//! Writes flat files of random big-endian `u32` records, the input format
//! consumed by `bescan-core`. Callers use the stable path
//! `bescan_gen::generator::generate_file`.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Uniform random record generator.
pub mod generator;
