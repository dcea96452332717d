//! bescan-core — partitioned scan-and-reduce over big-endian `u32` record files.
//!
//! The data source is a flat file of 4-byte big-endian unsigned integers with
//! no header. This crate computes `(sum, min, max)` over it, either with one
//! sequential reader or with `workers` record-aligned segments read
//! concurrently and reduced afterwards. Both modes agree exactly.
//!
//! ```no_run
//! use bescan_core::{scan, ScanMode};
//! use std::path::Path;
//!
//! let report = scan(Path::new("data.bin"), ScanMode::Parallel, 4)?;
//! let (sum, min, max) = report.triple();
//! println!("sum={sum} min={min:?} max={max:?}");
//! # Ok::<(), bescan_core::ScanError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation
)]

/// `(sum, min, max)` accumulator and its reduction.
pub mod accumulator;
/// Cooperative cancellation tokens.
pub mod cancel;
/// Scan configuration (TOML-loadable).
pub mod config;
/// Error taxonomy.
pub mod error;
/// Record-aligned partition plans.
pub mod partition;
/// Segment reader: block streaming and record folding.
pub mod reader;
/// Scan orchestrator (sequential and parallel).
pub mod scan;
/// Byte sources with independently positioned handles.
pub mod source;
/// Record and segment types.
pub mod types;

pub use accumulator::*;
pub use cancel::*;
pub use config::*;
pub use error::*;
pub use partition::*;
pub use reader::*;
pub use scan::*;
pub use source::*;
pub use types::*;
