//! Canonical record and segment types shared across the workspace.
//!
//! These are re-exported at the crate root so callers can write
//! `bescan_core::Segment`, `bescan_core::RECORD_WIDTH`, etc.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One record: a big-endian `u32` on disk.
pub type Record = u32;

/// On-disk width of a [`Record`] in bytes.
pub const RECORD_WIDTH: u64 = 4;

/// [`RECORD_WIDTH`] as `usize`, for slicing.
pub const RECORD_WIDTH_USIZE: usize = 4;

/// Decode one record from its on-disk bytes.
#[inline]
#[must_use]
pub const fn decode_record(bytes: [u8; RECORD_WIDTH_USIZE]) -> Record {
    Record::from_be_bytes(bytes)
}

/// Encode one record to its on-disk bytes.
#[inline]
#[must_use]
pub const fn encode_record(value: Record) -> [u8; RECORD_WIDTH_USIZE] {
    value.to_be_bytes()
}

/// Round `n` down to a multiple of [`RECORD_WIDTH`].
#[inline]
#[must_use]
pub const fn align_down(n: u64) -> u64 {
    n & !(RECORD_WIDTH - 1)
}

/// Half-open byte range `[start, end)` of the data source.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Segment {
    /// Inclusive start offset (always record-aligned).
    pub start: u64,
    /// Exclusive end offset.
    pub end: u64,
}

impl Segment {
    /// Create a segment `[start, end)` (no validation).
    #[inline]
    #[must_use]
    pub const fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Length in bytes (0 if inverted).
    #[inline]
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Whether the segment covers no bytes.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of complete records inside the segment.
    #[inline]
    #[must_use]
    pub const fn record_count(&self) -> u64 {
        self.len() / RECORD_WIDTH
    }

    /// Bytes at the tail that do not form a complete record.
    #[inline]
    #[must_use]
    pub const fn trailing_bytes(&self) -> u64 {
        self.len() % RECORD_WIDTH
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
