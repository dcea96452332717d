//! Split a data source into record-aligned segments, one per worker.
//!
//! For `workers = n` and `file_size = s` the chunk size is
//! `c = floor(s / n)` rounded down to a multiple of [`RECORD_WIDTH`].
//! Segment `i < n - 1` covers `[i*c, (i+1)*c)`; the last segment covers
//! `[(n-1)*c, s)` and absorbs every remainder byte, including a trailing
//! partial record.
//!
//! When `s < n * RECORD_WIDTH` the chunk size is zero, so the first `n - 1`
//! segments are empty and the last one spans the whole file.

use crate::error::{ScanError, ScanResult};
use crate::types::{align_down, Segment, RECORD_WIDTH};

/// Ordered, contiguous, non-overlapping cover of `[0, file_size)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionPlan {
    file_size: u64,
    segments: Vec<Segment>,
}

impl PartitionPlan {
    /// Plan `workers` segments over a file of `file_size` bytes.
    ///
    /// # Errors
    /// `InvalidArgument` if `workers == 0`.
    pub fn new(file_size: u64, workers: usize) -> ScanResult<Self> {
        if workers == 0 {
            return Err(ScanError::invalid("worker count must be at least 1"));
        }
        let n = workers as u64;
        let chunk = align_down(file_size / n);

        let mut segments = Vec::with_capacity(workers);
        for i in 0..n {
            let start = i * chunk;
            let end = if i + 1 == n { file_size } else { start + chunk };
            segments.push(Segment::new(start, end));
        }
        Ok(Self {
            file_size,
            segments,
        })
    }

    /// A single segment spanning the whole file.
    #[must_use]
    pub fn whole(file_size: u64) -> Self {
        Self {
            file_size,
            segments: vec![Segment::new(0, file_size)],
        }
    }

    /// Size of the file this plan covers.
    #[inline]
    #[must_use]
    pub const fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Segments in file order.
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the plan has no segments (never true for a constructed plan).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Bytes past the last complete record; ignored by every reader.
    #[inline]
    #[must_use]
    pub const fn trailing_bytes(&self) -> u64 {
        self.file_size % RECORD_WIDTH
    }

    /// Check the cover invariants: first starts at 0, each starts where the
    /// previous ended, last ends at `file_size`, and every boundary except the
    /// final `end` is record-aligned.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let mut cursor = 0u64;
        for seg in &self.segments {
            if seg.start != cursor || seg.end < seg.start || seg.start % RECORD_WIDTH != 0 {
                return false;
            }
            cursor = seg.end;
        }
        let inner_aligned = self.segments.split_last().map_or(true, |(_, rest)| {
            rest.iter().all(|s| s.end % RECORD_WIDTH == 0)
        });
        !self.segments.is_empty() && cursor == self.file_size && inner_aligned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_workers() {
        assert!(PartitionPlan::new(16, 0).is_err());
    }

    #[test]
    fn even_split() {
        let p = PartitionPlan::new(16, 2).unwrap();
        assert_eq!(p.segments(), &[Segment::new(0, 8), Segment::new(8, 16)]);
        assert!(p.is_well_formed());
    }

    #[test]
    fn last_segment_absorbs_remainder() {
        // 7 records + 2 stray bytes over 3 workers: chunk = floor(30/3)=10 -> 8.
        let p = PartitionPlan::new(30, 3).unwrap();
        assert_eq!(
            p.segments(),
            &[Segment::new(0, 8), Segment::new(8, 16), Segment::new(16, 30)]
        );
        assert_eq!(p.trailing_bytes(), 2);
        assert!(p.is_well_formed());
    }

    #[test]
    fn tiny_file_puts_everything_in_last_segment() {
        let p = PartitionPlan::new(6, 4).unwrap();
        assert_eq!(p.len(), 4);
        assert!(p.segments()[..3].iter().all(Segment::is_empty));
        assert_eq!(p.segments()[3], Segment::new(0, 6));
        assert!(p.is_well_formed());
    }

    #[test]
    fn empty_file() {
        let p = PartitionPlan::new(0, 3).unwrap();
        assert!(p.segments().iter().all(Segment::is_empty));
        assert!(p.is_well_formed());
        assert!(PartitionPlan::whole(0).is_well_formed());
    }
}
