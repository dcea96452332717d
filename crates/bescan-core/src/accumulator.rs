//! Running `(sum, min, max)` state and its reduction.
//!
//! An [`Accumulator`] is folded one record at a time by a single reader and
//! combined with [`Accumulator::merge`] once all readers are done. `merge` is
//! associative and commutative with [`Accumulator::default`] as identity, so
//! partials may be reduced in any order and still match a sequential fold.
//!
//! ## Invariants
//! - `count == 0` iff `extrema.is_none()`.
//! - `total` is a `u128`: `u64::MAX / 4` records of `u32::MAX` fit without
//!   overflow.

use crate::types::Record;
use serde::{Deserialize, Serialize};

/// Minimum and maximum record seen by an accumulator.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Extrema {
    /// Smallest record value.
    pub min: Record,
    /// Largest record value.
    pub max: Record,
}

impl Extrema {
    #[inline]
    const fn single(value: Record) -> Self {
        Self { min: value, max: value }
    }

    #[inline]
    fn widen(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Running aggregate over a sequence of records.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Accumulator {
    /// Sum of all folded records.
    pub total: u128,
    /// Number of folded records.
    pub count: u64,
    /// `None` until the first record is folded.
    pub extrema: Option<Extrema>,
}

impl Accumulator {
    /// The empty accumulator (no records seen).
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total: 0,
            count: 0,
            extrema: None,
        }
    }

    /// Fold a single record.
    #[inline]
    pub fn fold(&mut self, value: Record) {
        self.total += u128::from(value);
        self.count += 1;
        self.extrema = Some(match self.extrema {
            Some(e) => e.widen(Extrema::single(value)),
            None => Extrema::single(value),
        });
    }

    /// Combine two partial accumulators.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let extrema = match (self.extrema, other.extrema) {
            (Some(a), Some(b)) => Some(a.widen(b)),
            (a, b) => a.or(b),
        };
        Self {
            total: self.total + other.total,
            count: self.count + other.count,
            extrema,
        }
    }

    /// Reduce any number of partials into one.
    #[must_use]
    pub fn reduce<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        parts.into_iter().fold(Self::new(), Self::merge)
    }

    /// Whether no record has been folded.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Smallest record, or `None` if empty.
    #[inline]
    #[must_use]
    pub fn min(&self) -> Option<Record> {
        self.extrema.map(|e| e.min)
    }

    /// Largest record, or `None` if empty.
    #[inline]
    #[must_use]
    pub fn max(&self) -> Option<Record> {
        self.extrema.map(|e| e.max)
    }
}

impl FromIterator<Record> for Accumulator {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut acc = Self::new();
        for v in iter {
            acc.fold(v);
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_has_no_extrema() {
        let acc = Accumulator::new();
        assert!(acc.is_empty());
        assert_eq!(acc.total, 0);
        assert_eq!(acc.min(), None);
        assert_eq!(acc.max(), None);
        assert_eq!(acc, Accumulator::default());
    }

    #[test]
    fn fold_tracks_sum_min_max() {
        let acc: Accumulator = [3, 1, 4, 2].into_iter().collect();
        assert_eq!(acc.total, 10);
        assert_eq!(acc.count, 4);
        assert_eq!(acc.min(), Some(1));
        assert_eq!(acc.max(), Some(4));
    }

    #[test]
    fn merge_is_associative_and_has_identity() {
        let a: Accumulator = [7, 9].into_iter().collect();
        let b: Accumulator = [u32::MAX].into_iter().collect();
        let c: Accumulator = [0, 5].into_iter().collect();

        let lhs = a.merge(b).merge(c);
        let rhs = a.merge(b.merge(c));
        assert_eq!(lhs, rhs);
        assert_eq!(a.merge(Accumulator::new()), a);
        assert_eq!(Accumulator::new().merge(a), a);
        assert_eq!(c.merge(a), a.merge(c));

        assert_eq!(lhs.total, 7 + 9 + u128::from(u32::MAX) + 5);
        assert_eq!(lhs.min(), Some(0));
        assert_eq!(lhs.max(), Some(u32::MAX));
    }

    #[test]
    fn total_does_not_wrap_at_u64() {
        let mut acc = Accumulator::new();
        acc.total = u128::from(u64::MAX);
        acc.fold(u32::MAX);
        assert_eq!(acc.total, u128::from(u64::MAX) + u128::from(u32::MAX));
    }
}
