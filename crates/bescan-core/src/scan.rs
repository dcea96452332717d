//! Scan orchestrator: plan, dispatch, barrier, reduce.
//!
//! ## Algorithm sketch
//! 1. Observe the source size once and build a [`PartitionPlan`]: a single
//!    segment for [`ScanMode::Sequential`], `workers` record-aligned segments
//!    for [`ScanMode::Parallel`].
//! 2. Sequential: fold the one segment on the calling thread.
//!    Parallel: one scoped thread per non-empty segment, each owning its
//!    handle and accumulator.
//! 3. Join every worker, then merge the partials. `merge` is associative and
//!    commutative, so both modes yield identical `(total, min, max)`.
//!
//! ## Failure
//! The first worker that fails or panics fires an internal [`CancelToken`];
//! siblings stop at their next block boundary. All workers are joined (and their
//! handles dropped) before the original error is returned. `Cancelled`
//! results caused by that internal token never mask the real failure.

use crate::accumulator::Accumulator;
use crate::cancel::CancelToken;
use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::partition::PartitionPlan;
use crate::reader::read_segment;
use crate::source::{FileSource, RecordSource};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, debug_span, info, warn};

/// How the file is traversed.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// One segment, calling thread.
    Sequential,
    /// `workers` segments, one thread each.
    Parallel,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
        })
    }
}

/// Outcome of a successful scan.
#[derive(Clone, Debug, Serialize)]
pub struct ScanReport {
    /// Mode that produced this report.
    pub mode: ScanMode,
    /// Segments in the plan (1 for sequential).
    pub workers: usize,
    /// Source size observed at scan start.
    pub file_size: u64,
    /// Trailing bytes excluded from the aggregate.
    pub trailing_bytes: u64,
    /// Reduced aggregate.
    pub accumulator: Accumulator,
    /// Wall-clock time, observability only.
    #[serde(rename = "elapsed_secs", serialize_with = "secs_f64")]
    pub elapsed: Duration,
}

impl ScanReport {
    /// `(total, min, max)`; extrema are `None` for a source with no records.
    #[must_use]
    pub fn triple(&self) -> (u128, Option<u32>, Option<u32>) {
        (
            self.accumulator.total,
            self.accumulator.min(),
            self.accumulator.max(),
        )
    }
}

fn secs_f64<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Configured scan engine.
#[derive(Clone, Debug, Default)]
pub struct Scanner {
    config: ScanConfig,
    cancel: Option<CancelToken>,
}

impl Scanner {
    /// Build a scanner from a validated configuration.
    ///
    /// # Errors
    /// `InvalidArgument` if [`ScanConfig::validate`] fails.
    pub fn new(config: ScanConfig) -> ScanResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cancel: None,
        })
    }

    /// Abort scans when `token` fires.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Partition plan this scanner would use for a source of `file_size` bytes.
    ///
    /// # Errors
    /// `InvalidArgument` if the worker count is zero.
    pub fn plan(&self, file_size: u64, mode: ScanMode) -> ScanResult<PartitionPlan> {
        match mode {
            ScanMode::Sequential => Ok(PartitionPlan::whole(file_size)),
            ScanMode::Parallel => PartitionPlan::new(file_size, self.config.workers),
        }
    }

    /// Scan the data file at `path`.
    ///
    /// # Errors
    /// `NotFound` if `path` does not exist, `Io` if it cannot be inspected,
    /// plus everything [`Self::scan_source`] returns.
    pub fn scan_path(&self, path: &Path, mode: ScanMode) -> ScanResult<ScanReport> {
        self.scan_source(&FileSource::new(path), mode)
    }

    /// Scan any [`RecordSource`].
    ///
    /// # Errors
    /// `Io` from any reader, `Cancelled` if the token fired,
    /// `WorkerPanicked` if a worker thread panicked.
    pub fn scan_source<S>(&self, source: &S, mode: ScanMode) -> ScanResult<ScanReport>
    where
        S: RecordSource + ?Sized,
    {
        let started = Instant::now();
        let file_size = source.size()?;
        let plan = self.plan(file_size, mode)?;

        debug!(
            source = %source.describe(),
            %mode,
            file_size,
            segments = plan.len(),
            "starting scan"
        );

        let accumulator = match mode {
            ScanMode::Sequential => self.run_sequential(source, &plan)?,
            ScanMode::Parallel => self.run_parallel(source, &plan)?,
        };
        let elapsed = started.elapsed();

        info!(
            %mode,
            records = accumulator.count,
            trailing_bytes = plan.trailing_bytes(),
            elapsed_ms = elapsed.as_millis(),
            "scan complete"
        );

        Ok(ScanReport {
            mode,
            workers: plan.len(),
            file_size,
            trailing_bytes: plan.trailing_bytes(),
            accumulator,
            elapsed,
        })
    }

    fn run_sequential<S>(&self, source: &S, plan: &PartitionPlan) -> ScanResult<Accumulator>
    where
        S: RecordSource + ?Sized,
    {
        let mut acc = Accumulator::new();
        for &seg in plan.segments() {
            acc = acc.merge(read_segment(
                source,
                seg,
                self.config.block_size,
                self.cancel.as_ref(),
            )?);
        }
        Ok(acc)
    }

    fn run_parallel<S>(&self, source: &S, plan: &PartitionPlan) -> ScanResult<Accumulator>
    where
        S: RecordSource + ?Sized,
    {
        let block_size = self.config.block_size;
        let abort = self
            .cancel
            .as_ref()
            .map_or_else(CancelToken::new, CancelToken::child);

        let results: Vec<ScanResult<Accumulator>> = thread::scope(|s| {
            let mut handles = Vec::with_capacity(plan.len());
            for (idx, seg) in plan.segments().iter().copied().enumerate() {
                if seg.is_empty() {
                    continue;
                }
                let abort = &abort;
                let spawned = thread::Builder::new()
                    .name(format!("bescan-worker-{idx}"))
                    .spawn_scoped(s, move || {
                        let _span = debug_span!("segment", idx, %seg).entered();
                        let res = panic::catch_unwind(AssertUnwindSafe(|| {
                            read_segment(source, seg, block_size, Some(abort))
                        }))
                        .unwrap_or(Err(ScanError::WorkerPanicked { segment: idx }));
                        match &res {
                            Ok(acc) => debug!(records = acc.count, "segment done"),
                            Err(ScanError::Cancelled) => debug!("segment cancelled"),
                            Err(e) => {
                                warn!(error = %e, "segment failed; cancelling siblings");
                                abort.cancel();
                            }
                        }
                        res
                    });
                if spawned.is_err() {
                    abort.cancel();
                }
                handles.push((idx, spawned));
            }

            // Barrier: every spawned worker is joined before anything is reduced.
            handles
                .into_iter()
                .map(|(idx, spawned)| match spawned {
                    Ok(h) => h
                        .join()
                        .unwrap_or(Err(ScanError::WorkerPanicked { segment: idx })),
                    Err(e) => Err(ScanError::io(format!("spawning worker {idx}"), e)),
                })
                .collect()
        });

        let mut parts = Vec::with_capacity(results.len());
        let mut failure: Option<ScanError> = None;
        for res in results {
            match res {
                Ok(acc) => parts.push(acc),
                Err(e) => {
                    let replace = match &failure {
                        None => true,
                        Some(ScanError::Cancelled) => !matches!(e, ScanError::Cancelled),
                        Some(_) => false,
                    };
                    if replace {
                        failure = Some(e);
                    }
                }
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }
        Ok(Accumulator::reduce(parts))
    }
}

/// Scan `path` with `workers` partitions and default tunables.
///
/// # Errors
/// `InvalidArgument` if `workers < 1`, `NotFound` if the file is missing,
/// `Io` on read failure.
pub fn scan(path: &Path, mode: ScanMode, workers: usize) -> ScanResult<ScanReport> {
    Scanner::new(ScanConfig::with_workers(workers))?.scan_path(path, mode)
}
