//! Random data-source generator.
//!
//! Produces `records` back-to-back big-endian `u32` values drawn uniformly
//! from `[0, u32::MAX]`. A fixed seed yields a byte-identical file; without
//! one the generator seeds from the OS.

use anyhow::{Context, Result};
use bescan_core::{encode_record, RECORD_WIDTH};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Bytes in one gigabyte (binary, 1024³).
pub const GIB: u64 = 1 << 30;

/// Default output size in whole gigabytes.
pub const DEFAULT_SIZE_GB: u64 = 2;

/// Records written per buffered batch.
const BATCH_RECORDS: usize = 16 << 10;

/// What to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerateSpec {
    /// Number of records to write.
    pub records: u64,
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl GenerateSpec {
    /// `size_gb` whole gigabytes worth of records.
    ///
    /// # Errors
    /// Fails if the size in bytes does not fit in a `u64`.
    pub fn from_gigabytes(size_gb: u64, seed: Option<u64>) -> Result<Self> {
        let bytes = size_gb
            .checked_mul(GIB)
            .with_context(|| format!("{size_gb} GB does not fit in a 64-bit byte count"))?;
        Ok(Self {
            records: bytes / RECORD_WIDTH,
            seed,
        })
    }

    /// Exactly `records` records.
    ///
    /// # Errors
    /// Fails if the size in bytes does not fit in a `u64`.
    pub fn from_records(records: u64, seed: Option<u64>) -> Result<Self> {
        let spec = Self { records, seed };
        spec.byte_len()?;
        Ok(spec)
    }

    /// Size of the resulting file in bytes.
    ///
    /// # Errors
    /// Fails if `records` is too large for a `u64` byte count.
    pub fn byte_len(&self) -> Result<u64> {
        self.records.checked_mul(RECORD_WIDTH).with_context(|| {
            format!(
                "{} records do not fit in a 64-bit byte count",
                self.records
            )
        })
    }
}

/// Write `records` random records to `w`.
///
/// # Errors
/// Propagates write failures from `w`.
pub fn write_records<W, R>(w: &mut W, rng: &mut R, records: u64) -> Result<()>
where
    W: Write,
    R: Rng,
{
    let mut batch = Vec::with_capacity(BATCH_RECORDS * RECORD_WIDTH as usize);
    let mut left = records;
    while left > 0 {
        let n = left.min(BATCH_RECORDS as u64);
        batch.clear();
        for _ in 0..n {
            batch.extend_from_slice(&encode_record(rng.random()));
        }
        w.write_all(&batch).context("write record batch")?;
        left -= n;
    }
    Ok(())
}

/// Generate a data file at `path` and return its size in bytes.
///
/// The parent directory is created if needed; an existing file is replaced.
///
/// # Errors
/// Fails if the requested size overflows a `u64`, or if the file cannot be
/// created, written, or flushed.
pub fn generate_file(path: &Path, spec: GenerateSpec) -> Result<u64> {
    let expected = spec.byte_len()?;
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }

    let mut rng = match spec.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    info!(
        path = %path.display(),
        records = spec.records,
        seed = ?spec.seed,
        "generating data file"
    );
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::with_capacity(1 << 20, f);
    write_records(&mut w, &mut rng, spec.records)?;
    w.flush().context("flush data file")?;
    drop(w);

    let len = fs::metadata(path)
        .with_context(|| format!("stat {}", path.display()))?
        .len();
    debug!(bytes = len, expected, "data file written");
    Ok(len)
}

/// Render a byte count as gigabytes with two decimals.
#[must_use]
pub fn format_gb(bytes: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let gb = bytes as f64 / GIB as f64;
    format!("{gb:.2} GB")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_sizes() {
        let s = GenerateSpec::from_gigabytes(2, None).unwrap();
        assert_eq!(s.records, 2 * GIB / 4);
        assert_eq!(s.byte_len().unwrap(), 2 * GIB);
        let r = GenerateSpec::from_records(3, Some(1)).unwrap();
        assert_eq!(r.byte_len().unwrap(), 12);
    }

    #[test]
    fn oversized_requests_are_rejected() {
        let err = GenerateSpec::from_gigabytes(1 << 34, None).unwrap_err();
        assert!(err.to_string().contains("does not fit"), "{err}");
        assert!(GenerateSpec::from_records(u64::MAX, None).is_err());
        assert!(GenerateSpec::from_records(u64::MAX / RECORD_WIDTH, None).is_ok());

        // Hand-built specs are still checked before any file is touched.
        let dir = std::env::temp_dir().join("bescan-gen-never-created");
        let spec = GenerateSpec {
            records: u64::MAX,
            seed: Some(0),
        };
        assert!(generate_file(&dir.join("data.bin"), spec).is_err());
        assert!(!dir.exists());
    }

    #[test]
    fn write_records_is_seed_deterministic() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        write_records(&mut a, &mut StdRng::seed_from_u64(9), 40_000).unwrap();
        write_records(&mut b, &mut StdRng::seed_from_u64(9), 40_000).unwrap();
        assert_eq!(a.len(), 160_000);
        assert_eq!(a, b);
    }

    #[test]
    fn gb_formatting() {
        assert_eq!(format_gb(2 * GIB), "2.00 GB");
        assert_eq!(format_gb(GIB / 4), "0.25 GB");
        assert_eq!(format_gb(0), "0.00 GB");
    }
}
