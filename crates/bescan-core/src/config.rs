//! Scan configuration.
//!
//! Loaded from TOML (every field optional) and validated before any I/O:
//!
//! ```toml
//! workers = 4
//! block_size = 65536
//! record_width = 4
//! ```

use crate::error::{ScanError, ScanResult};
use crate::types::RECORD_WIDTH;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of concurrent partitions.
pub const DEFAULT_WORKERS: usize = 4;

/// Default read block size (64 KiB).
pub const DEFAULT_BLOCK_SIZE: usize = 64 << 10;

/// Tunables for a scan.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Number of segments (and worker threads) in parallel mode.
    pub workers: usize,
    /// Bytes requested per read; a positive multiple of the record width.
    pub block_size: usize,
    /// On-disk record width. Only `4` is supported.
    pub record_width: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            block_size: DEFAULT_BLOCK_SIZE,
            record_width: RECORD_WIDTH,
        }
    }
}

impl ScanConfig {
    /// Default configuration with `workers` overridden.
    #[must_use]
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }

    /// Parse a TOML document. Missing fields take their defaults.
    ///
    /// # Errors
    /// `InvalidArgument` on malformed TOML, unknown keys, or values that fail
    /// [`Self::validate`].
    pub fn from_toml_str(src: &str) -> ScanResult<Self> {
        let cfg: Self =
            toml::from_str(src).map_err(|e| ScanError::invalid(format!("scan config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a TOML config file.
    ///
    /// # Errors
    /// `NotFound` if the file is missing, `Io` if it cannot be read, and the
    /// errors of [`Self::from_toml_str`].
    pub fn from_toml_file(path: &Path) -> ScanResult<Self> {
        let src = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScanError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ScanError::io(format!("reading config {}", path.display()), e)
            }
        })?;
        Self::from_toml_str(&src)
    }

    /// Check the configuration without touching the data source.
    ///
    /// # Errors
    /// `InvalidArgument` if `workers < 1`, `block_size` is zero or not a
    /// multiple of the record width, or `record_width != 4`.
    pub fn validate(&self) -> ScanResult<()> {
        if self.record_width != RECORD_WIDTH {
            return Err(ScanError::invalid(format!(
                "unsupported record width {} (only {RECORD_WIDTH} is supported)",
                self.record_width
            )));
        }
        if self.workers < 1 {
            return Err(ScanError::invalid("worker count must be at least 1"));
        }
        if self.block_size == 0 || self.block_size as u64 % RECORD_WIDTH != 0 {
            return Err(ScanError::invalid(format!(
                "block size {} must be a positive multiple of {RECORD_WIDTH}",
                self.block_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn defaults_are_valid() {
        let cfg = ScanConfig::default();
        assert_eq!(cfg.workers, 4);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = ScanConfig::from_toml_str("workers = 8\n").unwrap();
        assert_eq!(cfg.workers, 8);
        assert_eq!(cfg.block_size, DEFAULT_BLOCK_SIZE);
    }

    #[test]
    fn rejects_bad_values() {
        for src in [
            "workers = 0",
            "block_size = 6",
            "block_size = 0",
            "record_width = 8",
            "threads = 2",
            "workers = \"four\"",
        ] {
            let err = ScanConfig::from_toml_str(src).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{src}");
        }
    }
}
