//! Error taxonomy for scans.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the core crate.
pub type ScanResult<T> = Result<T, ScanError>;

/// Failures a scan can report. None of them are retried.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The data file does not exist.
    #[error("data file not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Malformed configuration; no work was performed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Open, seek, or read failure.
    #[error("i/o error while {context}: {source}")]
    Io {
        /// What the scan was doing when the error occurred.
        context: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The cancellation token fired before the scan completed.
    #[error("scan cancelled")]
    Cancelled,

    /// A worker thread panicked while reading its segment.
    #[error("worker for segment {segment} panicked")]
    WorkerPanicked {
        /// Index of the segment in the partition plan.
        segment: usize,
    },
}

/// Coarse classification of a [`ScanError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`ScanError::NotFound`].
    NotFound,
    /// See [`ScanError::InvalidArgument`].
    InvalidArgument,
    /// See [`ScanError::Io`] and [`ScanError::WorkerPanicked`].
    Io,
    /// See [`ScanError::Cancelled`].
    Cancelled,
}

impl ScanError {
    /// Wrap an [`io::Error`] with a short description of the failed step.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Shorthand for [`ScanError::InvalidArgument`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Io { .. } | Self::WorkerPanicked { .. } => ErrorKind::Io,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_messages() {
        let e = ScanError::NotFound {
            path: PathBuf::from("data.bin"),
        };
        assert_eq!(e.kind(), ErrorKind::NotFound);
        assert_eq!(e.to_string(), "data file not found: data.bin");

        let e = ScanError::io("reading [0, 4)", io::Error::other("boom"));
        assert_eq!(e.kind(), ErrorKind::Io);
        assert!(e.to_string().contains("reading [0, 4)"));

        assert_eq!(ScanError::invalid("workers").kind(), ErrorKind::InvalidArgument);
        assert_eq!(ScanError::WorkerPanicked { segment: 2 }.kind(), ErrorKind::Io);
    }
}
