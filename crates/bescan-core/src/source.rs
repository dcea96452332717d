//! Where records come from.
//!
//! A [`RecordSource`] hands out independently positioned read handles. Each
//! worker calls [`RecordSource::open_at`] for its own segment, so no cursor is
//! ever shared between threads; the handle is dropped when the worker returns,
//! on success and failure alike.

use crate::error::{ScanError, ScanResult};
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Read-only, concurrently accessible byte source.
pub trait RecordSource: Sync {
    /// Total size in bytes, as observed now.
    ///
    /// # Errors
    /// Returns `NotFound` or `Io` if the size cannot be determined.
    fn size(&self) -> ScanResult<u64>;

    /// Open a fresh handle positioned at `offset`.
    ///
    /// # Errors
    /// Returns `Io` if the handle cannot be opened or positioned.
    fn open_at(&self, offset: u64) -> ScanResult<Box<dyn Read + Send + '_>>;

    /// Human-readable name used in logs and error contexts.
    fn describe(&self) -> String;
}

/// A data file on the local filesystem.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Wrap `path`. Existence is checked by [`RecordSource::size`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The wrapped path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn not_found_or_io(&self, what: &str, e: io::Error) -> ScanError {
        if e.kind() == io::ErrorKind::NotFound {
            ScanError::NotFound {
                path: self.path.clone(),
            }
        } else {
            ScanError::io(format!("{what} {}", self.path.display()), e)
        }
    }
}

impl RecordSource for FileSource {
    fn size(&self) -> ScanResult<u64> {
        let meta = std::fs::metadata(&self.path).map_err(|e| self.not_found_or_io("stat", e))?;
        if !meta.is_file() {
            return Err(ScanError::invalid(format!(
                "{} is not a regular file",
                self.path.display()
            )));
        }
        Ok(meta.len())
    }

    fn open_at(&self, offset: u64) -> ScanResult<Box<dyn Read + Send + '_>> {
        let mut f = File::open(&self.path).map_err(|e| self.not_found_or_io("open", e))?;
        if offset > 0 {
            f.seek(SeekFrom::Start(offset)).map_err(|e| {
                ScanError::io(format!("seek to {offset} in {}", self.path.display()), e)
            })?;
        }
        Ok(Box::new(f))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory source; cheap to clone and share across threads.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    bytes: Arc<[u8]>,
}

impl MemorySource {
    /// Wrap raw bytes in the on-disk record layout.
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Encode `records` big-endian, back to back.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = crate::Record>,
    {
        let bytes: Vec<u8> = records
            .into_iter()
            .flat_map(crate::types::encode_record)
            .collect();
        Self::new(bytes)
    }

    /// Raw contents.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl RecordSource for MemorySource {
    fn size(&self) -> ScanResult<u64> {
        Ok(self.bytes.len() as u64)
    }

    fn open_at(&self, offset: u64) -> ScanResult<Box<dyn Read + Send + '_>> {
        let mut c = Cursor::new(&self.bytes[..]);
        c.set_position(offset);
        Ok(Box::new(c))
    }

    fn describe(&self) -> String {
        format!("<memory: {} bytes>", self.bytes.len())
    }
}
