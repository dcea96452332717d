//! Segment reader: stream a byte range in blocks and fold every record.
//!
//! Both execution modes go through [`read_segment`]; the sequential path calls
//! it once for the whole file, the parallel path once per segment on its own
//! thread. A reader owns its handle, buffer, and [`Accumulator`], and shares
//! nothing mutable with other readers.
//!
//! Truncation rule: bytes that do not form a complete record at the end of the
//! range (or at EOF) are discarded without error.

use crate::accumulator::Accumulator;
use crate::cancel::CancelToken;
use crate::error::{ScanError, ScanResult};
use crate::source::RecordSource;
use crate::types::{decode_record, Segment, RECORD_WIDTH_USIZE};
use std::io::{self, Read};
use tracing::trace;

/// Fold the records in `segment` of `source`.
///
/// `block_size` must be a positive multiple of the record width (see
/// [`crate::ScanConfig::validate`]).
///
/// # Errors
/// - `Io` if the handle cannot be opened or a read fails.
/// - `Cancelled` if `cancel` fires before the segment is finished.
pub fn read_segment<S>(
    source: &S,
    segment: Segment,
    block_size: usize,
    cancel: Option<&CancelToken>,
) -> ScanResult<Accumulator>
where
    S: RecordSource + ?Sized,
{
    if segment.is_empty() {
        return Ok(Accumulator::new());
    }
    let mut handle = source.open_at(segment.start)?;
    fold_records(&mut handle, segment.len(), block_size, cancel).map_err(|e| match e {
        ScanError::Io { source: err, .. } => ScanError::io(
            format!("reading {segment} of {}", source.describe()),
            err,
        ),
        other => other,
    })
}

/// Fold up to `limit` bytes of records from `reader`.
///
/// Reads in blocks of `block_size` bytes; stops at `limit` or EOF, whichever
/// comes first. A trailing partial record is ignored.
///
/// # Errors
/// - `InvalidArgument` if `block_size` is zero or not record-aligned.
/// - `Io` on a read failure other than `Interrupted`.
/// - `Cancelled` if `cancel` fires between blocks.
pub fn fold_records<R>(
    reader: &mut R,
    limit: u64,
    block_size: usize,
    cancel: Option<&CancelToken>,
) -> ScanResult<Accumulator>
where
    R: Read + ?Sized,
{
    if block_size == 0 || block_size % RECORD_WIDTH_USIZE != 0 {
        return Err(ScanError::invalid(format!(
            "block size {block_size} must be a positive multiple of {RECORD_WIDTH_USIZE}"
        )));
    }

    let mut acc = Accumulator::new();
    let mut buf = vec![0u8; block_size];
    let mut remaining = limit;

    while remaining > 0 {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(ScanError::Cancelled);
        }

        let want = usize::try_from(remaining).map_or(block_size, |r| r.min(block_size));
        let got = fill(reader, &mut buf[..want]).map_err(|e| ScanError::io("reading block", e))?;

        let block = &buf[..got];
        for chunk in block.chunks_exact(RECORD_WIDTH_USIZE) {
            let mut rec = [0u8; RECORD_WIDTH_USIZE];
            rec.copy_from_slice(chunk);
            acc.fold(decode_record(rec));
        }

        remaining -= got as u64;
        if got < want {
            trace!(short_by = want - got, "reader hit EOF before end of range");
            break;
        }
    }

    Ok(acc)
}

/// Read until `buf` is full or EOF. Returns the number of bytes read.
fn fill<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
