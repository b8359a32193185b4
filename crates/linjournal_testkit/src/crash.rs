//! Crash simulation for journal recovery tests.
//!
//! A broker that stops mid-write leaves its last journal record cut short.
//! [`CrashableBackend`] reproduces that by tearing an append after a chosen
//! number of bytes, and [`scan_journal`] walks a journal file front to back
//! the way a restarting broker does, stopping at the first torn record.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use linjournal_testkit::crash::{scan_journal, CrashableBackend};
//!
//! let mut backend = CrashableBackend::new(Box::new(InMemoryBackend::new()));
//! backend.crash_after(300);
//! let _ = write_records(&mut backend, &records);
//! let scan = scan_journal(&backend, CodecConfig::default())?;
//! assert!(scan.torn_at.is_some());
//! ```

use linjournal_core::{
    BackendReader, CodecConfig, IoReader, JournalResult, RecordHeader, RecordId, RecordKind,
    RecoveryStatus, SequentialReader, StorageBackend, StorageError, StorageResult,
    TransactionRecord, HEADER_SIZE, RECORD_PREFIX_SIZE,
};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A storage backend wrapper that can simulate crashes.
pub struct CrashableBackend {
    inner: Box<dyn StorageBackend>,
    crash_after_bytes: AtomicUsize,
    bytes_written: AtomicUsize,
    crashed: AtomicBool,
    fail_on_flush: AtomicBool,
}

impl CrashableBackend {
    /// Creates a new crashable backend wrapping an inner backend.
    pub fn new(inner: Box<dyn StorageBackend>) -> Self {
        Self {
            inner,
            crash_after_bytes: AtomicUsize::new(usize::MAX),
            bytes_written: AtomicUsize::new(0),
            crashed: AtomicBool::new(false),
            fail_on_flush: AtomicBool::new(false),
        }
    }

    /// Tears the append that crosses `bytes` total bytes written; later
    /// appends fail outright.
    pub fn crash_after(&self, bytes: usize) {
        self.crash_after_bytes.store(bytes, Ordering::SeqCst);
    }

    /// Sets whether flush and sync should fail.
    pub fn set_fail_on_flush(&self, fail: bool) {
        self.fail_on_flush.store(fail, Ordering::SeqCst);
    }

    /// Resets the crash state. Bytes already torn stay torn.
    pub fn reset(&self) {
        self.crash_after_bytes.store(usize::MAX, Ordering::SeqCst);
        self.bytes_written.store(0, Ordering::SeqCst);
        self.crashed.store(false, Ordering::SeqCst);
        self.fail_on_flush.store(false, Ordering::SeqCst);
    }

    /// Returns whether the backend has crashed.
    pub fn has_crashed(&self) -> bool {
        self.crashed.load(Ordering::SeqCst)
    }

    /// Returns the wrapped backend.
    pub fn into_inner(self) -> Box<dyn StorageBackend> {
        self.inner
    }

    fn crash(&self, what: &str) -> StorageError {
        self.crashed.store(true, Ordering::SeqCst);
        StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("simulated crash during {what}"),
        ))
    }
}

impl StorageBackend for CrashableBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        self.inner.read_at(offset, len)
    }

    fn append(&mut self, bytes: &[u8]) -> StorageResult<u64> {
        let current = self.bytes_written.fetch_add(bytes.len(), Ordering::SeqCst);
        let threshold = self.crash_after_bytes.load(Ordering::SeqCst);

        if current >= threshold {
            return Err(self.crash("write"));
        }
        if current + bytes.len() > threshold {
            let partial = threshold - current;
            self.inner.append(&bytes[..partial])?;
            return Err(self.crash("partial write"));
        }

        self.inner.append(bytes)
    }

    fn flush(&mut self) -> StorageResult<()> {
        if self.fail_on_flush.load(Ordering::SeqCst) {
            return Err(self.crash("flush"));
        }
        self.inner.flush()
    }

    fn size(&self) -> StorageResult<u64> {
        self.inner.size()
    }

    fn truncate(&mut self, new_size: u64) -> StorageResult<()> {
        self.inner.truncate(new_size)
    }

    fn sync(&mut self) -> StorageResult<()> {
        if self.fail_on_flush.load(Ordering::SeqCst) {
            return Err(self.crash("sync"));
        }
        self.inner.sync()
    }
}

/// A recovery stream over `image[RECORD_PREFIX_SIZE..cut]`.
///
/// This is what a recovering broker sees when the file ends `cut` bytes
/// into the record after the prefix has been consumed.
pub fn truncated_stream(image: &[u8], cut: usize) -> IoReader<Cursor<Vec<u8>>> {
    let end = cut.min(image.len());
    let bytes = image.get(RECORD_PREFIX_SIZE..end).unwrap_or_default();
    IoReader::new(Cursor::new(bytes.to_vec()))
}

/// A record read back during a journal scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredRecord {
    /// Byte offset of the record in the journal file.
    pub offset: u64,
    /// Marker kind.
    pub kind: RecordKind,
    /// Record id.
    pub record_id: RecordId,
    /// Transaction id.
    pub xid: Vec<u8>,
}

/// Outcome of [`scan_journal`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JournalScan {
    /// Complete records, in file order.
    pub records: Vec<RecoveredRecord>,
    /// Offset of a trailing record cut short by a crash, if any.
    pub torn_at: Option<u64>,
    /// Offset just past the last complete record.
    pub end: u64,
}

/// Reads every record of a journal file made only of dtx records.
///
/// A zero magic or the end of the file ends the scan cleanly. A record
/// that runs past the end of the file is reported in
/// [`JournalScan::torn_at`].
///
/// # Errors
///
/// Returns header, tail and checksum failures of any record, and storage
/// errors.
pub fn scan_journal<B: StorageBackend + ?Sized>(
    backend: &B,
    config: CodecConfig,
) -> JournalResult<JournalScan> {
    let mut reader = BackendReader::new(backend, 0);
    let mut scan = JournalScan::default();

    loop {
        let start = reader.position();
        let mut prefix = [0u8; HEADER_SIZE];
        let outcome = reader.read_up_to(&mut prefix[..RECORD_PREFIX_SIZE])?;
        if outcome.count == 0 {
            break;
        }
        if outcome.at_end {
            scan.torn_at = Some(start);
            break;
        }
        let expected = RecordHeader::from_bytes(&prefix);
        if expected.magic == 0 {
            break;
        }

        let mut record = TransactionRecord::with_config(config);
        let mut offset = 0;
        match record.recover_from_stream(&expected, &mut reader, &mut offset)? {
            RecoveryStatus::Complete => {
                if let (Some(kind), Some(xid)) = (record.kind(), record.xid()) {
                    scan.records.push(RecoveredRecord {
                        offset: start,
                        kind,
                        record_id: record.record_id(),
                        xid: xid.to_vec(),
                    });
                }
                scan.end = reader.position();
            }
            RecoveryStatus::Incomplete => {
                scan.torn_at = Some(start);
                break;
            }
        }
    }
    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{encode_whole, write_records};
    use linjournal_core::{InMemoryBackend, DBLK_SIZE};

    fn crashable() -> CrashableBackend {
        CrashableBackend::new(Box::new(InMemoryBackend::new()))
    }

    #[test]
    fn tears_append_at_threshold() {
        let mut backend = crashable();
        backend.crash_after(10);

        assert!(backend.append(&[1u8; 8]).is_ok());
        assert!(backend.append(&[2u8; 8]).is_err());
        assert!(backend.has_crashed());
        assert_eq!(backend.size().unwrap(), 10);
        assert!(backend.append(&[3u8; 1]).is_err());

        backend.reset();
        assert!(!backend.has_crashed());
        assert!(backend.append(&[4u8; 1]).is_ok());
    }

    #[test]
    fn failing_flush_marks_crash() {
        let mut backend = crashable();
        backend.set_fail_on_flush(true);
        assert!(backend.flush().is_err());
        assert!(backend.sync().is_err());
        assert!(backend.has_crashed());
    }

    #[test]
    fn truncated_stream_starts_after_prefix() {
        let image = encode_whole(&TransactionRecord::commit(RecordId::new(1), b"x")).unwrap();
        let mut stream = truncated_stream(&image, 20);
        let mut buf = [0u8; 8];
        let outcome = stream.read_up_to(&mut buf).unwrap();
        assert_eq!(outcome.count, 4);
        assert!(outcome.at_end);
        assert_eq!(&buf[..4], &image[16..20]);

        let mut empty = truncated_stream(&image, 3);
        assert_eq!(empty.read_up_to(&mut buf).unwrap().count, 0);
    }

    #[test]
    fn scan_reads_back_written_records() {
        let records = [
            TransactionRecord::commit(RecordId::new(10), b"first"),
            TransactionRecord::abort(RecordId::new(11), b"second"),
        ];
        let mut backend = InMemoryBackend::new();
        write_records(&mut backend, &records).unwrap();

        let scan = scan_journal(&backend, CodecConfig::default()).unwrap();
        assert_eq!(scan.torn_at, None);
        assert_eq!(scan.end, 2 * DBLK_SIZE as u64);
        assert_eq!(scan.records.len(), 2);
        assert_eq!(scan.records[1].kind, RecordKind::Abort);
        assert_eq!(scan.records[1].xid, b"second");
        assert_eq!(scan.records[1].offset, DBLK_SIZE as u64);
    }

    #[test]
    fn scan_stops_at_torn_record() {
        let xid = vec![0x77u8; 400];
        let records = [
            TransactionRecord::commit(RecordId::new(1), b"kept"),
            TransactionRecord::commit(RecordId::new(2), &xid),
        ];
        let mut backend = crashable();
        backend.crash_after(DBLK_SIZE + 200);
        assert!(write_records(&mut backend, &records).is_err());

        let inner = backend.into_inner();
        assert_eq!(inner.size().unwrap(), (DBLK_SIZE + 200) as u64);

        let scan = scan_journal(&*inner, CodecConfig::default()).unwrap();
        assert_eq!(scan.records.len(), 1);
        assert_eq!(scan.records[0].xid, b"kept");
        assert_eq!(scan.torn_at, Some(DBLK_SIZE as u64));
        assert_eq!(scan.end, DBLK_SIZE as u64);
    }

    #[test]
    fn scan_stops_at_zeroed_space() {
        let mut backend = InMemoryBackend::new();
        write_records(
            &mut backend,
            &[TransactionRecord::abort(RecordId::new(1), b"only")],
        )
        .unwrap();
        backend.append(&[0u8; DBLK_SIZE]).unwrap();

        let scan = scan_journal(&backend, CodecConfig::default()).unwrap();
        assert_eq!(scan.records.len(), 1);
        assert_eq!(scan.torn_at, None);
    }
}
