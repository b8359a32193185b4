//! Page-driving fixtures and journal file helpers.
//!
//! These drive the codec the way a journal's page cache does: a record is
//! handed page regions of a few dblks at a time, and the dblk counts the
//! codec returns decide where the next call starts.

use linjournal_core::{
    dblks_to_bytes, JournalError, JournalResult, RecordHeader, StorageBackend, TransactionRecord,
};
use linjournal_storage::FileBackend;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Expands `page_dblks` into the `max_dblks` of each call needed to cover a
/// record of `record_dblks` dblks.
///
/// Page sizes are used in order and repeat once exhausted. The final entry
/// may exceed what the record still needs.
///
/// # Panics
///
/// Panics if `page_dblks` is empty or contains a zero.
#[must_use]
pub fn page_plan(record_dblks: u32, page_dblks: &[u32]) -> Vec<u32> {
    assert!(
        !page_dblks.is_empty() && !page_dblks.contains(&0),
        "page sizes must be non-zero"
    );
    let mut plan = Vec::new();
    let mut covered = 0;
    for &max in page_dblks.iter().cycle() {
        if covered >= record_dblks {
            break;
        }
        plan.push(max);
        covered += max;
    }
    plan
}

/// Encodes `record` in one call into a buffer of its aligned size.
///
/// # Errors
///
/// Returns whatever [`TransactionRecord::encode`] returns.
pub fn encode_whole(record: &TransactionRecord<'_>) -> JournalResult<Vec<u8>> {
    let dblks = record.record_dblks();
    let mut image = vec![0u8; dblks_to_bytes(dblks)];
    record.encode(&mut image, 0, dblks)?;
    Ok(image)
}

/// Encodes `record` into separate pages of `page_dblks` dblks each.
///
/// Returns the pages concatenated, trimmed to the dblks written, along
/// with the dblk count of every call.
///
/// # Errors
///
/// Returns whatever [`TransactionRecord::encode`] returns.
pub fn encode_paged(
    record: &TransactionRecord<'_>,
    page_dblks: &[u32],
) -> JournalResult<(Vec<u8>, Vec<u32>)> {
    let mut image = Vec::with_capacity(dblks_to_bytes(record.record_dblks()));
    let mut counts = Vec::new();
    let mut offset = 0;
    for max in page_plan(record.record_dblks(), page_dblks) {
        let mut page = vec![0u8; dblks_to_bytes(max)];
        let written = record.encode(&mut page, offset, max)?;
        image.extend_from_slice(&page[..dblks_to_bytes(written)]);
        counts.push(written);
        offset += written;
    }
    Ok((image, counts))
}

/// Decodes the record at the start of `image`, handing it pages of
/// `page_dblks` dblks each.
///
/// The expected header is peeked from the image, as a journal driver would.
///
/// # Errors
///
/// Returns whatever [`TransactionRecord::decode`] returns, or
/// `InvalidOperation` if the image ends before the record does.
pub fn decode_paged(
    image: &[u8],
    page_dblks: &[u32],
) -> JournalResult<(TransactionRecord<'static>, Vec<u32>)> {
    let expected = RecordHeader::peek(image)?;
    let mut record = TransactionRecord::new();
    let mut counts = Vec::new();
    let mut offset = 0u32;
    for &max in page_dblks.iter().cycle() {
        if record.is_verified() {
            break;
        }
        let src = image.get(dblks_to_bytes(offset)..).unwrap_or_default();
        if src.is_empty() {
            return Err(JournalError::invalid_operation(format!(
                "image ends after {offset} dblks, record incomplete"
            )));
        }
        let read = record.decode(&expected, src, offset, max)?;
        counts.push(read);
        offset += read;
    }
    Ok((record, counts))
}

/// Appends each record's aligned image to `backend`.
///
/// Returns the byte offset at which each record starts.
///
/// # Errors
///
/// Returns encode or storage errors.
pub fn write_records<B: StorageBackend + ?Sized>(
    backend: &mut B,
    records: &[TransactionRecord<'_>],
) -> JournalResult<Vec<u64>> {
    let mut offsets = Vec::with_capacity(records.len());
    for record in records {
        let image = encode_whole(record)?;
        offsets.push(backend.append(&image)?);
    }
    backend.flush()?;
    Ok(offsets)
}

/// A journal file in a temporary directory, removed on drop.
pub struct TestJournal {
    /// The file backend.
    pub backend: FileBackend,
    path: PathBuf,
    _temp_dir: TempDir,
}

impl TestJournal {
    /// Creates an empty journal file.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("jrnl").join("0000.jdat");
        let backend =
            FileBackend::open_with_create_dirs(&path).expect("Failed to create journal file");
        Self {
            backend,
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Returns the journal file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reopens the file, dropping the current handle.
    pub fn reopen(&mut self) {
        self.backend = FileBackend::open(&self.path).expect("Failed to reopen journal file");
    }
}

impl Default for TestJournal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linjournal_core::{InMemoryBackend, RecordId, DBLK_SIZE};

    #[test]
    fn page_plan_covers_record() {
        assert_eq!(page_plan(5, &[2]), vec![2, 2, 2]);
        assert_eq!(page_plan(5, &[1, 3]), vec![1, 3, 1]);
        assert_eq!(page_plan(1, &[4]), vec![4]);
    }

    #[test]
    fn paged_encode_matches_whole() {
        let xid = vec![9u8; 500];
        let record = TransactionRecord::commit(RecordId::new(1), &xid);
        let whole = encode_whole(&record).unwrap();
        let (paged, counts) = encode_paged(&record, &[1, 2]).unwrap();
        assert_eq!(paged, whole);
        // 540 bytes is five dblks; the plan repeats
        assert_eq!(counts, vec![1, 2, 1, 1]);
    }

    #[test]
    fn decode_paged_reports_short_image() {
        let xid = vec![1u8; 300];
        let image = encode_whole(&TransactionRecord::abort(RecordId::new(2), &xid)).unwrap();
        assert!(decode_paged(&image[..DBLK_SIZE], &[1]).is_err());

        let (record, counts) = decode_paged(&image, &[1]).unwrap();
        assert_eq!(record.xid(), Some(&xid[..]));
        assert_eq!(counts, vec![1, 1, 1]);
    }

    #[test]
    fn write_records_returns_start_offsets() {
        let xid = vec![3u8; 200];
        let records = [
            TransactionRecord::commit(RecordId::new(1), b"a"),
            TransactionRecord::abort(RecordId::new(2), &xid),
            TransactionRecord::commit(RecordId::new(3), b"c"),
        ];
        let mut backend = InMemoryBackend::new();
        let offsets = write_records(&mut backend, &records).unwrap();
        assert_eq!(offsets, vec![0, 128, 384]);
        assert_eq!(backend.size().unwrap(), 512);
    }

    #[test]
    fn test_journal_survives_reopen() {
        let mut journal = TestJournal::new();
        write_records(
            &mut journal.backend,
            &[TransactionRecord::commit(RecordId::new(1), b"xid")],
        )
        .unwrap();
        journal.reopen();
        assert_eq!(journal.backend.size().unwrap(), DBLK_SIZE as u64);
        assert!(journal.path().ends_with("0000.jdat"));
    }
}
