//! # linjournal core
//!
//! Codec for the transaction-marker records of a linear journal.
//!
//! This crate provides:
//! - Commit and abort marker records ([`TransactionRecord`])
//! - Split-aware encode and decode across dblk-aligned journal pages
//! - Stream-based recovery decode that tolerates a torn final record
//! - Header and tail validation with a CRC-32 over the record contents
//!
//! Journal file management, page caches and transaction bookkeeping live
//! in the broker that drives this codec.
//!
//! ## Example
//!
//! ```rust
//! use linjournal_core::{RecordHeader, RecordId, TransactionRecord, DBLK_SIZE};
//!
//! let record = TransactionRecord::commit(RecordId::new(7), b"xid-0001");
//! let mut page = vec![0u8; DBLK_SIZE];
//! assert_eq!(record.encode(&mut page, 0, 1).unwrap(), 1);
//!
//! let expected = RecordHeader::peek(&page).unwrap();
//! let mut decoded = TransactionRecord::new();
//! decoded.decode(&expected, &page, 0, 1).unwrap();
//! assert_eq!(decoded.xid(), Some(&b"xid-0001"[..]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dblk;
mod error;
mod record;
mod types;

pub use config::{CodecConfig, DEFAULT_FILL_BYTE, DEFAULT_MAX_XID_SIZE};
pub use dblk::{aligned_size, dblks_to_bytes, size_dblks, DBLK_SIZE};
pub use error::{JournalError, JournalResult};
pub use record::{
    record_checksum, Phase, RecordHeader, RecordKind, RecordLayout, RecordTail, RecoveryStatus,
    Section, Span, Spans, TransactionRecord, Xid, DTX_ABORT_MAGIC, DTX_COMMIT_MAGIC, HEADER_SIZE,
    JOURNAL_VERSION, RECORD_PREFIX_SIZE, TAIL_SIZE,
};
pub use types::RecordId;

// Re-export storage types so drivers need only this crate.
pub use linjournal_storage::{
    BackendReader, FileBackend, InMemoryBackend, IoReader, ReadOutcome, SequentialReader,
    StorageBackend, StorageError, StorageResult,
};
