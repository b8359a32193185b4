//! Journal record formats.
//!
//! ## Record Format
//!
//! ```text
//! | header (24) | xid (N) | tail (16) | padding to the next dblk boundary |
//!
//! header: | magic (4) | version (1) | reserved (3) | rid (8) | xid length (8) |
//! tail:   | !magic (4) | crc32 (4) | rid (8) |
//! ```
//!
//! All integers are little-endian. The tail checksum covers the serialized
//! header followed by the xid bytes.
//!
//! ## Invariants
//!
//! - A record is split only at dblk boundaries; the bytes are identical
//!   however the record is split across pages
//! - A decoded xid is never exposed before its tail has been verified
//! - A header is rejected before any xid buffer is allocated for it
//! - Padding bytes are never interpreted by readers

mod header;
mod layout;
mod tail;
mod txn;

pub use header::{
    RecordHeader, RecordKind, DTX_ABORT_MAGIC, DTX_COMMIT_MAGIC, HEADER_SIZE, JOURNAL_VERSION,
    RECORD_PREFIX_SIZE,
};
pub use layout::{Phase, RecordLayout, Section, Span, Spans};
pub use tail::{record_checksum, RecordTail, TAIL_SIZE};
pub use txn::{RecoveryStatus, TransactionRecord, Xid};
