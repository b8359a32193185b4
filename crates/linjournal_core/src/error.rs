//! Error types for the journal record codec.

use crate::types::RecordId;
use thiserror::Error;

/// Result type for codec operations.
pub type JournalResult<T> = Result<T, JournalError>;

/// Errors raised while encoding, decoding or recovering a journal record.
///
/// Running out of bytes during recovery is not an error; it is reported as
/// [`crate::RecoveryStatus::Incomplete`].
#[derive(Debug, Error)]
pub enum JournalError {
    /// Storage backend or stream error.
    #[error("storage error: {0}")]
    Storage(#[from] linjournal_storage::StorageError),

    /// The record header has an unrecognized magic or invalid fields.
    #[error("bad record header: {message}")]
    BadRecordHeader {
        /// Description of the header problem.
        message: String,
    },

    /// The header's record id differs from the id the caller expected.
    #[error("record id mismatch: expected {expected}, found {actual}")]
    RecordIdMismatch {
        /// The id the caller expected.
        expected: RecordId,
        /// The id found in the header.
        actual: RecordId,
    },

    /// The tail does not match the header (torn write or misaligned read).
    #[error("bad record tail: {message}")]
    BadRecordTail {
        /// Description of the tail problem.
        message: String,
    },

    /// The tail checksum does not match the header and xid bytes.
    #[error("record checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// Checksum stored in the tail.
        expected: u32,
        /// Checksum computed over the record.
        actual: u32,
    },

    /// The xid buffer could not be allocated.
    #[error("out of memory: cannot allocate {requested} bytes for xid")]
    OutOfMemory {
        /// Requested allocation size in bytes.
        requested: usize,
    },

    /// The codec was driven with arguments that break its preconditions.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },
}

impl JournalError {
    /// Creates a bad record header error.
    pub fn bad_header(message: impl Into<String>) -> Self {
        Self::BadRecordHeader {
            message: message.into(),
        }
    }

    /// Creates a bad record tail error.
    pub fn bad_tail(message: impl Into<String>) -> Self {
        Self::BadRecordTail {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true when the error means the on-disk record is corrupt.
    ///
    /// Storage failures, allocation failures and misuse of the codec are
    /// not corruption.
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::BadRecordHeader { .. }
                | Self::RecordIdMismatch { .. }
                | Self::BadRecordTail { .. }
                | Self::ChecksumMismatch { .. }
        )
    }
}
