//! Record header and transaction-marker kinds.

use crate::error::{JournalError, JournalResult};
use crate::types::RecordId;

/// Magic of a transaction commit marker (ASCII "QLSc", little-endian).
pub const DTX_COMMIT_MAGIC: u32 = 0x6353_4c51;

/// Magic of a transaction abort marker (ASCII "QLSa", little-endian).
pub const DTX_ABORT_MAGIC: u32 = 0x6153_4c51;

/// Current journal format version.
pub const JOURNAL_VERSION: u8 = 2;

/// Serialized header size.
/// magic (4) + version (1) + reserved (3) + record id (8) + xid length (8) = 24 bytes
pub const HEADER_SIZE: usize = 24;

/// Size of the record-kind-independent header prefix (magic, version,
/// reserved, record id). The journal driver consumes these bytes before it
/// hands a recovery stream to the codec.
pub const RECORD_PREFIX_SIZE: usize = 16;

const XID_LENGTH_OFFSET: usize = RECORD_PREFIX_SIZE;

/// Kind of transaction marker carried by a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Transaction commit marker.
    Commit,
    /// Transaction abort marker.
    Abort,
}

impl RecordKind {
    /// Maps a header magic to a kind.
    #[must_use]
    pub const fn from_magic(magic: u32) -> Option<Self> {
        match magic {
            DTX_COMMIT_MAGIC => Some(Self::Commit),
            DTX_ABORT_MAGIC => Some(Self::Abort),
            _ => None,
        }
    }

    /// Returns the header magic for this kind.
    #[must_use]
    pub const fn magic(self) -> u32 {
        match self {
            Self::Commit => DTX_COMMIT_MAGIC,
            Self::Abort => DTX_ABORT_MAGIC,
        }
    }

    /// Short label used in diagnostic summaries.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Commit => "dtxc_rec",
            Self::Abort => "dtxa_rec",
        }
    }
}

/// Fixed-size descriptor at the start of every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Record kind discriminator.
    pub magic: u32,
    /// Journal format version.
    pub version: u8,
    /// Journal-assigned record id.
    pub record_id: RecordId,
    /// Length of the xid payload in bytes.
    pub xid_length: usize,
}

impl RecordHeader {
    /// Creates a header for the current journal version.
    #[must_use]
    pub const fn new(magic: u32, record_id: RecordId, xid_length: usize) -> Self {
        Self {
            magic,
            version: JOURNAL_VERSION,
            record_id,
            xid_length,
        }
    }

    /// Returns the marker kind, if the magic names one.
    #[must_use]
    pub const fn kind(&self) -> Option<RecordKind> {
        RecordKind::from_magic(self.magic)
    }

    /// Serializes the header.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.magic.to_le_bytes());
        buf[4] = self.version;
        buf[8..16].copy_from_slice(&self.record_id.as_u64().to_le_bytes());
        buf[16..24].copy_from_slice(&(self.xid_length as u64).to_le_bytes());
        buf
    }

    /// Deserializes a header. The reserved bytes are ignored.
    #[must_use]
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Self {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&buf[0..4]);
        let mut rid = [0u8; 8];
        rid.copy_from_slice(&buf[8..16]);
        Self {
            magic: u32::from_le_bytes(magic),
            version: buf[4],
            record_id: RecordId::new(u64::from_le_bytes(rid)),
            xid_length: xid_length_from(buf),
        }
    }

    /// Parses the header at the start of a page region.
    ///
    /// Journal drivers use this to build the expected header they pass to
    /// [`crate::TransactionRecord::decode`]. No validation is performed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if `src` is shorter than a header.
    pub fn peek(src: &[u8]) -> JournalResult<Self> {
        let buf: &[u8; HEADER_SIZE] = src
            .get(..HEADER_SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| {
                JournalError::invalid_operation(format!(
                    "page region of {} bytes cannot hold a {HEADER_SIZE}-byte header",
                    src.len()
                ))
            })?;
        Ok(Self::from_bytes(buf))
    }

    /// Checks the generic header fields and that the magic names a
    /// transaction marker.
    ///
    /// # Errors
    ///
    /// Returns `BadRecordHeader` for a zero magic, a foreign version or a
    /// magic that is neither commit nor abort.
    pub fn validate(&self) -> JournalResult<()> {
        if self.magic == 0 {
            return Err(JournalError::bad_header(format!(
                "rid={}: magic is zero",
                self.record_id
            )));
        }
        if self.version != JOURNAL_VERSION {
            return Err(JournalError::bad_header(format!(
                "rid={}: version expected={JOURNAL_VERSION} read={}",
                self.record_id, self.version
            )));
        }
        if self.kind().is_none() {
            return Err(JournalError::bad_header(format!(
                "dtx magic: rid={}: expected=(0x{DTX_ABORT_MAGIC:08x} or 0x{DTX_COMMIT_MAGIC:08x}) read=0x{:08x}",
                self.record_id, self.magic
            )));
        }
        Ok(())
    }

    /// Checks that the header carries the `expected` record id.
    ///
    /// # Errors
    ///
    /// Returns `RecordIdMismatch` if the ids differ.
    pub fn check_record_id(&self, expected: RecordId) -> JournalResult<()> {
        if self.record_id != expected {
            return Err(JournalError::RecordIdMismatch {
                expected,
                actual: self.record_id,
            });
        }
        Ok(())
    }
}

/// Reads the xid length field of a serialized header.
///
/// Lengths that do not fit in `usize` saturate, so size limits reject them.
pub(crate) fn xid_length_from(buf: &[u8; HEADER_SIZE]) -> usize {
    let mut len = [0u8; 8];
    len.copy_from_slice(&buf[XID_LENGTH_OFFSET..XID_LENGTH_OFFSET + 8]);
    usize::try_from(u64::from_le_bytes(len)).unwrap_or(usize::MAX)
}
