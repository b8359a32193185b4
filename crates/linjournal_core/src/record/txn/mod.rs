//! Transaction-marker record.
//!
//! A [`TransactionRecord`] is driven through one of three call sequences:
//!
//! - [`TransactionRecord::encode`] writes the record into consecutive page
//!   regions, borrowing the caller's xid bytes;
//! - [`TransactionRecord::decode`] rebuilds it from consecutive page
//!   regions into an owned xid buffer;
//! - [`TransactionRecord::recover_from_stream`] rebuilds it from a
//!   sequential journal file stream during restart.
//!
//! Progress between calls is carried by the caller (a dblk offset for
//! paging calls, a byte offset for recovery). Instances can be pooled and
//! reused through [`TransactionRecord::reset`].

mod decode;
mod encode;
mod recover;

pub use recover::RecoveryStatus;

use crate::config::CodecConfig;
use crate::error::{JournalError, JournalResult};
use crate::record::header::{
    RecordHeader, RecordKind, DTX_ABORT_MAGIC, DTX_COMMIT_MAGIC, HEADER_SIZE,
};
use crate::record::layout::RecordLayout;
use crate::record::tail::{RecordTail, TAIL_SIZE};
use crate::types::RecordId;
use std::fmt;

/// The xid payload of a record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Xid<'a> {
    /// No payload (a reset record).
    #[default]
    Empty,
    /// Caller-owned bytes being encoded.
    Borrowed(&'a [u8]),
    /// Buffer owned by the record, filled by decode or recovery.
    Owned(Vec<u8>),
}

impl Xid<'_> {
    /// Returns the payload bytes (possibly partially filled while decoding).
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Empty => &[],
            Self::Borrowed(bytes) => *bytes,
            Self::Owned(buf) => buf.as_slice(),
        }
    }
}

/// A transaction commit or abort marker record.
#[derive(Debug, Clone)]
pub struct TransactionRecord<'a> {
    header: RecordHeader,
    xid: Xid<'a>,
    tail: RecordTail,
    /// Serialized header staged while recovery reads the xid length.
    header_buf: [u8; HEADER_SIZE],
    /// Tail bytes staged until the whole tail has been read.
    tail_buf: [u8; TAIL_SIZE],
    /// Set once a decoded or recovered tail has been checked.
    verified: bool,
    config: CodecConfig,
}

impl Default for TransactionRecord<'_> {
    fn default() -> Self {
        Self::with_config(CodecConfig::default())
    }
}

impl<'a> TransactionRecord<'a> {
    /// Creates an empty record, ready for decode or recovery.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty record using `config`.
    #[must_use]
    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            header: RecordHeader::new(0, RecordId::default(), 0),
            xid: Xid::Empty,
            tail: RecordTail::default(),
            header_buf: [0; HEADER_SIZE],
            tail_buf: [0; TAIL_SIZE],
            verified: false,
            config,
        }
    }

    /// Creates a record to encode, borrowing `xid` for the encode calls.
    #[must_use]
    pub fn with_xid(magic: u32, record_id: RecordId, xid: &'a [u8]) -> Self {
        let mut record = Self::new();
        record.reset_with(magic, record_id, xid);
        record
    }

    /// Creates a commit marker to encode.
    #[must_use]
    pub fn commit(record_id: RecordId, xid: &'a [u8]) -> Self {
        Self::with_xid(DTX_COMMIT_MAGIC, record_id, xid)
    }

    /// Creates an abort marker to encode.
    #[must_use]
    pub fn abort(record_id: RecordId, xid: &'a [u8]) -> Self {
        Self::with_xid(DTX_ABORT_MAGIC, record_id, xid)
    }

    /// Replaces the codec configuration.
    pub fn set_config(&mut self, config: CodecConfig) {
        self.config = config;
    }

    /// Returns the codec configuration.
    #[must_use]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Clears the record for reuse, keeping only `magic`.
    ///
    /// Any owned xid buffer is released.
    pub fn reset(&mut self, magic: u32) {
        self.header = RecordHeader::new(magic, RecordId::default(), 0);
        self.xid = Xid::Empty;
        self.tail = RecordTail {
            complement_magic: !magic,
            checksum: 0,
            record_id: RecordId::default(),
        };
        self.clear_staging();
    }

    /// Repopulates the record for encoding.
    ///
    /// Any owned xid buffer is released.
    pub fn reset_with(&mut self, magic: u32, record_id: RecordId, xid: &'a [u8]) {
        self.header = RecordHeader::new(magic, record_id, xid.len());
        self.tail = RecordTail::for_record(&self.header, xid);
        self.xid = Xid::Borrowed(xid);
        self.clear_staging();
    }

    fn clear_staging(&mut self) {
        self.header_buf = [0; HEADER_SIZE];
        self.tail_buf = [0; TAIL_SIZE];
        self.verified = false;
    }

    /// Returns the header.
    #[must_use]
    pub fn header(&self) -> &RecordHeader {
        &self.header
    }

    /// Returns the tail (meaningful once encoded fields are set or a
    /// decode has completed).
    #[must_use]
    pub fn tail(&self) -> &RecordTail {
        &self.tail
    }

    /// Returns the marker kind, if the header magic names one.
    #[must_use]
    pub fn kind(&self) -> Option<RecordKind> {
        self.header.kind()
    }

    /// Returns the record id.
    #[must_use]
    pub fn record_id(&self) -> RecordId {
        self.header.record_id
    }

    /// Returns the transaction id.
    ///
    /// Borrowed xids are always available; a decoded xid is only returned
    /// once the whole record has been read and its tail verified.
    #[must_use]
    pub fn xid(&self) -> Option<&[u8]> {
        match &self.xid {
            Xid::Borrowed(bytes) => Some(*bytes),
            Xid::Owned(buf) if self.verified => Some(buf.as_slice()),
            _ => None,
        }
    }

    /// Returns the xid length recorded in the header.
    #[must_use]
    pub fn xid_size(&self) -> usize {
        self.header.xid_length
    }

    /// Returns true once a decoded or recovered tail has passed its checks.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// Returns the serialized size: header + xid + tail.
    #[must_use]
    pub fn record_size(&self) -> usize {
        self.layout().record_size()
    }

    /// Returns the number of dblks the record occupies.
    #[must_use]
    pub fn record_dblks(&self) -> u32 {
        self.layout().record_dblks()
    }

    pub(crate) fn layout(&self) -> RecordLayout {
        RecordLayout::new(self.header.xid_length)
    }

    /// Checks the header magic and version.
    ///
    /// # Errors
    ///
    /// Returns `BadRecordHeader` unless the header is a current-version
    /// commit or abort marker.
    pub fn check_header(&self) -> JournalResult<()> {
        self.header.validate()
    }

    /// Checks the header and that it carries `expected` as record id.
    ///
    /// # Errors
    ///
    /// Returns `BadRecordHeader` as [`Self::check_header`], or
    /// `RecordIdMismatch` if the ids differ.
    pub fn check_header_rid(&self, expected: RecordId) -> JournalResult<()> {
        self.check_header()?;
        self.header.check_record_id(expected)
    }

    /// Checks the tail against the header and xid.
    ///
    /// # Errors
    ///
    /// Returns `BadRecordTail` or `ChecksumMismatch`.
    pub fn check_tail(&self) -> JournalResult<()> {
        self.tail.verify(&self.header, self.xid.as_slice())
    }

    /// Parses the staged tail, checks it and marks the record verified.
    fn finish_tail(&mut self) -> JournalResult<()> {
        self.tail = RecordTail::from_bytes(&self.tail_buf);
        self.check_tail().inspect_err(|e| {
            tracing::warn!(rid = %self.header.record_id, error = %e, "dtx record tail check failed");
        })?;
        self.verified = true;
        Ok(())
    }

    /// Validates an xid length read from disk and allocates its buffer.
    fn allocate_xid(&mut self, xid_length: usize) -> JournalResult<()> {
        if xid_length == 0 {
            return Err(JournalError::bad_header(format!(
                "rid={}: xid length is zero",
                self.header.record_id
            )));
        }
        if xid_length > self.config.max_xid_size {
            return Err(JournalError::bad_header(format!(
                "rid={}: xid length {xid_length} exceeds limit {}",
                self.header.record_id, self.config.max_xid_size
            )));
        }

        let mut buf = Vec::new();
        buf.try_reserve_exact(xid_length)
            .map_err(|_| JournalError::OutOfMemory {
                requested: xid_length,
            })?;
        buf.resize(xid_length, 0);

        self.header.xid_length = xid_length;
        self.xid = Xid::Owned(buf);
        Ok(())
    }

    /// Loads the caller's expected header ahead of a decode or recovery.
    fn begin_read(&mut self, expected: &RecordHeader) -> JournalResult<()> {
        self.header = RecordHeader {
            xid_length: 0,
            ..*expected
        };
        self.xid = Xid::Empty;
        self.clear_staging();
        self.check_header()
    }
}

impl fmt::Display for TransactionRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.kind().map_or("dtx_rec", RecordKind::label);
        write!(
            f,
            "{label}: m=0x{:08x} v={} rid={} xid=\"{}\"",
            self.header.magic,
            self.header.version,
            self.header.record_id,
            String::from_utf8_lossy(self.xid.as_slice())
        )
    }
}
