//! Record tail: the trailer that confirms a record was written whole.

use crate::error::{JournalError, JournalResult};
use crate::record::header::RecordHeader;
use crate::types::RecordId;

/// Serialized tail size.
/// complement magic (4) + checksum (4) + record id (8) = 16 bytes
pub const TAIL_SIZE: usize = 16;

/// Fixed-size trailer written after the xid payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordTail {
    /// Bitwise complement of the header magic.
    pub complement_magic: u32,
    /// CRC-32 over the serialized header followed by the xid bytes.
    pub checksum: u32,
    /// Must equal the header's record id.
    pub record_id: RecordId,
}

impl RecordTail {
    /// Builds the tail that matches `header` and `xid`.
    #[must_use]
    pub fn for_record(header: &RecordHeader, xid: &[u8]) -> Self {
        Self {
            complement_magic: !header.magic,
            checksum: record_checksum(header, xid),
            record_id: header.record_id,
        }
    }

    /// Serializes the tail.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; TAIL_SIZE] {
        let mut buf = [0u8; TAIL_SIZE];
        buf[0..4].copy_from_slice(&self.complement_magic.to_le_bytes());
        buf[4..8].copy_from_slice(&self.checksum.to_le_bytes());
        buf[8..16].copy_from_slice(&self.record_id.as_u64().to_le_bytes());
        buf
    }

    /// Deserializes a tail.
    #[must_use]
    pub fn from_bytes(buf: &[u8; TAIL_SIZE]) -> Self {
        let mut xmagic = [0u8; 4];
        xmagic.copy_from_slice(&buf[0..4]);
        let mut checksum = [0u8; 4];
        checksum.copy_from_slice(&buf[4..8]);
        let mut rid = [0u8; 8];
        rid.copy_from_slice(&buf[8..16]);
        Self {
            complement_magic: u32::from_le_bytes(xmagic),
            checksum: u32::from_le_bytes(checksum),
            record_id: RecordId::new(u64::from_le_bytes(rid)),
        }
    }

    /// Checks this tail against the header and xid it closes.
    ///
    /// # Errors
    ///
    /// Returns `BadRecordTail` if the complement magic or record id do not
    /// match the header, and `ChecksumMismatch` if the checksum does not
    /// match the record contents.
    pub fn verify(&self, header: &RecordHeader, xid: &[u8]) -> JournalResult<()> {
        if self.complement_magic != !header.magic {
            return Err(JournalError::bad_tail(format!(
                "magic: rid={}: expected=0x{:08x} read=0x{:08x}",
                header.record_id, !header.magic, self.complement_magic
            )));
        }
        if self.record_id != header.record_id {
            return Err(JournalError::bad_tail(format!(
                "rid: expected={} read={}",
                header.record_id, self.record_id
            )));
        }
        let actual = record_checksum(header, xid);
        if self.checksum != actual {
            return Err(JournalError::ChecksumMismatch {
                expected: self.checksum,
                actual,
            });
        }
        Ok(())
    }
}

/// CRC-32 (IEEE) over the serialized header followed by the xid bytes.
#[must_use]
pub fn record_checksum(header: &RecordHeader, xid: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&header.to_bytes());
    hasher.update(xid);
    hasher.finalize()
}
