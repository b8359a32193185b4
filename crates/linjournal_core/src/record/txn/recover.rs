//! Stream-based decode used while restarting from journal files.

use super::{TransactionRecord, Xid};
use crate::error::{JournalError, JournalResult};
use crate::record::header::{xid_length_from, RecordHeader, HEADER_SIZE, RECORD_PREFIX_SIZE};
use crate::record::layout::Phase;
use linjournal_storage::SequentialReader;

/// Outcome of a [`TransactionRecord::recover_from_stream`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum RecoveryStatus {
    /// The record, including its padding, has been read and verified.
    Complete,
    /// The stream ended first. Call again with the same record and offset
    /// once more bytes are available, or treat the record as torn.
    Incomplete,
}

impl TransactionRecord<'_> {
    /// Reads the record from a sequential journal stream.
    ///
    /// The stream must be positioned just after the record's 16-byte
    /// prefix (magic, version, reserved and record id), which the journal
    /// driver has already consumed and summarized in `expected`.
    ///
    /// `byte_offset` is the record-relative progress of earlier calls.
    /// Pass zero to start; the first call moves it to the end of the
    /// prefix. Each call advances it by exactly the bytes it read or
    /// skipped, and on `Complete` it equals the record's dblk-aligned
    /// size.
    ///
    /// # Errors
    ///
    /// - `BadRecordHeader` if `expected` is not a transaction marker or the
    ///   xid length read from the stream is zero or above the limit
    /// - `OutOfMemory` if the xid buffer cannot be allocated
    /// - `BadRecordTail` / `ChecksumMismatch` once the tail and padding
    ///   have been read and the tail does not match
    /// - `Storage` if the stream fails for a reason other than ending
    /// - `InvalidOperation` if `byte_offset` does not describe a recovery
    ///   in progress
    pub fn recover_from_stream<R: SequentialReader + ?Sized>(
        &mut self,
        expected: &RecordHeader,
        stream: &mut R,
        byte_offset: &mut usize,
    ) -> JournalResult<RecoveryStatus> {
        match *byte_offset {
            0 => {
                self.begin_read(expected)?;
                self.header_buf = self.header.to_bytes();
                *byte_offset = RECORD_PREFIX_SIZE;
            }
            offset if offset < RECORD_PREFIX_SIZE => {
                return Err(JournalError::invalid_operation(format!(
                    "recovery offset {offset} falls inside the record prefix"
                )));
            }
            offset if offset >= HEADER_SIZE && !matches!(self.xid, Xid::Owned(_)) => {
                return Err(JournalError::invalid_operation(format!(
                    "recovery offset {offset} without a recovery in progress"
                )));
            }
            _ => self.check_header()?,
        }

        loop {
            let layout = self.layout();
            let phase = layout.phase(*byte_offset);
            let outcome = match phase {
                Phase::Header { done } => stream.read_up_to(&mut self.header_buf[done..])?,
                Phase::Xid { done } => match &mut self.xid {
                    Xid::Owned(buf) => stream.read_up_to(&mut buf[done..])?,
                    _ => {
                        return Err(JournalError::invalid_operation(
                            "recovery reached the xid without an allocated buffer",
                        ))
                    }
                },
                Phase::Tail { done } => stream.read_up_to(&mut self.tail_buf[done..])?,
                Phase::Padding { done } => stream.skip(layout.padding() - done)?,
                Phase::Complete => {
                    if !self.verified {
                        self.finish_tail()?;
                    }
                    tracing::trace!(
                        rid = %self.header.record_id,
                        bytes = *byte_offset,
                        "recovered dtx record"
                    );
                    return Ok(RecoveryStatus::Complete);
                }
            };
            *byte_offset += outcome.count;

            if matches!(phase, Phase::Header { .. }) && *byte_offset == HEADER_SIZE {
                let xid_length = xid_length_from(&self.header_buf);
                self.allocate_xid(xid_length)?;
            }

            if outcome.at_end {
                tracing::debug!(
                    rid = %self.header.record_id,
                    byte_offset = *byte_offset,
                    "journal stream ended inside dtx record"
                );
                return Ok(RecoveryStatus::Incomplete);
            }
        }
    }
}
