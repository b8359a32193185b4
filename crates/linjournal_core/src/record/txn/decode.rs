//! Split-aware decode: page regions to logical record.

use super::{TransactionRecord, Xid};
use crate::dblk::{dblks_to_bytes, size_dblks};
use crate::error::{JournalError, JournalResult};
use crate::record::header::{xid_length_from, RecordHeader, HEADER_SIZE};
use crate::record::layout::Section;

impl TransactionRecord<'_> {
    /// Reads the next part of the record from `src`.
    ///
    /// On the first call (`record_offset_dblks == 0`) the magic, version
    /// and record id are taken from `expected`, the xid length is read from
    /// the header at the start of `src`, the header is checked and the xid
    /// buffer allocated. Every call then copies the xid and tail bytes that
    /// fall within the `max_dblks` dblks of `src`, resuming exactly where
    /// the previous call stopped. The tail is checked as soon as its last
    /// byte has been read.
    ///
    /// Returns the number of dblks consumed.
    ///
    /// # Errors
    ///
    /// - `BadRecordHeader` for a foreign magic or version, a zero xid
    ///   length, or a length above the configured limit (raised before
    ///   anything is allocated)
    /// - `OutOfMemory` if the xid buffer cannot be allocated
    /// - `BadRecordTail` / `ChecksumMismatch` if the completed tail fails
    /// - `InvalidOperation` if `max_dblks` is zero, `src` is too short, the
    ///   offset is past the end of the record, or a continuation arrives
    ///   without a decode in progress
    pub fn decode(
        &mut self,
        expected: &RecordHeader,
        src: &[u8],
        record_offset_dblks: u32,
        max_dblks: u32,
    ) -> JournalResult<u32> {
        if max_dblks == 0 {
            return Err(JournalError::invalid_operation(
                "decode called with a zero-dblk page region",
            ));
        }

        if record_offset_dblks == 0 {
            let header: &[u8; HEADER_SIZE] = src
                .get(..HEADER_SIZE)
                .and_then(|b| b.try_into().ok())
                .ok_or_else(|| {
                    JournalError::invalid_operation(format!(
                        "page region of {} bytes cannot hold a {HEADER_SIZE}-byte header",
                        src.len()
                    ))
                })?;
            self.begin_read(expected)?;
            self.allocate_xid(xid_length_from(header))?;
        } else if self.verified {
            return Err(JournalError::invalid_operation(
                "decode continuation after the record was completed",
            ));
        }

        let layout = self.layout();
        if record_offset_dblks >= layout.record_dblks() {
            return Err(JournalError::invalid_operation(format!(
                "decode offset {record_offset_dblks} dblks is past the end of a {}-dblk record",
                layout.record_dblks()
            )));
        }

        let start = dblks_to_bytes(record_offset_dblks);
        let end = layout
            .record_size()
            .min(start.saturating_add(dblks_to_bytes(max_dblks)));
        if src.len() < end - start {
            return Err(JournalError::invalid_operation(format!(
                "page region holds {} bytes, decode needs {}",
                src.len(),
                end - start
            )));
        }

        let Xid::Owned(xid) = &mut self.xid else {
            return Err(JournalError::invalid_operation(
                "decode continuation without a decode in progress",
            ));
        };
        for span in layout.spans(start, end) {
            let chunk = &src[span.record_offset - start..][..span.len];
            match span.section {
                Section::Xid => xid[span.at..][..span.len].copy_from_slice(chunk),
                Section::Tail => self.tail_buf[span.at..][..span.len].copy_from_slice(chunk),
                Section::Header | Section::Padding => {}
            }
        }

        let complete = end == layout.record_size();
        if complete {
            self.finish_tail()?;
        }

        let read = size_dblks(end - start);
        tracing::trace!(
            rid = %self.header.record_id,
            offset_dblks = record_offset_dblks,
            max_dblks,
            read_dblks = read,
            complete,
            "decoded dtx record"
        );
        Ok(read)
    }
}
