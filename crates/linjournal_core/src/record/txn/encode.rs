//! Split-aware encode: logical record to page regions.

use super::{TransactionRecord, Xid};
use crate::dblk::{dblks_to_bytes, size_dblks};
use crate::error::{JournalError, JournalResult};
use crate::record::layout::Section;

impl TransactionRecord<'_> {
    /// Writes the next part of the record into `dest`.
    ///
    /// `record_offset_dblks` is the number of dblks of this record already
    /// written by earlier calls (zero on the first call) and `max_dblks`
    /// the capacity of the page region. The first call writes the header,
    /// then as much xid and tail as fit; later calls resume at the exact
    /// byte where the previous call stopped and never repeat the header.
    ///
    /// Returns the number of dblks written. Calls are complete once the
    /// running total reaches [`Self::record_dblks`].
    ///
    /// # Errors
    ///
    /// - `InvalidOperation` if `max_dblks` is zero, no non-empty xid is
    ///   set, the offset is past the end of the record, or `dest` is too
    ///   small for the bytes this call produces
    /// - `BadRecordHeader` on the first call if the header is not a valid
    ///   transaction marker
    pub fn encode(
        &self,
        dest: &mut [u8],
        record_offset_dblks: u32,
        max_dblks: u32,
    ) -> JournalResult<u32> {
        if max_dblks == 0 {
            return Err(JournalError::invalid_operation(
                "encode called with a zero-dblk page region",
            ));
        }
        let xid = match &self.xid {
            Xid::Borrowed(bytes) if !bytes.is_empty() => *bytes,
            _ => {
                return Err(JournalError::invalid_operation(
                    "encode requires a non-empty caller-supplied xid",
                ))
            }
        };

        let layout = self.layout();
        if record_offset_dblks >= layout.record_dblks() {
            return Err(JournalError::invalid_operation(format!(
                "encode offset {record_offset_dblks} dblks is past the end of a {}-dblk record",
                layout.record_dblks()
            )));
        }
        if record_offset_dblks == 0 {
            self.check_header()?;
        }

        let start = dblks_to_bytes(record_offset_dblks);
        let limit = if self.config.fill_byte.is_some() {
            layout.aligned_size()
        } else {
            layout.record_size()
        };
        let end = limit.min(start.saturating_add(dblks_to_bytes(max_dblks)));
        if dest.len() < end - start {
            return Err(JournalError::invalid_operation(format!(
                "page region holds {} bytes, encode needs {}",
                dest.len(),
                end - start
            )));
        }

        let header = self.header.to_bytes();
        let tail = self.tail.to_bytes();
        for span in layout.spans(start, end) {
            let out = &mut dest[span.record_offset - start..][..span.len];
            match span.section {
                Section::Header => out.copy_from_slice(&header[span.at..][..span.len]),
                Section::Xid => out.copy_from_slice(&xid[span.at..][..span.len]),
                Section::Tail => out.copy_from_slice(&tail[span.at..][..span.len]),
                Section::Padding => {
                    if let Some(fill) = self.config.fill_byte {
                        out.fill(fill);
                    }
                }
            }
        }

        let written = size_dblks(end - start);
        tracing::trace!(
            rid = %self.header.record_id,
            offset_dblks = record_offset_dblks,
            max_dblks,
            written_dblks = written,
            complete = end >= layout.record_size(),
            "encoded dtx record"
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use crate::dblk::DBLK_SIZE;
    use crate::record::header::{RecordHeader, DTX_COMMIT_MAGIC, HEADER_SIZE};
    use crate::record::tail::RecordTail;
    use crate::types::RecordId;

    fn expected_bytes(magic: u32, rid: u64, xid: &[u8]) -> Vec<u8> {
        let header = RecordHeader::new(magic, RecordId::new(rid), xid.len());
        let mut out = header.to_bytes().to_vec();
        out.extend_from_slice(xid);
        out.extend_from_slice(&RecordTail::for_record(&header, xid).to_bytes());
        out
    }

    fn encode_in_pages(record: &TransactionRecord<'_>, pages: &[u32]) -> (Vec<u8>, Vec<u32>) {
        let mut out = Vec::new();
        let mut offset = 0;
        let mut counts = Vec::new();
        for &max in pages {
            if offset == record.record_dblks() {
                break;
            }
            let mut page = vec![0u8; dblks_to_bytes(max)];
            let n = record.encode(&mut page, offset, max).unwrap();
            out.extend_from_slice(&page[..dblks_to_bytes(n)]);
            counts.push(n);
            offset += n;
        }
        (out, counts)
    }

    #[test]
    fn unsplit_record_is_header_xid_tail() {
        let record = TransactionRecord::commit(RecordId::new(77), b"global-tx-1");
        let mut page = vec![0u8; DBLK_SIZE];

        assert_eq!(record.encode(&mut page, 0, 1).unwrap(), 1);

        let expected = expected_bytes(DTX_COMMIT_MAGIC, 77, b"global-tx-1");
        assert_eq!(&page[..expected.len()], &expected[..]);
        assert!(page[expected.len()..].iter().all(|&b| b == 0));
    }

    #[test]
    fn filler_covers_rest_of_final_dblk() {
        let mut record = TransactionRecord::commit(RecordId::new(1), b"xid");
        record.set_config(CodecConfig::new().fill_byte(0xff));
        let mut page = vec![0u8; 2 * DBLK_SIZE];

        assert_eq!(record.encode(&mut page, 0, 2).unwrap(), 1);
        let size = record.record_size();
        assert!(page[size..DBLK_SIZE].iter().all(|&b| b == 0xff));
        assert!(page[DBLK_SIZE..].iter().all(|&b| b == 0));
    }

    #[test]
    fn split_output_matches_unsplit_output() {
        let xid: Vec<u8> = (0..700u32).map(|i| (i % 251) as u8).collect();
        let record = TransactionRecord::abort(RecordId::new(9), &xid);
        assert_eq!(record.record_dblks(), 6);

        let (whole, counts) = encode_in_pages(&record, &[6]);
        assert_eq!(counts, vec![6]);

        for plan in [&[1u32, 1, 1, 1, 1, 1][..], &[2, 3, 4], &[5, 1], &[1, 10]] {
            let (split, counts) = encode_in_pages(&record, plan);
            assert_eq!(counts.iter().sum::<u32>(), 6, "plan {plan:?}");
            assert_eq!(split, whole, "plan {plan:?}");
        }
    }

    #[test]
    fn tail_split_across_pages() {
        // tail starts at byte 248, the two-dblk boundary is at 256
        let xid = vec![0x5a; 2 * DBLK_SIZE - HEADER_SIZE - 8];
        let record = TransactionRecord::commit(RecordId::new(5), &xid);
        assert_eq!(record.record_dblks(), 3);

        let mut first = vec![0u8; 2 * DBLK_SIZE];
        assert_eq!(record.encode(&mut first, 0, 2).unwrap(), 2);
        let tail = record.tail().to_bytes();
        assert_eq!(&first[2 * DBLK_SIZE - 8..], &tail[..8]);

        let mut second = vec![0u8; DBLK_SIZE];
        assert_eq!(record.encode(&mut second, 2, 1).unwrap(), 1);
        assert_eq!(&second[..8], &tail[8..]);
    }

    #[test]
    fn continuation_never_rewrites_header() {
        let xid = vec![0x11; 3 * DBLK_SIZE];
        let record = TransactionRecord::commit(RecordId::new(5), &xid);
        let mut page = vec![0u8; DBLK_SIZE];
        record.encode(&mut page, 1, 1).unwrap();
        assert!(page.iter().all(|&b| b == 0x11));
    }

    #[test]
    fn precondition_violations_are_errors() {
        let record = TransactionRecord::commit(RecordId::new(1), b"xid");
        let mut page = vec![0u8; DBLK_SIZE];

        assert!(matches!(
            record.encode(&mut page, 0, 0),
            Err(JournalError::InvalidOperation { .. })
        ));
        assert!(matches!(
            record.encode(&mut page, 1, 1),
            Err(JournalError::InvalidOperation { .. })
        ));
        assert!(matches!(
            record.encode(&mut page[..10], 0, 1),
            Err(JournalError::InvalidOperation { .. })
        ));

        let empty = TransactionRecord::commit(RecordId::new(1), b"");
        assert!(matches!(
            empty.encode(&mut page, 0, 1),
            Err(JournalError::InvalidOperation { .. })
        ));

        let decoded_only = TransactionRecord::new();
        assert!(decoded_only.encode(&mut page, 0, 1).is_err());
    }

    #[test]
    fn foreign_magic_is_rejected() {
        let record = TransactionRecord::with_xid(0x4142_4344, RecordId::new(1), b"xid");
        let mut page = vec![0u8; DBLK_SIZE];
        assert!(matches!(
            record.encode(&mut page, 0, 1),
            Err(JournalError::BadRecordHeader { .. })
        ));
        assert!(page.iter().all(|&b| b == 0));
    }

    #[test]
    fn reset_and_reencode_matches_fresh_record() {
        let fresh = TransactionRecord::abort(RecordId::new(20), b"second");
        let mut reused = TransactionRecord::commit(RecordId::new(19), b"first-xid");
        reused.reset(DTX_COMMIT_MAGIC);
        reused.reset_with(crate::record::header::DTX_ABORT_MAGIC, RecordId::new(20), b"second");

        let mut a = vec![0u8; DBLK_SIZE];
        let mut b = vec![0u8; DBLK_SIZE];
        fresh.encode(&mut a, 0, 1).unwrap();
        reused.encode(&mut b, 0, 1).unwrap();
        assert_eq!(a, b);
    }
}
