//! Byte layout of a serialized record.
//!
//! A record occupies `header ∥ xid ∥ tail`, followed by padding up to the
//! next dblk boundary. Split encode, split decode and recovery all work
//! from a record-relative byte offset; [`RecordLayout`] turns that offset
//! into the section it falls in and how much of the section is already
//! done, so no caller does pointer-style subtraction itself.

use crate::dblk::{dblks_to_bytes, size_dblks};
use crate::record::header::HEADER_SIZE;
use crate::record::tail::TAIL_SIZE;

// Encode writes the whole header on its first call.
const _: () = assert!(HEADER_SIZE <= crate::dblk::DBLK_SIZE);

/// One of the consecutive byte ranges of a serialized record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Fixed header.
    Header,
    /// Transaction id payload.
    Xid,
    /// Fixed tail.
    Tail,
    /// Alignment padding up to the next dblk boundary.
    Padding,
}

/// Where a record byte offset falls, with the bytes of that section
/// already processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Inside the header.
    Header {
        /// Header bytes already processed.
        done: usize,
    },
    /// Inside the xid payload.
    Xid {
        /// Xid bytes already processed.
        done: usize,
    },
    /// Inside the tail.
    Tail {
        /// Tail bytes already processed.
        done: usize,
    },
    /// Inside the alignment padding.
    Padding {
        /// Padding bytes already processed.
        done: usize,
    },
    /// Past the end of the aligned record.
    Complete,
}

/// A contiguous piece of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Section the bytes belong to.
    pub section: Section,
    /// Offset of the first byte within its section.
    pub at: usize,
    /// Number of bytes.
    pub len: usize,
    /// Offset of the first byte within the record.
    pub record_offset: usize,
}

/// Section boundaries of a record with a given xid length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    xid_length: usize,
}

impl RecordLayout {
    /// Layout of a record carrying `xid_length` xid bytes.
    #[must_use]
    pub const fn new(xid_length: usize) -> Self {
        Self { xid_length }
    }

    /// Record offset of the first tail byte.
    #[must_use]
    pub const fn tail_start(&self) -> usize {
        HEADER_SIZE + self.xid_length
    }

    /// Exact serialized size: header + xid + tail.
    #[must_use]
    pub const fn record_size(&self) -> usize {
        self.tail_start() + TAIL_SIZE
    }

    /// Number of dblks the record occupies.
    #[must_use]
    pub fn record_dblks(&self) -> u32 {
        size_dblks(self.record_size())
    }

    /// Record size rounded up to a whole number of dblks.
    #[must_use]
    pub fn aligned_size(&self) -> usize {
        dblks_to_bytes(self.record_dblks())
    }

    /// Padding bytes between the tail and the next dblk boundary.
    #[must_use]
    pub fn padding(&self) -> usize {
        self.aligned_size() - self.record_size()
    }

    /// Locates a record-relative byte offset.
    #[must_use]
    pub fn phase(&self, offset: usize) -> Phase {
        if offset < HEADER_SIZE {
            Phase::Header { done: offset }
        } else if offset < self.tail_start() {
            Phase::Xid {
                done: offset - HEADER_SIZE,
            }
        } else if offset < self.record_size() {
            Phase::Tail {
                done: offset - self.tail_start(),
            }
        } else if offset < self.aligned_size() {
            Phase::Padding {
                done: offset - self.record_size(),
            }
        } else {
            Phase::Complete
        }
    }

    /// Splits the record range `start..end` into per-section spans.
    ///
    /// `end` is clamped to the aligned record size.
    #[must_use]
    pub fn spans(&self, start: usize, end: usize) -> Spans {
        Spans {
            layout: *self,
            pos: start,
            end: end.min(self.aligned_size()),
        }
    }

    fn section_len(&self, section: Section) -> usize {
        match section {
            Section::Header => HEADER_SIZE,
            Section::Xid => self.xid_length,
            Section::Tail => TAIL_SIZE,
            Section::Padding => self.padding(),
        }
    }
}

/// Iterator over the spans of a record range. See [`RecordLayout::spans`].
#[derive(Debug, Clone)]
pub struct Spans {
    layout: RecordLayout,
    pos: usize,
    end: usize,
}

impl Iterator for Spans {
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        if self.pos >= self.end {
            return None;
        }
        let (section, at) = match self.layout.phase(self.pos) {
            Phase::Header { done } => (Section::Header, done),
            Phase::Xid { done } => (Section::Xid, done),
            Phase::Tail { done } => (Section::Tail, done),
            Phase::Padding { done } => (Section::Padding, done),
            Phase::Complete => return None,
        };
        let len = (self.layout.section_len(section) - at).min(self.end - self.pos);
        let span = Span {
            section,
            at,
            len,
            record_offset: self.pos,
        };
        self.pos += len;
        Some(span)
    }
}
