//! Core type definitions for the journal.

use std::fmt;

/// Identifier of a journal record.
///
/// Record ids are assigned monotonically by the journal and never reused
/// within a journal's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RecordId(pub u64);

impl RecordId {
    /// Creates a new record id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the id the journal assigns after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_ordering() {
        let r1 = RecordId::new(1);
        assert!(r1 < r1.next());
        assert_eq!(r1.next().as_u64(), 2);
    }

    #[test]
    fn record_id_display_is_hex() {
        assert_eq!(RecordId::from(255).to_string(), "0x00000000000000ff");
    }
}
