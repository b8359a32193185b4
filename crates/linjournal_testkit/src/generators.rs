//! Property-based test generators using proptest.
//!
//! Provides strategies for transaction ids, record ids, marker kinds and
//! page plans that respect the codec's preconditions.

use linjournal_core::{RecordId, RecordKind, TransactionRecord, DBLK_SIZE};
use proptest::prelude::*;

/// An owned description of a record to encode.
///
/// [`TransactionRecord`] borrows its xid while encoding; generators produce
/// this instead and tests borrow from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSpec {
    /// Marker kind.
    pub kind: RecordKind,
    /// Record id.
    pub record_id: RecordId,
    /// Transaction id bytes (never empty).
    pub xid: Vec<u8>,
}

impl RecordSpec {
    /// Builds the record to encode, borrowing this spec's xid.
    #[must_use]
    pub fn record(&self) -> TransactionRecord<'_> {
        TransactionRecord::with_xid(self.kind.magic(), self.record_id, &self.xid)
    }
}

/// Strategy for transaction ids of 1 to 8 dblks worth of bytes.
pub fn xid_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=8 * DBLK_SIZE)
}

/// Strategy for short, printable transaction ids such as brokers assign.
pub fn printable_xid_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::string::string_regex("[a-zA-Z0-9:._-]{1,64}")
        .expect("Invalid regex")
        .prop_map(String::into_bytes)
}

/// Strategy for record ids.
pub fn record_id_strategy() -> impl Strategy<Value = RecordId> {
    any::<u64>().prop_map(RecordId::new)
}

/// Strategy for marker kinds.
pub fn kind_strategy() -> impl Strategy<Value = RecordKind> {
    prop_oneof![Just(RecordKind::Commit), Just(RecordKind::Abort)]
}

/// Strategy for page plans: 1 to 4 page sizes of 1 to 4 dblks.
pub fn page_plan_strategy() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(1u32..=4, 1..=4)
}

/// Strategy for whole record specs.
pub fn record_spec_strategy() -> impl Strategy<Value = RecordSpec> {
    (kind_strategy(), record_id_strategy(), xid_strategy()).prop_map(
        |(kind, record_id, xid)| RecordSpec {
            kind,
            record_id,
            xid,
        },
    )
}

/// Strategy for a journal's worth of records with ascending ids.
pub fn journal_strategy(
    min_records: usize,
    max_records: usize,
) -> impl Strategy<Value = Vec<RecordSpec>> {
    (
        any::<u32>(),
        prop::collection::vec((kind_strategy(), printable_xid_strategy()), min_records..max_records),
    )
        .prop_map(|(first, entries)| {
            entries
                .into_iter()
                .zip(u64::from(first)..)
                .map(|((kind, xid), rid)| RecordSpec {
                    kind,
                    record_id: RecordId::new(rid),
                    xid,
                })
                .collect()
        })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
