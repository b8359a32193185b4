//! Benchmark utilities.

use linjournal_core::{dblks_to_bytes, RecordId, TransactionRecord};
use rand::Rng;

/// Xid sizes exercised by the benches, from a single-dblk record up to one
/// spanning many pages.
pub const XID_SIZES: [usize; 4] = [32, 200, 1000, 8000];

/// Generate a random transaction id of the specified size.
pub fn random_xid(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate `count` random xids of `size` bytes.
pub fn random_xids(count: usize, size: usize) -> Vec<Vec<u8>> {
    (0..count).map(|_| random_xid(size)).collect()
}

/// Encode `record` whole into a buffer of its aligned size.
pub fn aligned_image(record: &TransactionRecord<'_>) -> Vec<u8> {
    let dblks = record.record_dblks();
    let mut image = vec![0u8; dblks_to_bytes(dblks)];
    record
        .encode(&mut image, 0, dblks)
        .expect("benchmark record encodes");
    image
}

/// Encode a journal of alternating commit and abort markers.
pub fn journal_image(xids: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, xid) in xids.iter().enumerate() {
        let rid = RecordId::new(i as u64);
        let record = if i % 2 == 0 {
            TransactionRecord::commit(rid, xid)
        } else {
            TransactionRecord::abort(rid, xid)
        };
        out.extend_from_slice(&aligned_image(&record));
    }
    out
}
