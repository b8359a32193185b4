//! Data-block ("dblk") arithmetic.
//!
//! Every page-sized read and write in the journal covers a whole number of
//! dblks. Record offsets handed between the journal driver and the codec
//! are expressed in dblks for paging calls.

/// Size of one dblk in bytes.
pub const DBLK_SIZE: usize = 128;

/// Number of dblks needed to hold `bytes` bytes (rounded up).
///
/// Saturates at `u32::MAX` for sizes no journal page could describe.
#[must_use]
pub fn size_dblks(bytes: usize) -> u32 {
    u32::try_from(bytes.div_ceil(DBLK_SIZE)).unwrap_or(u32::MAX)
}

/// Number of bytes covered by `dblks` dblks.
#[must_use]
pub const fn dblks_to_bytes(dblks: u32) -> usize {
    dblks as usize * DBLK_SIZE
}

/// `bytes` rounded up to the next dblk boundary.
#[must_use]
pub fn aligned_size(bytes: usize) -> usize {
    dblks_to_bytes(size_dblks(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_to_whole_dblks() {
        assert_eq!(size_dblks(0), 0);
        assert_eq!(size_dblks(1), 1);
        assert_eq!(size_dblks(DBLK_SIZE), 1);
        assert_eq!(size_dblks(DBLK_SIZE + 1), 2);
    }

    #[test]
    fn aligned_size_matches_dblk_count() {
        assert_eq!(aligned_size(50), DBLK_SIZE);
        assert_eq!(aligned_size(264), 3 * DBLK_SIZE);
        assert_eq!(dblks_to_bytes(4), 512);
    }
}
