//! Codec configuration.

/// Filler byte conventionally written after the end of a record.
pub const DEFAULT_FILL_BYTE: u8 = 0xff;

/// Default upper bound on an xid length read from disk (1 MiB).
pub const DEFAULT_MAX_XID_SIZE: usize = 1024 * 1024;

/// Configuration for a [`crate::TransactionRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Byte written over the unused remainder of a record's final dblk.
    ///
    /// `None` leaves those bytes untouched. Readers never depend on them.
    pub fill_byte: Option<u8>,

    /// Largest xid length accepted from a header being decoded.
    ///
    /// Lengths above this are treated as a corrupt header instead of
    /// being allocated.
    pub max_xid_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            fill_byte: None,
            max_xid_size: DEFAULT_MAX_XID_SIZE,
        }
    }
}

impl CodecConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills the unused end of a record's final dblk with `value`.
    #[must_use]
    pub const fn fill_byte(mut self, value: u8) -> Self {
        self.fill_byte = Some(value);
        self
    }

    /// Leaves the unused end of a record's final dblk untouched.
    #[must_use]
    pub const fn without_fill(mut self) -> Self {
        self.fill_byte = None;
        self
    }

    /// Sets the largest accepted xid length.
    #[must_use]
    pub const fn max_xid_size(mut self, size: usize) -> Self {
        self.max_xid_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.fill_byte, None);
        assert_eq!(config.max_xid_size, DEFAULT_MAX_XID_SIZE);
    }

    #[test]
    fn builder_pattern() {
        let config = CodecConfig::new()
            .fill_byte(DEFAULT_FILL_BYTE)
            .max_xid_size(512);
        assert_eq!(config.fill_byte, Some(0xff));
        assert_eq!(config.max_xid_size, 512);

        assert_eq!(config.without_fill().fill_byte, None);
    }
}
