//! # linjournal testkit
//!
//! Test utilities for the linjournal record codec.
//!
//! This crate provides:
//! - Fixtures that drive encode and decode page by page
//! - Property-based test generators using proptest
//! - Crash simulation and journal scanning for recovery tests
//!
//! ## Usage
//!
//! ```rust
//! use linjournal_core::{RecordId, TransactionRecord};
//! use linjournal_testkit::prelude::*;
//!
//! let record = TransactionRecord::commit(RecordId::new(1), b"xid");
//! let (image, _) = encode_paged(&record, &[1]).unwrap();
//! let (decoded, _) = decode_paged(&image, &[1]).unwrap();
//! assert_eq!(decoded.xid(), Some(&b"xid"[..]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod crash;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::crash::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use crash::*;
pub use fixtures::*;
pub use generators::*;
