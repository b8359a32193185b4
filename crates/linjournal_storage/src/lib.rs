//! # linjournal storage
//!
//! Byte stores and read primitives underneath the linjournal record codec.
//!
//! Backends are **opaque byte stores**: they hold journal file contents
//! without interpreting record headers, dblks or tails. The codec in
//! `linjournal_core` owns every format decision.
//!
//! ## Design Principles
//!
//! - Backends are simple byte stores (read, append, flush, truncate)
//! - Recovery reads through [`SequentialReader`], which reports how many
//!   bytes a read produced and whether the stream is exhausted, so a short
//!   read at end of file is an ordinary value rather than an error state
//! - Backends must be `Send + Sync` for concurrent access
//!
//! ## Available Types
//!
//! - [`InMemoryBackend`] - For testing and ephemeral journals
//! - [`FileBackend`] - For persistent journal files
//! - [`BackendReader`] - Sequential cursor over any [`StorageBackend`]
//! - [`IoReader`] - Sequential reader over any [`std::io::Read`]
//!
//! ## Example
//!
//! ```rust
//! use linjournal_storage::{BackendReader, InMemoryBackend, SequentialReader, StorageBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! backend.append(b"journal").unwrap();
//!
//! let mut reader = BackendReader::new(&backend, 0);
//! let mut buf = [0u8; 16];
//! let outcome = reader.read_up_to(&mut buf).unwrap();
//! assert_eq!(outcome.count, 7);
//! assert!(outcome.at_end);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;
mod stream;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
pub use stream::{BackendReader, IoReader, ReadOutcome, SequentialReader};
