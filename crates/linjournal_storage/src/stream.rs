//! Sequential read primitives for journal recovery.
//!
//! Recovery walks a journal file front to back. The last record in a file
//! may have been cut short by an unclean shutdown, so running out of bytes
//! is an expected outcome: every read reports how many bytes it produced
//! and whether the stream ended before the request was satisfied. There is
//! no sticky failure state to clear afterwards.

use crate::backend::StorageBackend;
use crate::error::StorageResult;
use std::io::{self, Read};

/// Result of a single sequential read or skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Number of bytes actually read (or skipped).
    pub count: usize,
    /// True when the stream ended before the request was satisfied.
    pub at_end: bool,
}

impl ReadOutcome {
    /// A read that produced every requested byte.
    #[must_use]
    pub const fn full(count: usize) -> Self {
        Self {
            count,
            at_end: false,
        }
    }

    /// A read that stopped early because the stream ended.
    #[must_use]
    pub const fn short(count: usize) -> Self {
        Self {
            count,
            at_end: true,
        }
    }
}

/// A forward-only byte stream.
///
/// Implementations fill as much of the request as the stream allows and
/// only signal `at_end` when fewer bytes than requested were available.
/// I/O failures other than end of stream are returned as errors.
pub trait SequentialReader {
    /// Reads up to `buf.len()` bytes into `buf`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn read_up_to(&mut self, buf: &mut [u8]) -> StorageResult<ReadOutcome>;

    /// Advances past up to `len` bytes without returning them.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn skip(&mut self, len: usize) -> StorageResult<ReadOutcome>;
}

/// A sequential cursor over a [`StorageBackend`].
///
/// The cursor observes the backend size at each read, so bytes appended
/// after the reader was created become visible to it.
#[derive(Debug)]
pub struct BackendReader<'a, B: StorageBackend + ?Sized> {
    backend: &'a B,
    position: u64,
}

impl<'a, B: StorageBackend + ?Sized> BackendReader<'a, B> {
    /// Creates a reader positioned at `start`.
    pub fn new(backend: &'a B, start: u64) -> Self {
        Self {
            backend,
            position: start,
        }
    }

    /// Returns the current byte position within the backend.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    fn available(&self, wanted: usize) -> StorageResult<usize> {
        let remaining = self.backend.size()?.saturating_sub(self.position);
        Ok(usize::try_from(remaining).map_or(wanted, |r| r.min(wanted)))
    }
}

impl<B: StorageBackend + ?Sized> SequentialReader for BackendReader<'_, B> {
    fn read_up_to(&mut self, buf: &mut [u8]) -> StorageResult<ReadOutcome> {
        let count = self.available(buf.len())?;
        if count > 0 {
            let data = self.backend.read_at(self.position, count)?;
            buf[..count].copy_from_slice(&data);
            self.position += count as u64;
        }
        Ok(outcome(count, buf.len()))
    }

    fn skip(&mut self, len: usize) -> StorageResult<ReadOutcome> {
        let count = self.available(len)?;
        self.position += count as u64;
        Ok(outcome(count, len))
    }
}

/// A sequential reader over any [`std::io::Read`] source.
///
/// `Interrupted` errors are retried; a zero-length read marks end of stream.
#[derive(Debug)]
pub struct IoReader<R> {
    inner: R,
}

impl<R: Read> IoReader<R> {
    /// Wraps a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> SequentialReader for IoReader<R> {
    fn read_up_to(&mut self, buf: &mut [u8]) -> StorageResult<ReadOutcome> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(outcome(filled, buf.len()))
    }

    fn skip(&mut self, len: usize) -> StorageResult<ReadOutcome> {
        let skipped = io::copy(&mut (&mut self.inner).take(len as u64), &mut io::sink())?;
        // skipped <= len by construction of `take`
        Ok(outcome(skipped as usize, len))
    }
}

fn outcome(count: usize, requested: usize) -> ReadOutcome {
    if count < requested {
        ReadOutcome::short(count)
    } else {
        ReadOutcome::full(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryBackend;
    use std::io::Cursor;

    #[test]
    fn backend_reader_reports_short_read_at_end() {
        let backend = InMemoryBackend::with_data((0u8..10).collect());
        let mut reader = BackendReader::new(&backend, 4);

        let mut buf = [0u8; 4];
        assert_eq!(reader.read_up_to(&mut buf).unwrap(), ReadOutcome::full(4));
        assert_eq!(buf, [4, 5, 6, 7]);

        let outcome = reader.read_up_to(&mut buf).unwrap();
        assert_eq!(outcome, ReadOutcome::short(2));
        assert_eq!(&buf[..2], &[8, 9]);
        assert_eq!(reader.position(), 10);

        assert_eq!(reader.read_up_to(&mut buf).unwrap(), ReadOutcome::short(0));
    }

    #[test]
    fn backend_reader_skip_stops_at_end() {
        let backend = InMemoryBackend::with_data(vec![0u8; 100]);
        let mut reader = BackendReader::new(&backend, 0);

        assert_eq!(reader.skip(60).unwrap(), ReadOutcome::full(60));
        assert_eq!(reader.skip(60).unwrap(), ReadOutcome::short(40));
        assert_eq!(reader.position(), 100);
    }

    #[test]
    fn backend_reader_sees_later_appends() {
        let mut backend = InMemoryBackend::with_data(vec![1u8; 2]);
        let mut buf = [0u8; 4];
        let position = {
            let mut reader = BackendReader::new(&backend, 0);
            assert!(reader.read_up_to(&mut buf).unwrap().at_end);
            reader.position()
        };

        backend.append(&[2u8; 4]).unwrap();
        let mut reader = BackendReader::new(&backend, position);
        assert_eq!(reader.read_up_to(&mut buf).unwrap(), ReadOutcome::full(4));
        assert_eq!(buf, [2u8; 4]);
    }

    #[test]
    fn io_reader_fills_across_small_reads() {
        struct Trickle(Cursor<Vec<u8>>);
        impl Read for Trickle {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                let n = buf.len().min(3);
                self.0.read(&mut buf[..n])
            }
        }

        let mut reader = IoReader::new(Trickle(Cursor::new((0u8..20).collect())));
        let mut buf = [0u8; 16];
        assert_eq!(reader.read_up_to(&mut buf).unwrap(), ReadOutcome::full(16));
        assert_eq!(buf[15], 15);

        assert_eq!(reader.read_up_to(&mut buf).unwrap(), ReadOutcome::short(4));
    }

    #[test]
    fn io_reader_skip() {
        let mut reader = IoReader::new(Cursor::new(vec![9u8; 10]));
        assert_eq!(reader.skip(7).unwrap(), ReadOutcome::full(7));
        assert_eq!(reader.skip(7).unwrap(), ReadOutcome::short(3));
        assert_eq!(reader.into_inner().position(), 10);
    }

    #[test]
    fn io_reader_propagates_errors() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk gone"))
            }
        }

        let mut reader = IoReader::new(Broken);
        let mut buf = [0u8; 4];
        assert!(reader.read_up_to(&mut buf).is_err());
    }

    proptest::proptest! {
        #[test]
        fn chunked_reads_reassemble_the_stream(
            data in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..512),
            chunks in proptest::collection::vec(1usize..64, 1..32),
        ) {
            let backend = InMemoryBackend::with_data(data.clone());
            let mut reader = BackendReader::new(&backend, 0);
            let mut out = Vec::new();
            for &len in chunks.iter().cycle() {
                let mut buf = vec![0u8; len];
                let outcome = reader.read_up_to(&mut buf).unwrap();
                out.extend_from_slice(&buf[..outcome.count]);
                if outcome.at_end {
                    break;
                }
            }
            proptest::prop_assert_eq!(out, data);
        }
    }
}
