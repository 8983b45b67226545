//! [`ByteSource`] implementations for blocking readers and tests.

use std::io::{self, BufRead, BufReader, Read};

use tickbook_core::ByteSource;

/// Adapts any [`Read`] into a [`ByteSource`].
///
/// The number of available bytes is whatever the internal [`BufReader`]
/// currently holds. When it is empty, `available` blocks on one read of the
/// inner reader; zero then means end of stream.
#[derive(Debug)]
pub struct ReaderSource<R> {
    inner: BufReader<R>,
}

impl<R: Read> ReaderSource<R> {
    /// Wraps `reader` with the default buffer capacity.
    pub fn new(reader: R) -> Self {
        Self {
            inner: BufReader::new(reader),
        }
    }

    /// Wraps `reader` with a buffer of `capacity` bytes.
    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        Self {
            inner: BufReader::with_capacity(capacity, reader),
        }
    }

    /// Returns the wrapped reader. Buffered bytes are lost.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn available(&mut self) -> io::Result<usize> {
        loop {
            match self.inner.fill_buf() {
                Ok(buf) => return Ok(buf.len()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn read_into(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        self.inner.read(dst)
    }
}

/// In-memory source that releases at most `chunk` bytes per read.
///
/// Useful for exercising how a consumer handles messages split across reads.
#[derive(Debug, Clone)]
pub struct ChunkedSource {
    data: Vec<u8>,
    position: usize,
    chunk: usize,
}

impl ChunkedSource {
    /// Creates a source over `data` releasing `chunk` bytes at a time.
    ///
    /// A chunk size of zero is treated as one.
    pub fn new(data: impl Into<Vec<u8>>, chunk: usize) -> Self {
        Self {
            data: data.into(),
            position: 0,
            chunk: chunk.max(1),
        }
    }

    /// Returns the number of bytes not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

impl ByteSource for ChunkedSource {
    fn available(&mut self) -> io::Result<usize> {
        Ok(self.remaining().min(self.chunk))
    }

    fn read_into(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        let n = dst.len().min(self.remaining()).min(self.chunk);
        dst[..n].copy_from_slice(&self.data[self.position..self.position + n]);
        self.position += n;
        Ok(n)
    }
}
