//! Abstract readable byte source.

use std::io;

/// A blocking source of bytes.
///
/// The decoder pulls from a source by asking how many bytes are ready and
/// then reading at most that many. A source signals the end of its data by
/// reporting zero available bytes.
pub trait ByteSource {
    /// Returns how many bytes can be read without waiting. Zero means the
    /// source is exhausted.
    ///
    /// # Errors
    /// Returns any error raised by the underlying transport.
    fn available(&mut self) -> io::Result<usize>;

    /// Reads up to `dst.len()` bytes into `dst` and returns the count read.
    ///
    /// # Errors
    /// Returns any error raised by the underlying transport.
    fn read_into(&mut self, dst: &mut [u8]) -> io::Result<usize>;
}

impl ByteSource for &[u8] {
    #[inline]
    fn available(&mut self) -> io::Result<usize> {
        Ok(self.len())
    }

    #[inline]
    fn read_into(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        let n = dst.len().min(self.len());
        let (head, tail) = self.split_at(n);
        dst[..n].copy_from_slice(head);
        *self = tail;
        Ok(n)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    #[inline]
    fn available(&mut self) -> io::Result<usize> {
        (**self).available()
    }

    #[inline]
    fn read_into(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        (**self).read_into(dst)
    }
}
