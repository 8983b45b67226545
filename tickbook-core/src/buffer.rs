//! Fixed-capacity accumulation buffer for partially received messages.
//!
//! Bytes are appended at the tail as they arrive from the source and consumed
//! from the head as messages are parsed. [`AccumulationBuffer::compact`] moves
//! the unconsumed remainder back to the front so the same storage is reused
//! for every message.

use crate::wire::MAX_MESSAGE_LEN;

/// Cache-line aligned byte buffer with logical start/end cursors.
///
/// Invariant: `start <= end <= N`.
///
/// # Type Parameters
/// * `N` - Buffer capacity in bytes
#[repr(C, align(64))]
#[derive(Clone)]
pub struct AccumulationBuffer<const N: usize> {
    data: [u8; N],
    start: usize,
    end: usize,
}

/// Buffer sized for exactly one maximum-length update message.
pub type MessageBuffer = AccumulationBuffer<MAX_MESSAGE_LEN>;

impl<const N: usize> AccumulationBuffer<N> {
    /// Creates a new empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: [0u8; N],
            start: 0,
            end: 0,
        }
    }

    /// Returns the capacity of the buffer in bytes.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns the number of buffered, unconsumed bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if no unconsumed bytes are buffered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if unconsumed bytes occupy the entire capacity.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    /// Returns the buffered, unconsumed bytes.
    #[inline]
    #[must_use]
    pub fn filled(&self) -> &[u8] {
        &self.data[self.start..self.end]
    }

    /// Returns the writable tail after the last buffered byte.
    ///
    /// Call [`compact`](Self::compact) first to make all free space available.
    #[inline]
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.end..]
    }

    /// Marks `n` bytes written into [`spare_mut`](Self::spare_mut) as buffered.
    ///
    /// # Panics
    /// Panics if `n` exceeds the spare capacity.
    #[inline]
    pub fn commit(&mut self, n: usize) {
        assert!(n <= N - self.end, "commit past buffer capacity");
        self.end += n;
    }

    /// Drops `n` bytes from the head of the buffered region.
    ///
    /// # Panics
    /// Panics if `n` exceeds the buffered length.
    #[inline]
    pub fn consume(&mut self, n: usize) {
        assert!(n <= self.len(), "consume past buffered bytes");
        self.start += n;
        if self.start == self.end {
            self.start = 0;
            self.end = 0;
        }
    }

    /// Moves the unconsumed remainder to the front of the storage.
    #[inline]
    pub fn compact(&mut self) {
        if self.start > 0 {
            self.data.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }
    }

    /// Discards every buffered byte and returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.len();
        self.start = 0;
        self.end = 0;
        dropped
    }
}

impl<const N: usize> Default for AccumulationBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> AsRef<[u8]> for AccumulationBuffer<N> {
    fn as_ref(&self) -> &[u8] {
        self.filled()
    }
}

impl<const N: usize> std::fmt::Debug for AccumulationBuffer<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccumulationBuffer")
            .field("capacity", &N)
            .field("start", &self.start)
            .field("end", &self.end)
            .finish()
    }
}
