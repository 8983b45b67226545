//! Streaming decoder for the text update format.
//!
//! [`TickDecoder`] pulls bytes from a [`ByteSource`] into a single reusable
//! [`MessageBuffer`], frames messages, and hands each decoded
//! [`UpdateEvent`] to a consumer by reference. The event object, the buffer
//! and the symbol cache are all reused, so steady-state decoding does not
//! allocate.

use crate::buffer::MessageBuffer;
use crate::error::{Error, Result};
use crate::event::{Side, UpdateEvent};
use crate::intern::SymbolInterner;
use crate::source::ByteSource;
use crate::wire::{self, FramingMode, MIN_MESSAGE_LEN};

/// Decoder configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecoderConfig {
    /// Framing strategy.
    pub framing: FramingMode,
}

impl DecoderConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the framing strategy.
    #[must_use]
    pub fn framing(mut self, framing: FramingMode) -> Self {
        self.framing = framing;
        self
    }
}

/// Running counters kept by a decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Messages decoded and delivered.
    pub messages: u64,
    /// Bytes consumed by delivered messages.
    pub bytes_consumed: u64,
    /// Bytes thrown away after errors.
    pub discarded_bytes: u64,
    /// Errors reported.
    pub errors: u64,
}

/// Parses one message from `bytes` into `event`, interning the instrument.
///
/// Returns the number of bytes the message occupied, or `None` if `bytes`
/// ends before the message does.
fn fill_event(
    bytes: &[u8],
    framing: FramingMode,
    interner: &mut SymbolInterner,
    event: &mut UpdateEvent,
) -> Result<Option<usize>> {
    let Some(raw) = wire::parse_message(bytes, framing)? else {
        return Ok(None);
    };
    let instrument = interner.intern(raw.instrument).map_err(|err| match err {
        Error::InvalidUtf8 { offset } => Error::InvalidUtf8 {
            offset: wire::INSTRUMENT_OFFSET + offset,
        },
        other => other,
    })?;

    event.timestamp = raw.timestamp;
    event.instrument = instrument;
    event.price = raw.price;
    event.quantity = raw.quantity;
    event.side = Side::from_is_buy(raw.is_buy);
    Ok(Some(raw.len))
}

/// Low-allocation decoder for a stream of update messages.
///
/// A decoder owns its buffer and symbol cache; it is meant to be driven by a
/// single thread. Run one decoder per stream to ingest several streams.
///
/// # Example
/// ```
/// use tickbook_core::decoder::TickDecoder;
///
/// let mut decoder = TickDecoder::new();
/// let mut source: &[u8] = b"t=1638848595|i=BTC-USD|p=0.01|q=0.00|s=b";
/// let mut prices = Vec::new();
/// decoder.parse(&mut source, |event| prices.push(event.price)).unwrap();
/// assert_eq!(prices, vec![1]);
/// ```
#[derive(Debug)]
pub struct TickDecoder {
    config: DecoderConfig,
    buffer: MessageBuffer,
    interner: SymbolInterner,
    event: UpdateEvent,
    stats: DecoderStats,
    resyncing: bool,
}

impl TickDecoder {
    /// Creates a decoder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    /// Creates a decoder with the given configuration.
    #[must_use]
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            config,
            buffer: MessageBuffer::new(),
            interner: SymbolInterner::new(),
            event: UpdateEvent::default(),
            stats: DecoderStats::default(),
            resyncing: false,
        }
    }

    /// Returns the decoder configuration.
    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Returns the running counters.
    #[must_use]
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Returns the symbol cache.
    #[must_use]
    pub fn interner(&self) -> &SymbolInterner {
        &self.interner
    }

    /// Returns the most recently decoded event.
    #[must_use]
    pub fn event(&self) -> &UpdateEvent {
        &self.event
    }

    /// Returns the number of buffered bytes not yet consumed by a message.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Drains `source` and invokes `consumer` once per decoded event.
    ///
    /// Reading stops when the source reports no available bytes. A trailing
    /// partial message stays buffered for the next call.
    ///
    /// The event passed to `consumer` is reused for the next message; clone
    /// it to keep it.
    ///
    /// # Arguments
    /// * `source` - Byte source to pull from
    /// * `consumer` - Callback invoked with every decoded event
    ///
    /// # Returns
    /// The number of events delivered.
    ///
    /// # Errors
    /// Returns the first decoding error. The failed message is dropped up to
    /// the next `t=` marker; bytes after it stay buffered, and calling `parse`
    /// again resumes from there. Source errors are returned as [`Error::Io`].
    pub fn parse<S, F>(&mut self, source: &mut S, mut consumer: F) -> Result<usize>
    where
        S: ByteSource + ?Sized,
        F: FnMut(&UpdateEvent),
    {
        let mut delivered = self.drain(&mut consumer)?;
        loop {
            let available = source.available()?;
            if available == 0 {
                break;
            }

            self.buffer.compact();
            let spare = self.buffer.spare_mut();
            let want = available.min(spare.len());
            let read = source.read_into(&mut spare[..want])?;
            if read == 0 {
                break;
            }
            self.buffer.commit(read);

            delivered += self.drain(&mut consumer)?;
        }
        Ok(delivered)
    }

    /// Decodes every complete message in `bytes`, buffering any remainder.
    ///
    /// # Errors
    /// Same as [`parse`](Self::parse).
    pub fn feed<F>(&mut self, mut bytes: &[u8], consumer: F) -> Result<usize>
    where
        F: FnMut(&UpdateEvent),
    {
        self.parse(&mut bytes, consumer)
    }

    /// Parses a single message from the start of `bytes` without touching the
    /// accumulation buffer.
    ///
    /// On success the decoded event is available through
    /// [`event`](Self::event).
    ///
    /// # Returns
    /// The message length in bytes, or `None` if `bytes` holds only part of a
    /// message.
    ///
    /// # Errors
    /// Returns [`Error::MalformedField`], [`Error::MalformedFrame`] or
    /// [`Error::InvalidUtf8`] for bad input.
    pub fn read_update(&mut self, bytes: &[u8]) -> Result<Option<usize>> {
        fill_event(
            bytes,
            self.config.framing,
            &mut self.interner,
            &mut self.event,
        )
    }

    /// Discards any buffered partial message.
    pub fn reset(&mut self) {
        self.stats.discarded_bytes += self.buffer.clear() as u64;
        self.resyncing = false;
    }

    fn drain<F>(&mut self, consumer: &mut F) -> Result<usize>
    where
        F: FnMut(&UpdateEvent),
    {
        if self.resyncing && !self.skip_to_message() {
            return Ok(0);
        }

        let mut delivered = 0;
        while self.frame_ready() {
            let decoded = fill_event(
                self.buffer.filled(),
                self.config.framing,
                &mut self.interner,
                &mut self.event,
            );
            match decoded {
                Ok(Some(len)) => {
                    self.buffer.consume(len);
                    self.stats.messages += 1;
                    self.stats.bytes_consumed += len as u64;
                    tracing::trace!(
                        instrument = %self.event.instrument,
                        price = self.event.price,
                        quantity = self.event.quantity,
                        "decoded update"
                    );
                    consumer(&self.event);
                    delivered += 1;
                }
                Ok(None) => break,
                Err(err) => return Err(self.discard(err)),
            }
        }

        if self.buffer.is_full() {
            let err = Error::BufferOverflow {
                buffered: self.buffer.len(),
                capacity: self.buffer.capacity(),
            };
            return Err(self.discard(err));
        }
        Ok(delivered)
    }

    #[inline]
    fn frame_ready(&self) -> bool {
        let bytes = self.buffer.filled();
        match self.config.framing {
            FramingMode::Heuristic => wire::frame_candidate(bytes),
            FramingMode::Strict => bytes.len() >= MIN_MESSAGE_LEN,
        }
    }

    /// Drops bytes left over from a failed message up to the next `t=`.
    ///
    /// Returns true once the buffer starts at a message boundary.
    fn skip_to_message(&mut self) -> bool {
        let (skip, found) = wire::leading_garbage(self.buffer.filled());
        if skip > 0 {
            self.buffer.consume(skip);
            self.stats.discarded_bytes += skip as u64;
        }
        self.resyncing = !found;
        found
    }

    fn discard(&mut self, err: Error) -> Error {
        let dropped = wire::resync_len(self.buffer.filled());
        self.buffer.consume(dropped);
        self.resyncing = true;
        self.stats.discarded_bytes += dropped as u64;
        self.stats.errors += 1;
        tracing::warn!(error = %err, dropped, "discarding buffered bytes");
        err
    }
}

impl Default for TickDecoder {
    fn default() -> Self {
        Self::new()
    }
}
