//! Update message codec for async byte streams.
//!
//! Adapts the text wire format to [`tokio_util::codec`] so a decoder can sit
//! behind `FramedRead` on any `AsyncRead`. Each decoded item is an owned
//! [`UpdateEvent`]; instruments are interned per codec.

use bytes::{Buf, BytesMut};
use tickbook_core::wire::{
    self, FramingMode, INSTRUMENT_LEN, MAX_FIXED_POINT, MAX_MESSAGE_LEN, MAX_TIMESTAMP,
    MIN_MESSAGE_LEN,
};
use tickbook_core::{Side, SymbolInterner, UpdateEvent, encode_update};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::TransportError;

/// Codec for concatenated text update messages.
///
/// A malformed message is reported once and skipped up to the next `t=`
/// marker; messages after it decode normally.
#[derive(Debug, Default)]
pub struct TickFrameCodec {
    framing: FramingMode,
    interner: SymbolInterner,
    scratch: Vec<u8>,
    resyncing: bool,
}

impl TickFrameCodec {
    /// Creates a new codec with the given framing mode.
    ///
    /// # Arguments
    /// * `framing` - Whether key markers are validated
    #[must_use]
    pub fn new(framing: FramingMode) -> Self {
        Self {
            framing,
            interner: SymbolInterner::new(),
            scratch: Vec::with_capacity(MAX_MESSAGE_LEN),
            resyncing: false,
        }
    }

    /// Returns the framing mode.
    #[must_use]
    pub fn framing(&self) -> FramingMode {
        self.framing
    }

    /// Returns the codec's symbol cache.
    #[must_use]
    pub fn interner(&self) -> &SymbolInterner {
        &self.interner
    }

    fn discard(&mut self, src: &mut BytesMut, err: tickbook_core::Error) -> TransportError {
        let dropped = wire::resync_len(src);
        src.advance(dropped);
        self.resyncing = true;
        tracing::warn!(error = %err, dropped, "discarding malformed frame");
        err.into()
    }
}

/// Checks that every field of `item` fits the wire format.
fn check_encodable(item: &UpdateEvent) -> Result<(), TransportError> {
    if item.instrument.len() != INSTRUMENT_LEN {
        return Err(TransportError::invalid_frame(format!(
            "instrument {:?} is not {INSTRUMENT_LEN} bytes",
            item.instrument
        )));
    }
    if item.timestamp > MAX_TIMESTAMP {
        return Err(TransportError::invalid_frame(format!(
            "timestamp {} exceeds ten digits",
            item.timestamp
        )));
    }
    for (field, value) in [("price", item.price), ("quantity", item.quantity)] {
        if !(0..=MAX_FIXED_POINT).contains(&value) {
            return Err(TransportError::invalid_frame(format!(
                "{field} {value} outside 0..={MAX_FIXED_POINT}"
            )));
        }
    }
    Ok(())
}

impl Decoder for TickFrameCodec {
    type Item = UpdateEvent;
    type Error = TransportError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.resyncing {
            let (skip, found) = wire::leading_garbage(src);
            src.advance(skip);
            if !found {
                return Ok(None);
            }
            self.resyncing = false;
        }

        if src.len() < MIN_MESSAGE_LEN {
            return Ok(None);
        }

        let window = &src[..src.len().min(MAX_MESSAGE_LEN)];
        let raw = match wire::parse_message(window, self.framing) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                src.reserve(MAX_MESSAGE_LEN.saturating_sub(src.len()));
                return Ok(None);
            }
            Err(err) => return Err(self.discard(src, err)),
        };

        let (timestamp, price, quantity, is_buy, len) =
            (raw.timestamp, raw.price, raw.quantity, raw.is_buy, raw.len);
        let instrument = match self.interner.intern(raw.instrument) {
            Ok(instrument) => instrument,
            Err(err) => return Err(self.discard(src, err)),
        };
        src.advance(len);
        Ok(Some(UpdateEvent {
            timestamp,
            instrument,
            price,
            quantity,
            side: Side::from_is_buy(is_buy),
        }))
    }
}

impl Encoder<&UpdateEvent> for TickFrameCodec {
    type Error = TransportError;

    fn encode(&mut self, item: &UpdateEvent, dst: &mut BytesMut) -> Result<(), Self::Error> {
        check_encodable(item)?;
        self.scratch.clear();
        encode_update(item, &mut self.scratch);
        dst.extend_from_slice(&self.scratch);
        Ok(())
    }
}

impl Encoder<UpdateEvent> for TickFrameCodec {
    type Error = TransportError;

    fn encode(&mut self, item: UpdateEvent, dst: &mut BytesMut) -> Result<(), Self::Error> {
        <Self as Encoder<&UpdateEvent>>::encode(self, &item, dst)
    }
}
