//! Decoder to order book pipeline.

use thiserror::Error;
use tickbook_core::{ByteSource, DecoderConfig, DecoderStats, TickDecoder};
use tickbook_marketdata::{BookConfig, BookError, BookRegistry};

/// Error returned by [`FeedProcessor::ingest`].
#[derive(Debug, Error)]
pub enum FeedError {
    /// The stream could not be decoded or read.
    #[error("decode error: {0}")]
    Decode(#[from] tickbook_core::Error),
}

/// Counters for one [`FeedProcessor::ingest`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedReport {
    /// Events decoded from the stream.
    pub decoded: usize,
    /// Events applied to a book.
    pub applied: usize,
    /// Events rejected by a full book side.
    pub rejected: usize,
    /// Applied events that changed some book's top of book.
    pub top_changes: usize,
}

impl FeedReport {
    fn merge(&mut self, other: &FeedReport) {
        self.decoded += other.decoded;
        self.applied += other.applied;
        self.rejected += other.rejected;
        self.top_changes += other.top_changes;
    }
}

/// Feeds decoded updates into one order book per instrument.
///
/// A processor owns one decoder and therefore handles one stream. Capacity
/// rejections are logged and counted but do not stop ingestion; decoding
/// errors are returned after the decoder has discarded its buffer, so the
/// next `ingest` call resumes with fresh bytes.
#[derive(Debug)]
pub struct FeedProcessor {
    decoder: TickDecoder,
    registry: BookRegistry,
    totals: FeedReport,
    last_rejection: Option<BookError>,
}

impl FeedProcessor {
    /// Creates a processor.
    ///
    /// # Arguments
    /// * `decoder` - Decoder configuration
    /// * `books` - Configuration for every book the registry creates
    #[must_use]
    pub fn new(decoder: DecoderConfig, books: BookConfig) -> Self {
        Self {
            decoder: TickDecoder::with_config(decoder),
            registry: BookRegistry::new(books),
            totals: FeedReport::default(),
            last_rejection: None,
        }
    }

    /// Drains `source`, applying every decoded event to its book.
    ///
    /// # Returns
    /// Counters for this call. Events applied before an error remain applied.
    ///
    /// # Errors
    /// Returns [`FeedError::Decode`] for malformed input, buffer overflow or
    /// a failing source.
    pub fn ingest<S>(&mut self, source: &mut S) -> Result<FeedReport, FeedError>
    where
        S: ByteSource + ?Sized,
    {
        let mut report = FeedReport::default();
        let Self {
            decoder,
            registry,
            last_rejection,
            ..
        } = self;

        let result = decoder.parse(source, |event| {
            report.decoded += 1;
            match registry.book_mut(&event.instrument).apply_event(event) {
                Ok(top_changed) => {
                    report.applied += 1;
                    report.top_changes += usize::from(top_changed);
                }
                Err(err) => {
                    tracing::warn!(
                        instrument = %event.instrument,
                        error = %err,
                        "update rejected"
                    );
                    report.rejected += 1;
                    *last_rejection = Some(err);
                }
            }
        });

        self.totals.merge(&report);
        if let Err(err) = result {
            tracing::warn!(error = %err, "feed decoding failed");
            return Err(err.into());
        }
        Ok(report)
    }

    /// Returns the book registry.
    #[must_use]
    pub fn registry(&self) -> &BookRegistry {
        &self.registry
    }

    /// Returns the book registry mutably.
    pub fn registry_mut(&mut self) -> &mut BookRegistry {
        &mut self.registry
    }

    /// Returns the decoder counters.
    #[must_use]
    pub fn decoder_stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    /// Returns counters accumulated over every `ingest` call, including
    /// calls that ended in an error.
    #[must_use]
    pub fn totals(&self) -> FeedReport {
        self.totals
    }

    /// Returns the most recent capacity rejection, if any.
    #[must_use]
    pub fn last_rejection(&self) -> Option<&BookError> {
        self.last_rejection.as_ref()
    }

    /// Discards any partial message buffered by the decoder.
    pub fn reset(&mut self) {
        self.decoder.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickbook_core::{FramingMode, Side, UpdateEvent, encode_update};

    fn wire(events: &[UpdateEvent]) -> Vec<u8> {
        let mut out = Vec::new();
        for event in events {
            encode_update(event, &mut out);
        }
        out
    }

    #[test]
    fn test_ingest_applies_to_books() {
        let mut feed = FeedProcessor::new(DecoderConfig::default(), BookConfig::default());
        let bytes = wire(&[
            UpdateEvent::new(1, "BTC-USD", 123, 100, Side::Bid),
            UpdateEvent::new(2, "BTC-USD", 125, 100, Side::Ask),
            UpdateEvent::new(3, "ETH-USD", 400, 100, Side::Bid),
        ]);

        let report = feed.ingest(&mut &bytes[..]).unwrap();
        assert_eq!(
            report,
            FeedReport {
                decoded: 3,
                applied: 3,
                rejected: 0,
                top_changes: 1,
            }
        );
        assert_eq!(feed.registry().len(), 2);
        assert_eq!(feed.registry().get("BTC-USD").unwrap().last_update_time(), 2);
        assert_eq!(feed.decoder_stats().messages, 3);
    }

    #[test]
    fn test_rejections_do_not_stop_ingest() {
        let mut feed =
            FeedProcessor::new(DecoderConfig::default(), BookConfig::new().max_depth(1));
        let bytes = wire(&[
            UpdateEvent::new(1, "BTC-USD", 123, 100, Side::Bid),
            UpdateEvent::new(2, "BTC-USD", 124, 100, Side::Bid),
            UpdateEvent::new(3, "BTC-USD", 125, 100, Side::Ask),
        ]);

        let report = feed.ingest(&mut &bytes[..]).unwrap();
        assert_eq!(report.applied, 2);
        assert_eq!(report.rejected, 1);
        assert!(matches!(
            feed.last_rejection(),
            Some(BookError::CapacityExceeded { price: 124, .. })
        ));

        let book = feed.registry().get("BTC-USD").unwrap();
        assert_eq!(book.best_bid(), Some(123));
        assert_eq!(book.best_ask(), Some(125));
    }

    #[test]
    fn test_decode_error_keeps_applied_events() {
        let mut feed = FeedProcessor::new(
            DecoderConfig::new().framing(FramingMode::Strict),
            BookConfig::default(),
        );
        let mut bytes = wire(&[UpdateEvent::new(1, "BTC-USD", 123, 100, Side::Bid)]);
        bytes.extend_from_slice(b"t=1638848595|i=BTC-USD|p=1.25|x=1.00|s=s");

        let err = feed.ingest(&mut &bytes[..]).unwrap_err();
        assert!(matches!(err, FeedError::Decode(_)));
        assert_eq!(feed.totals().applied, 1);
        assert_eq!(feed.registry().get("BTC-USD").unwrap().best_bid(), Some(123));

        let retry = wire(&[UpdateEvent::new(2, "BTC-USD", 125, 100, Side::Ask)]);
        let report = feed.ingest(&mut &retry[..]).unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(feed.totals().applied, 2);
    }
}
