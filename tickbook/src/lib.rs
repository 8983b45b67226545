//! # TickBook
//!
//! Streaming decoder and depth-limited order books for a text feed of
//! price-level updates.
//!
//! Messages look like `t=1638848595|i=BTC-USD|p=0.01|q=0.00|s=b` and arrive
//! concatenated with no separator, possibly split across reads. The decoder
//! turns them into [`UpdateEvent`](core::UpdateEvent)s without allocating per
//! message; the order book keeps the best `N` levels per side and a rolling
//! average of the mid price.
//!
//! ## Quick Start
//!
//! ```
//! use tickbook::prelude::*;
//!
//! let mut feed = FeedProcessor::new(DecoderConfig::default(), BookConfig::default());
//! let mut source: &[u8] = b"t=1638848595|i=BTC-USD|p=1.23|q=1.00|s=bt=1638848596|i=BTC-USD|p=1.25|q=2.00|s=s";
//!
//! let report = feed.ingest(&mut source)?;
//! assert_eq!(report.applied, 2);
//!
//! let book = feed.registry().get("BTC-USD").unwrap();
//! assert_eq!(book.mid(), Some(1.24));
//! # Ok::<(), tickbook::FeedError>(())
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Wire format, update events, the streaming decoder
//! - [`marketdata`] - Book sides, order books, the per-instrument registry
//! - [`transport`] - Byte sources and the async frame codec
//! - [`feed`] - Decoder to registry pipeline

pub mod feed;
pub mod prelude;

pub use feed::{FeedError, FeedProcessor, FeedReport};

/// Wire format, update events and the streaming decoder.
pub mod core {
    pub use tickbook_core::*;
}

/// Order book maintenance.
pub mod marketdata {
    pub use tickbook_marketdata::*;
}

/// Byte sources and stream codecs.
pub mod transport {
    pub use tickbook_transport::*;
}
