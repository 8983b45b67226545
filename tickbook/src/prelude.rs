//! Prelude module for convenient imports.
//!
//! ```
//! use tickbook::prelude::*;
//! ```

// Core types
pub use tickbook_core::error::{Error as DecodeError, Result as DecodeResult};
pub use tickbook_core::{
    ByteSource, DecoderConfig, DecoderStats, FramingMode, Side, TickDecoder, UpdateEvent,
    encode_update,
};

// Market data types
pub use tickbook_marketdata::{
    BookConfig, BookError, BookRegistry, BookSide, BookSummary, MissingLevelPolicy, OrderBook,
    PriceLevel,
};

// Transport types
pub use tickbook_transport::{ChunkedSource, ReaderSource, TransportError};

// Pipeline
pub use crate::feed::{FeedError, FeedProcessor, FeedReport};
