//! # TickBook Transport
//!
//! Byte sources and stream adapters for the update decoder.
//!
//! This crate provides:
//! - [`ReaderSource`] - Any blocking [`std::io::Read`] as a byte source
//! - [`ChunkedSource`] - In-memory source with bounded reads, for split-message tests
//! - `TickFrameCodec` - A `tokio-util` codec for async streams (feature `codec`)

#[cfg(feature = "codec")]
pub mod codec;
pub mod error;
pub mod source;

#[cfg(feature = "codec")]
pub use codec::TickFrameCodec;
pub use error::TransportError;
pub use source::{ChunkedSource, ReaderSource};
