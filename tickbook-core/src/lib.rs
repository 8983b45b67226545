//! # TickBook Core
//!
//! Core types for ingesting a text stream of price-level updates.
//!
//! This crate provides:
//! - [`UpdateEvent`] and [`Side`], the decoded update value
//! - Fixed-width field readers for the wire format ([`wire`])
//! - A reusable accumulation buffer and symbol interner
//! - [`TickDecoder`], a streaming decoder that does not allocate per message
//! - The [`ByteSource`] trait the decoder pulls from
//! - Error types for decoding operations

pub mod buffer;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod event;
pub mod intern;
pub mod source;
pub mod wire;

pub use buffer::{AccumulationBuffer, MessageBuffer};
pub use decoder::{DecoderConfig, DecoderStats, TickDecoder};
pub use encoder::{encode_to_vec, encode_update};
pub use error::{Error, Field, Result};
pub use event::{PRICE_SCALE, Side, UpdateEvent, to_real};
pub use intern::SymbolInterner;
pub use source::ByteSource;
pub use wire::{FramingMode, MAX_MESSAGE_LEN, MIN_MESSAGE_LEN};
