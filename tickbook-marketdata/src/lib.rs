//! # TickBook Market Data
//!
//! Order book maintenance for a stream of price-level updates.
//!
//! This crate provides:
//! - Depth-limited bid/ask sides with shift-based insert and delete
//! - Mid price and a change-sampled average mid
//! - A registry that keeps one book per instrument

pub mod book;
pub mod config;
pub mod error;
pub mod history;
pub mod registry;

pub use book::{BookSide, BookSummary, OrderBook, PriceLevel};
pub use config::{BookConfig, MissingLevelPolicy};
pub use error::BookError;
pub use history::MidHistory;
pub use registry::BookRegistry;
pub use tickbook_core::Side;
