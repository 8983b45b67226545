//! Error types for order book operations.

use thiserror::Error;
use tickbook_core::Side;

/// Error type for order book operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// Inserting a new level would exceed the side's fixed depth.
    #[error("{side:?} side full: cannot insert price {price} beyond {capacity} levels")]
    CapacityExceeded {
        /// Side that rejected the update.
        side: Side,
        /// Maximum number of levels on the side.
        capacity: usize,
        /// Scaled price of the rejected level.
        price: i64,
    },
}

impl BookError {
    /// Creates a capacity exceeded error.
    #[must_use]
    pub fn capacity_exceeded(side: Side, capacity: usize, price: i64) -> Self {
        Self::CapacityExceeded {
            side,
            capacity,
            price,
        }
    }
}

/// Result type alias for order book operations.
pub type Result<T> = std::result::Result<T, BookError>;
