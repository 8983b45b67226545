//! Price-level update events.

use std::sync::Arc;

/// Number of implied decimal places is two, so real values are scaled by 100.
pub const PRICE_SCALE: i64 = 100;

/// Converts a value scaled by [`PRICE_SCALE`] into real units.
#[inline]
#[must_use]
pub fn to_real(scaled: i64) -> f64 {
    scaled as f64 / PRICE_SCALE as f64
}

/// Order book side (bid or ask).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Bid (buy) side.
    Bid,
    /// Ask (sell) side.
    Ask,
}

impl Side {
    /// Returns the side for a buy flag.
    #[inline]
    #[must_use]
    pub fn from_is_buy(is_buy: bool) -> Self {
        if is_buy { Self::Bid } else { Self::Ask }
    }

    /// Returns true for the bid side.
    #[inline]
    #[must_use]
    pub fn is_bid(self) -> bool {
        matches!(self, Self::Bid)
    }

    /// Wire flag for this side (`b` or `s`).
    #[inline]
    #[must_use]
    pub fn wire_flag(self) -> u8 {
        match self {
            Self::Bid => b'b',
            Self::Ask => b's',
        }
    }
}

/// A single price-level update for one instrument.
///
/// Prices and quantities are scaled by [`PRICE_SCALE`]. A quantity of zero
/// removes the level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateEvent {
    /// Seconds since the unix epoch.
    pub timestamp: u64,
    /// Interned instrument symbol.
    pub instrument: Arc<str>,
    /// Price × 100.
    pub price: i64,
    /// Quantity × 100.
    pub quantity: i64,
    /// Book side the update applies to.
    pub side: Side,
}

impl UpdateEvent {
    /// Creates a new update event.
    #[must_use]
    pub fn new(
        timestamp: u64,
        instrument: impl Into<Arc<str>>,
        price: i64,
        quantity: i64,
        side: Side,
    ) -> Self {
        Self {
            timestamp,
            instrument: instrument.into(),
            price,
            quantity,
            side,
        }
    }

    /// Returns true if the update targets the bid side.
    #[inline]
    #[must_use]
    pub fn is_buy(&self) -> bool {
        self.side.is_bid()
    }

    /// Returns true if the update removes a level.
    #[inline]
    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.quantity == 0
    }
}

impl Default for UpdateEvent {
    fn default() -> Self {
        Self {
            timestamp: 0,
            instrument: Arc::from(""),
            price: 0,
            quantity: 0,
            side: Side::Bid,
        }
    }
}
