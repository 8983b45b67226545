//! Depth-limited order book management.
//!
//! Each side keeps its levels in a fixed-capacity array sorted best-first.
//! Inserts and deletes shift the tail of the array in place, so an update
//! costs O(depth) and never allocates.

use std::sync::Arc;

use tickbook_core::{Side, UpdateEvent, to_real};

use crate::config::{BookConfig, MissingLevelPolicy};
use crate::error::{BookError, Result};
use crate::history::MidHistory;

/// Price level in order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriceLevel {
    /// Price × 100.
    pub price: i64,
    /// Aggregated quantity × 100.
    pub quantity: i64,
}

/// One side of the order book.
///
/// Levels `0..depth` are sorted best-first: descending prices for bids,
/// ascending for asks. Prices are unique.
#[derive(Debug, Clone)]
pub struct BookSide {
    side: Side,
    levels: Box<[PriceLevel]>,
    depth: usize,
    policy: MissingLevelPolicy,
}

impl BookSide {
    /// Creates an empty side holding at most `capacity` levels.
    #[must_use]
    pub fn new(side: Side, capacity: usize) -> Self {
        Self::with_policy(side, capacity, MissingLevelPolicy::default())
    }

    /// Creates an empty side with an explicit missing-level policy.
    #[must_use]
    pub fn with_policy(side: Side, capacity: usize, policy: MissingLevelPolicy) -> Self {
        Self {
            side,
            levels: vec![PriceLevel::default(); capacity].into_boxed_slice(),
            depth: 0,
            policy,
        }
    }

    /// Index of the first level at which `price` belongs.
    #[inline]
    fn find_index(&self, price: i64) -> usize {
        let live = &self.levels[..self.depth];
        let found = match self.side {
            Side::Bid => live.iter().position(|level| level.price <= price),
            Side::Ask => live.iter().position(|level| level.price >= price),
        };
        found.unwrap_or(self.depth)
    }

    /// Applies a single level update.
    ///
    /// A positive quantity inserts or replaces the level at `price`; a zero
    /// quantity removes it.
    ///
    /// # Arguments
    /// * `price` - Price × 100
    /// * `quantity` - New aggregated quantity × 100
    ///
    /// # Returns
    /// False if the update was a delete of an absent price ignored under
    /// [`MissingLevelPolicy::Ignore`], true otherwise.
    ///
    /// # Errors
    /// Returns [`BookError::CapacityExceeded`] if a new level would not fit.
    /// The side is left unchanged in that case.
    #[inline]
    pub fn apply_update(&mut self, price: i64, quantity: i64) -> Result<bool> {
        let idx = self.find_index(price);

        if idx < self.depth && self.levels[idx].price == price {
            if quantity > 0 {
                self.levels[idx].quantity = quantity;
            } else {
                self.levels.copy_within(idx + 1..self.depth, idx);
                self.depth -= 1;
            }
            return Ok(true);
        }

        if quantity <= 0 && self.policy == MissingLevelPolicy::Ignore {
            return Ok(false);
        }
        if self.depth == self.levels.len() {
            return Err(BookError::capacity_exceeded(
                self.side,
                self.levels.len(),
                price,
            ));
        }

        self.levels.copy_within(idx..self.depth, idx + 1);
        self.levels[idx] = PriceLevel { price, quantity };
        self.depth += 1;
        Ok(true)
    }

    /// Returns the top of book (best level).
    #[inline]
    #[must_use]
    pub fn best(&self) -> Option<&PriceLevel> {
        self.levels().first()
    }

    /// Returns the best price (× 100).
    #[inline]
    #[must_use]
    pub fn best_price(&self) -> Option<i64> {
        self.best().map(|level| level.price)
    }

    /// Returns the quantity at the best price (× 100).
    #[inline]
    #[must_use]
    pub fn best_quantity(&self) -> Option<i64> {
        self.best().map(|level| level.quantity)
    }

    /// Total quantity, in real units, over the best `levels` levels.
    ///
    /// Computed on every call.
    #[must_use]
    pub fn liquidity(&self, levels: usize) -> f64 {
        let total: i64 = self.levels[..levels.min(self.depth)]
            .iter()
            .map(|level| level.quantity)
            .sum();
        to_real(total)
    }

    /// Price at `index`, in real units.
    #[must_use]
    pub fn price_at(&self, index: usize) -> Option<f64> {
        self.levels().get(index).map(|level| to_real(level.price))
    }

    /// Quantity at `index`, in real units.
    #[must_use]
    pub fn quantity_at(&self, index: usize) -> Option<f64> {
        self.levels().get(index).map(|level| to_real(level.quantity))
    }

    /// Occupied levels, best first.
    #[inline]
    #[must_use]
    pub fn levels(&self) -> &[PriceLevel] {
        &self.levels[..self.depth]
    }

    /// Iterates over occupied levels, best first.
    pub fn iter(&self) -> impl Iterator<Item = &PriceLevel> {
        self.levels().iter()
    }

    /// Which side of the book this is.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Returns the number of occupied levels.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the maximum number of levels.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.levels.len()
    }

    /// Returns true if there are no levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.depth == 0
    }

    /// Clears all levels.
    pub fn clear(&mut self) {
        self.depth = 0;
    }
}

/// Order book for one instrument: two sides plus top-of-book statistics.
#[derive(Debug, Clone)]
pub struct OrderBook {
    instrument: Arc<str>,
    bids: BookSide,
    asks: BookSide,
    history: MidHistory,
    last_update_time: u64,
    update_count: u64,
}

impl OrderBook {
    /// Creates an empty book for `instrument`.
    #[must_use]
    pub fn new(instrument: impl Into<Arc<str>>, config: &BookConfig) -> Self {
        Self {
            instrument: instrument.into(),
            bids: BookSide::with_policy(Side::Bid, config.max_depth, config.missing_level_policy),
            asks: BookSide::with_policy(Side::Ask, config.max_depth, config.missing_level_policy),
            history: MidHistory::new(config.history_capacity),
            last_update_time: 0,
            update_count: 0,
        }
    }

    /// Applies a decoded update event.
    ///
    /// # Returns
    /// True if the update moved the combined best and a new sample was added
    /// to the mid history.
    ///
    /// # Errors
    /// Propagates [`BookError::CapacityExceeded`] from the side. Neither the
    /// side nor the history changes in that case.
    pub fn apply_event(&mut self, event: &UpdateEvent) -> Result<bool> {
        let recorded = self.apply(event.side, event.price, event.quantity)?;
        self.last_update_time = event.timestamp;
        Ok(recorded)
    }

    /// Applies a level update to one side and samples the top of book.
    ///
    /// # Errors
    /// Same as [`apply_event`](Self::apply_event).
    pub fn apply(&mut self, side: Side, price: i64, quantity: i64) -> Result<bool> {
        let changed = match side {
            Side::Bid => self.bids.apply_update(price, quantity)?,
            Side::Ask => self.asks.apply_update(price, quantity)?,
        };
        if !changed {
            return Ok(false);
        }
        self.update_count += 1;

        let (Some(bid), Some(ask)) = (self.bids.best_price(), self.asks.best_price()) else {
            return Ok(false);
        };
        let recorded = self.history.record_if_changed(bid, ask);
        if recorded {
            tracing::trace!(instrument = %self.instrument, bid, ask, "top of book changed");
        }
        Ok(recorded)
    }

    /// Returns the mid price in real units.
    #[inline]
    #[must_use]
    pub fn mid(&self) -> Option<f64> {
        match (self.bids.best_price(), self.asks.best_price()) {
            (Some(bid), Some(ask)) => Some((bid + ask) as f64 / 200.0),
            _ => None,
        }
    }

    /// Returns the average mid over the retained top-of-book samples.
    #[inline]
    #[must_use]
    pub fn average_mid(&self) -> Option<f64> {
        self.history.average_mid()
    }

    /// Returns the bid-ask spread in real units.
    #[inline]
    #[must_use]
    pub fn spread(&self) -> Option<f64> {
        match (self.bids.best_price(), self.asks.best_price()) {
            (Some(bid), Some(ask)) => Some(to_real(ask - bid)),
            _ => None,
        }
    }

    /// Returns the best bid price (× 100).
    #[inline]
    #[must_use]
    pub fn best_bid(&self) -> Option<i64> {
        self.bids.best_price()
    }

    /// Returns the best ask price (× 100).
    #[inline]
    #[must_use]
    pub fn best_ask(&self) -> Option<i64> {
        self.asks.best_price()
    }

    /// Returns the requested side.
    #[must_use]
    pub fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    /// Bid side.
    #[must_use]
    pub fn bids(&self) -> &BookSide {
        &self.bids
    }

    /// Ask side.
    #[must_use]
    pub fn asks(&self) -> &BookSide {
        &self.asks
    }

    /// Top-of-book sample history.
    #[must_use]
    pub fn history(&self) -> &MidHistory {
        &self.history
    }

    /// Instrument symbol.
    #[must_use]
    pub fn instrument(&self) -> &Arc<str> {
        &self.instrument
    }

    /// Timestamp of the last applied event.
    #[must_use]
    pub fn last_update_time(&self) -> u64 {
        self.last_update_time
    }

    /// Number of updates that inserted, replaced or removed a level.
    ///
    /// Ignored deletes of absent prices and rejected updates are not counted.
    #[must_use]
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Snapshot of the derived statistics, with liquidity summed over the
    /// best `levels` levels of each side.
    #[must_use]
    pub fn summary(&self, levels: usize) -> BookSummary {
        BookSummary {
            instrument: Arc::clone(&self.instrument),
            best_bid: self.bids.price_at(0),
            best_ask: self.asks.price_at(0),
            mid: self.mid(),
            average_mid: self.average_mid(),
            bid_liquidity: self.bids.liquidity(levels),
            ask_liquidity: self.asks.liquidity(levels),
        }
    }

    /// Clears the entire book, including its history.
    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.history.clear();
        self.last_update_time = 0;
        self.update_count = 0;
    }
}

/// Point-in-time view of a book's derived statistics, in real units.
#[derive(Debug, Clone, PartialEq)]
pub struct BookSummary {
    /// Instrument symbol.
    pub instrument: Arc<str>,
    /// Best bid price.
    pub best_bid: Option<f64>,
    /// Best ask price.
    pub best_ask: Option<f64>,
    /// Mid price.
    pub mid: Option<f64>,
    /// Average mid over recorded top-of-book changes.
    pub average_mid: Option<f64>,
    /// Summed bid quantity.
    pub bid_liquidity: f64,
    /// Summed ask quantity.
    pub ask_liquidity: f64,
}

impl std::fmt::Display for BookSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = |v: Option<f64>| v.unwrap_or(f64::NAN);
        write!(
            f,
            "OrderBook [{}] Best Buy [{}] Best Sell [{}] Mid [{}] Avg Mid [{}] Buys Liq [{}] Sells Liq [{}].",
            self.instrument,
            value(self.best_bid),
            value(self.best_ask),
            value(self.mid),
            value(self.average_mid),
            self.bid_liquidity,
            self.ask_liquidity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn book() -> OrderBook {
        OrderBook::new("BTC-USD", &BookConfig::new().history_capacity(3))
    }

    fn buy(book: &mut OrderBook, price: i64, quantity: i64) -> bool {
        book.apply(Side::Bid, price, quantity).unwrap()
    }

    fn sell(book: &mut OrderBook, price: i64, quantity: i64) -> bool {
        book.apply(Side::Ask, price, quantity).unwrap()
    }

    fn seeded() -> OrderBook {
        let mut book = book();
        buy(&mut book, 123, 100);
        buy(&mut book, 122, 200);
        buy(&mut book, 121, 300);
        sell(&mut book, 124, 100);
        sell(&mut book, 125, 200);
        book
    }

    fn prices(side: &BookSide) -> Vec<f64> {
        (0..side.depth()).filter_map(|i| side.price_at(i)).collect()
    }

    fn quantities(side: &BookSide) -> Vec<f64> {
        (0..side.depth()).filter_map(|i| side.quantity_at(i)).collect()
    }

    #[test]
    fn test_adds() {
        let book = seeded();
        assert_eq!(prices(book.bids()), vec![1.23, 1.22, 1.21]);
        assert_eq!(quantities(book.bids()), vec![1.0, 2.0, 3.0]);
        assert_eq!(prices(book.asks()), vec![1.24, 1.25]);
        assert_eq!(quantities(book.asks()), vec![1.0, 2.0]);
    }

    #[test]
    fn test_updates() {
        let mut book = seeded();
        buy(&mut book, 122, 300);
        sell(&mut book, 124, 200);
        assert_eq!(prices(book.bids()), vec![1.23, 1.22, 1.21]);
        assert_eq!(quantities(book.bids()), vec![1.0, 3.0, 3.0]);
        assert_eq!(prices(book.asks()), vec![1.24, 1.25]);
        assert_eq!(quantities(book.asks()), vec![2.0, 2.0]);
    }

    #[test]
    fn test_deletes() {
        let mut book = seeded();
        buy(&mut book, 122, 0);
        sell(&mut book, 125, 0);
        assert_eq!(
            book.bids().levels(),
            &[
                PriceLevel {
                    price: 123,
                    quantity: 100
                },
                PriceLevel {
                    price: 121,
                    quantity: 300
                },
            ]
        );
        assert_eq!(prices(book.asks()), vec![1.24]);
        assert_eq!(quantities(book.asks()), vec![1.0]);
    }

    #[test]
    fn test_insert_interior_and_front() {
        let mut side = BookSide::new(Side::Ask, 10);
        side.apply_update(105, 1).unwrap();
        side.apply_update(101, 1).unwrap();
        side.apply_update(103, 1).unwrap();
        let prices: Vec<i64> = side.iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![101, 103, 105]);
        assert_eq!(side.best_price(), Some(101));
        assert_eq!(side.best_quantity(), Some(1));
    }

    #[test]
    fn test_liquidity_sum() {
        let book = seeded();
        assert_eq!(book.side(Side::Bid).liquidity(2), 3.0);
        assert_eq!(book.side(Side::Bid).liquidity(100), 6.0);
        assert_eq!(book.side(Side::Ask).liquidity(3), 3.0);
        assert_eq!(book.side(Side::Ask).liquidity(0), 0.0);
    }

    #[test]
    fn test_big_liquidity_sum() {
        let mut book = book();
        buy(&mut book, 123, 1_000_000_000);
        buy(&mut book, 122, 1_500_000_000);
        buy(&mut book, 121, 2_000_000_000);
        sell(&mut book, 124, 1_000_000_000);
        sell(&mut book, 125, 2_000_000_000);
        assert_eq!(book.bids().liquidity(5), 45_000_000.0);
        assert_eq!(book.asks().liquidity(5), 30_000_000.0);
    }

    #[test]
    fn test_mid() {
        let mut book = book();
        buy(&mut book, 123, 100);
        assert!(book.mid().is_none());
        buy(&mut book, 122, 200);
        buy(&mut book, 121, 300);
        sell(&mut book, 124, 100);
        sell(&mut book, 125, 200);
        assert!((book.mid().unwrap() - 1.235).abs() < EPSILON);
        assert!((book.spread().unwrap() - 0.01).abs() < EPSILON);
    }

    #[test]
    fn test_average_mid() {
        let mut book = book();
        buy(&mut book, 123, 100);
        assert!(book.average_mid().is_none());

        assert!(sell(&mut book, 125, 100));
        let expected = (1.23 + 1.25) / 2.0;
        assert!((book.average_mid().unwrap() - expected).abs() < EPSILON);

        // Top of book not changed.
        assert!(!buy(&mut book, 122, 200));
        assert!((book.average_mid().unwrap() - expected).abs() < EPSILON);

        sell(&mut book, 124, 100);
        let expected = ((1.23 + 1.25) + (1.23 + 1.24)) / 2.0 / 2.0;
        assert!((book.average_mid().unwrap() - expected).abs() < EPSILON);

        buy(&mut book, 123, 0);
        let expected = ((1.23 + 1.25) + (1.23 + 1.24) + (1.22 + 1.24)) / 3.0 / 2.0;
        assert!((book.average_mid().unwrap() - expected).abs() < EPSILON);

        // Fourth sample overwrites the oldest.
        sell(&mut book, 124, 0);
        let expected = ((1.22 + 1.25) + (1.23 + 1.24) + (1.22 + 1.24)) / 3.0 / 2.0;
        assert!((book.average_mid().unwrap() - expected).abs() < EPSILON);
        assert_eq!(book.history().recorded(), 4);
    }

    #[test]
    fn test_delete_missing_level_ignored() {
        let mut side = BookSide::new(Side::Bid, 4);
        assert!(side.apply_update(100, 5).unwrap());
        assert!(!side.apply_update(99, 0).unwrap());
        assert!(!side.apply_update(101, 0).unwrap());
        assert_eq!(side.depth(), 1);
    }

    #[test]
    fn test_update_count_skips_ignored_deletes() {
        let mut book = book();
        buy(&mut book, 123, 100);
        buy(&mut book, 120, 0);
        assert_eq!(book.update_count(), 1);

        buy(&mut book, 123, 0);
        assert_eq!(book.update_count(), 2);
        assert!(book.bids().is_empty());

        let mut literal = OrderBook::new(
            "BTC-USD",
            &BookConfig::new().missing_level_policy(MissingLevelPolicy::InsertZero),
        );
        literal.apply(Side::Bid, 120, 0).unwrap();
        assert_eq!(literal.update_count(), 1);
    }

    #[test]
    fn test_delete_missing_level_insert_zero() {
        let mut side = BookSide::with_policy(Side::Bid, 4, MissingLevelPolicy::InsertZero);
        side.apply_update(100, 5).unwrap();
        side.apply_update(101, 0).unwrap();
        side.apply_update(99, 0).unwrap();
        let levels: Vec<(i64, i64)> = side.iter().map(|l| (l.price, l.quantity)).collect();
        assert_eq!(levels, vec![(101, 0), (100, 5), (99, 0)]);

        // A second zero at an existing price removes the phantom level.
        side.apply_update(101, 0).unwrap();
        assert_eq!(side.best_price(), Some(100));
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut side = BookSide::new(Side::Ask, 2);
        side.apply_update(100, 1).unwrap();
        side.apply_update(101, 1).unwrap();

        let err = side.apply_update(99, 1).unwrap_err();
        assert_eq!(
            err,
            BookError::CapacityExceeded {
                side: Side::Ask,
                capacity: 2,
                price: 99
            }
        );
        assert_eq!(side.depth(), 2);
        assert_eq!(side.best_price(), Some(100));

        // Updates and deletes of existing levels still succeed when full.
        side.apply_update(101, 7).unwrap();
        side.apply_update(100, 0).unwrap();
        side.apply_update(99, 1).unwrap();
        assert_eq!(side.best_price(), Some(99));
    }

    #[test]
    fn test_capacity_error_leaves_history_untouched() {
        let mut book = OrderBook::new("BTC-USD", &BookConfig::new().max_depth(1));
        buy(&mut book, 100, 1);
        sell(&mut book, 102, 1);
        let recorded = book.history().recorded();

        assert!(book.apply(Side::Bid, 101, 1).is_err());
        assert_eq!(book.best_bid(), Some(100));
        assert_eq!(book.history().recorded(), recorded);
    }

    #[test]
    fn test_sorted_unique_after_every_update() {
        // Deterministic pseudo-random walk over a narrow price band.
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        for side in [Side::Bid, Side::Ask] {
            let mut book_side = BookSide::new(side, 100);
            for _ in 0..5_000 {
                let price = 1_000 + (next() % 60) as i64;
                let quantity = if next() % 3 == 0 { 0 } else { (next() % 500) as i64 };
                book_side.apply_update(price, quantity).unwrap();

                let levels = book_side.levels();
                assert!(levels.iter().all(|l| l.quantity > 0));
                for pair in levels.windows(2) {
                    match side {
                        Side::Bid => assert!(pair[0].price > pair[1].price),
                        Side::Ask => assert!(pair[0].price < pair[1].price),
                    }
                }
            }
        }
    }

    #[test]
    fn test_apply_event_tracks_time() {
        let mut book = book();
        let event = UpdateEvent::new(1_638_848_595, "BTC-USD", 123, 100, Side::Bid);
        assert!(!book.apply_event(&event).unwrap());
        assert_eq!(book.last_update_time(), 1_638_848_595);
        assert_eq!(book.update_count(), 1);
    }

    #[test]
    fn test_summary_display() {
        let book = seeded();
        let summary = book.summary(100);
        assert_eq!(summary.best_bid, Some(1.23));
        assert_eq!(summary.best_ask, Some(1.24));
        assert_eq!(summary.bid_liquidity, 6.0);
        assert_eq!(summary.ask_liquidity, 3.0);

        let line = summary.to_string();
        assert!(line.starts_with("OrderBook [BTC-USD] Best Buy [1.23] Best Sell [1.24]"));
        assert!(line.contains("Buys Liq [6]"));

        let empty = book_summary_of_empty();
        assert!(empty.to_string().contains("Mid [NaN]"));
    }

    fn book_summary_of_empty() -> BookSummary {
        book().summary(10)
    }

    #[test]
    fn test_clear() {
        let mut book = seeded();
        book.clear();
        assert!(book.bids().is_empty());
        assert!(book.asks().is_empty());
        assert!(book.average_mid().is_none());
    }
}
