//! Rolling history of top-of-book prices.

/// Circular buffer of `(best bid, best ask)` samples.
///
/// A sample is taken only when the combined best (`bid + ask`) differs from
/// the last recorded one, so averages over this history are weighted by
/// top-of-book changes rather than by time or update count.
#[derive(Debug, Clone)]
pub struct MidHistory {
    bids: Box<[i64]>,
    asks: Box<[i64]>,
    next_index: u64,
    last_combined: Option<i64>,
}

impl MidHistory {
    /// Creates an empty history holding up to `capacity` samples.
    ///
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            bids: vec![0; capacity].into_boxed_slice(),
            asks: vec![0; capacity].into_boxed_slice(),
            next_index: 0,
            last_combined: None,
        }
    }

    /// Records `(bid, ask)` if their sum differs from the last recorded sum.
    ///
    /// # Returns
    /// True if a sample was written.
    #[inline]
    pub fn record_if_changed(&mut self, bid: i64, ask: i64) -> bool {
        let combined = bid + ask;
        if self.last_combined == Some(combined) {
            return false;
        }
        let slot = (self.next_index % self.bids.len() as u64) as usize;
        self.bids[slot] = bid;
        self.asks[slot] = ask;
        self.next_index += 1;
        self.last_combined = Some(combined);
        true
    }

    /// Average mid price, in real units, over the retained samples.
    ///
    /// Returns `None` before the first sample.
    #[must_use]
    pub fn average_mid(&self) -> Option<f64> {
        let samples = self.len();
        if samples == 0 {
            return None;
        }
        let total: i64 = self.bids[..samples]
            .iter()
            .zip(&self.asks[..samples])
            .map(|(bid, ask)| bid + ask)
            .sum();
        Some(total as f64 / samples as f64 / 200.0)
    }

    /// Returns the maximum number of retained samples.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bids.len()
    }

    /// Returns the number of retained samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.next_index.min(self.bids.len() as u64) as usize
    }

    /// Returns true before the first sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.next_index == 0
    }

    /// Total number of samples ever recorded, including overwritten ones.
    #[must_use]
    pub fn recorded(&self) -> u64 {
        self.next_index
    }

    /// Iterates over retained `(bid, ask)` samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        let capacity = self.bids.len();
        let len = self.len();
        let oldest = if self.next_index as usize > capacity {
            (self.next_index % capacity as u64) as usize
        } else {
            0
        };
        (0..len).map(move |i| {
            let slot = (oldest + i) % capacity;
            (self.bids[slot], self.asks[slot])
        })
    }

    /// Forgets every sample.
    pub fn clear(&mut self) {
        self.next_index = 0;
        self.last_combined = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history() {
        let history = MidHistory::new(3);
        assert!(history.is_empty());
        assert_eq!(history.average_mid(), None);
        assert_eq!(history.iter().count(), 0);
    }

    #[test]
    fn test_records_only_changes() {
        let mut history = MidHistory::new(3);
        assert!(history.record_if_changed(123, 125));
        assert!(!history.record_if_changed(123, 125));
        // Different pair, same sum: not a change by combined best.
        assert!(!history.record_if_changed(124, 124));
        assert!(history.record_if_changed(123, 124));
        assert_eq!(history.len(), 2);
        assert_eq!(history.iter().last(), Some((123, 124)));
    }

    #[test]
    fn test_wraps_and_overwrites_oldest() {
        let mut history = MidHistory::new(2);
        history.record_if_changed(100, 200);
        history.record_if_changed(101, 200);
        history.record_if_changed(102, 200);

        assert_eq!(history.len(), 2);
        assert_eq!(history.recorded(), 3);
        assert_eq!(history.iter().collect::<Vec<_>>(), vec![(101, 200), (102, 200)]);

        let expected = ((101.0 + 200.0) + (102.0 + 200.0)) / 2.0 / 200.0;
        assert!((history.average_mid().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut history = MidHistory::new(0);
        history.record_if_changed(100, 102);
        history.record_if_changed(100, 104);
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.average_mid(), Some(1.02));
    }

    #[test]
    fn test_clear() {
        let mut history = MidHistory::new(2);
        history.record_if_changed(100, 102);
        history.clear();
        assert!(history.is_empty());
        assert!(history.record_if_changed(100, 102));
    }
}
