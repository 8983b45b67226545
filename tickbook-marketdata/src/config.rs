//! Order book configuration.

/// Default maximum number of levels per side.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Default number of best-price samples kept for the average mid.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// What a side does with a zero-quantity update for a price it does not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingLevelPolicy {
    /// Leave the side unchanged.
    #[default]
    Ignore,
    /// Insert a level with zero quantity at the price's sorted position.
    InsertZero,
}

/// Configuration shared by every book a registry creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookConfig {
    /// Maximum number of levels per side.
    pub max_depth: usize,
    /// Number of best-price samples kept for the average mid. Zero is
    /// treated as one.
    pub history_capacity: usize,
    /// Handling of deletes for prices that are not in the book.
    pub missing_level_policy: MissingLevelPolicy,
}

impl BookConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of levels per side.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the number of best-price samples kept.
    #[must_use]
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Sets the handling of deletes for absent prices.
    #[must_use]
    pub fn missing_level_policy(mut self, policy: MissingLevelPolicy) -> Self {
        self.missing_level_policy = policy;
        self
    }
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            missing_level_policy: MissingLevelPolicy::default(),
        }
    }
}
