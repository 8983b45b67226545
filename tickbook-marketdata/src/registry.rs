//! Instrument to order book lookup.

use std::collections::HashMap;
use std::sync::Arc;

use tickbook_core::UpdateEvent;

use crate::book::OrderBook;
use crate::config::BookConfig;
use crate::error::Result;

/// Owns one [`OrderBook`] per instrument symbol.
///
/// Books are created from the registry's [`BookConfig`] the first time an
/// instrument is seen and live until removed or the registry is dropped.
#[derive(Debug, Default)]
pub struct BookRegistry {
    config: BookConfig,
    books: HashMap<Arc<str>, OrderBook>,
}

impl BookRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(config: BookConfig) -> Self {
        Self {
            config,
            books: HashMap::new(),
        }
    }

    /// Returns the configuration used for new books.
    #[must_use]
    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    /// Applies an event to its instrument's book, creating the book first if
    /// needed.
    ///
    /// # Errors
    /// Propagates the book's error. A book created for a rejected update is
    /// kept, empty.
    pub fn apply(&mut self, event: &UpdateEvent) -> Result<&OrderBook> {
        let book = self.book_mut(&event.instrument);
        book.apply_event(event)?;
        Ok(&*book)
    }

    /// Returns the book for `instrument`, creating it if needed.
    pub fn book_mut(&mut self, instrument: &Arc<str>) -> &mut OrderBook {
        let config = &self.config;
        self.books
            .entry(Arc::clone(instrument))
            .or_insert_with(|| {
                tracing::debug!(instrument = %instrument, "creating order book");
                OrderBook::new(Arc::clone(instrument), config)
            })
    }

    /// Gets the book for a symbol.
    #[must_use]
    pub fn get(&self, instrument: &str) -> Option<&OrderBook> {
        self.books.get(instrument)
    }

    /// Removes the book for a symbol.
    pub fn remove(&mut self, instrument: &str) -> Option<OrderBook> {
        self.books.remove(instrument)
    }

    /// Returns all known symbols.
    #[must_use]
    pub fn symbols(&self) -> Vec<Arc<str>> {
        self.books.keys().cloned().collect()
    }

    /// Returns the number of books.
    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Returns true if there are no books.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Iterates over all books.
    pub fn iter(&self) -> impl Iterator<Item = &OrderBook> {
        self.books.values()
    }
}
