//! Instrument symbol interning.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Maps raw symbol bytes to one canonical shared string per distinct text.
///
/// Lookups borrow the raw bytes, so a hit never allocates. Only the first
/// sighting of a symbol materialises a new string.
#[derive(Debug, Default)]
pub struct SymbolInterner {
    symbols: HashMap<Box<[u8]>, Arc<str>>,
}

impl SymbolInterner {
    /// Creates an empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical string for `raw`, inserting it on first sight.
    ///
    /// # Errors
    /// Returns [`Error::InvalidUtf8`] if `raw` is not valid UTF-8. The offset
    /// is relative to `raw`.
    #[inline]
    pub fn intern(&mut self, raw: &[u8]) -> Result<Arc<str>> {
        if let Some(symbol) = self.symbols.get(raw) {
            return Ok(Arc::clone(symbol));
        }

        let text = std::str::from_utf8(raw).map_err(|e| Error::InvalidUtf8 {
            offset: e.valid_up_to(),
        })?;
        let symbol: Arc<str> = Arc::from(text);
        self.symbols.insert(raw.into(), Arc::clone(&symbol));
        tracing::debug!(symbol = %symbol, "interned new instrument");
        Ok(symbol)
    }

    /// Returns the canonical string for `raw` without inserting.
    #[must_use]
    pub fn get(&self, raw: &[u8]) -> Option<&Arc<str>> {
        self.symbols.get(raw)
    }

    /// Returns the number of distinct symbols seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if no symbol has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
