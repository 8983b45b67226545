//! Error types for TickBook core operations.

use thiserror::Error;

/// Numeric or textual field of an update message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// `t=` unix timestamp.
    Timestamp,
    /// `i=` instrument symbol.
    Instrument,
    /// `p=` price.
    Price,
    /// `q=` quantity.
    Quantity,
    /// `s=` side flag.
    Side,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Timestamp => "timestamp",
            Self::Instrument => "instrument",
            Self::Price => "price",
            Self::Quantity => "quantity",
            Self::Side => "side",
        };
        f.write_str(name)
    }
}

/// Core error type for TickBook decoding.
#[derive(Debug, Error)]
pub enum Error {
    /// A field did not have the expected shape (missing decimal point within
    /// the scan window, or a non-digit where a digit was required).
    #[error("malformed {field} field at offset {offset}")]
    MalformedField {
        /// Field being read.
        field: Field,
        /// Byte offset (within the message) where reading failed.
        offset: usize,
    },

    /// A key marker did not match under strict framing.
    #[error("malformed frame at offset {offset}: expected {expected:?}")]
    MalformedFrame {
        /// Byte offset (within the message) of the mismatch.
        offset: usize,
        /// Marker that was expected at the offset.
        expected: &'static str,
    },

    /// Instrument bytes are not valid UTF-8.
    #[error("invalid UTF-8 in instrument at offset {offset}")]
    InvalidUtf8 {
        /// Byte offset where the instrument starts.
        offset: usize,
    },

    /// The accumulation buffer filled up without a complete message.
    #[error("buffer overflow: {buffered} bytes buffered without a frame (capacity {capacity})")]
    BufferOverflow {
        /// Number of unconsumed bytes held when the overflow was detected.
        buffered: usize,
        /// Buffer capacity in bytes.
        capacity: usize,
    },

    /// The byte source failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a malformed field error.
    #[must_use]
    pub fn malformed_field(field: Field, offset: usize) -> Self {
        Self::MalformedField { field, offset }
    }

    /// Creates a malformed frame error.
    #[must_use]
    pub fn malformed_frame(offset: usize, expected: &'static str) -> Self {
        Self::MalformedFrame { offset, expected }
    }
}

/// Result type alias for TickBook core operations.
pub type Result<T> = std::result::Result<T, Error>;
