//! Error types for transport operations.

use thiserror::Error;

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// IO error from the underlying stream, including a stream that ends
    /// mid-message.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Message content could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] tickbook_core::Error),

    /// Event cannot be written in the wire format.
    #[error("invalid frame: {message}")]
    InvalidFrame {
        /// Error message.
        message: String,
    },
}

impl TransportError {
    /// Creates an invalid frame error.
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_conversion() {
        let core = tickbook_core::Error::malformed_frame(0, "t=");
        let err = TransportError::from(core);
        assert!(matches!(err, TransportError::Decode(_)));
        assert!(err.to_string().contains("decode error"));
    }

    #[test]
    fn test_invalid_frame_display() {
        let err = TransportError::invalid_frame("trailing bytes");
        assert!(err.to_string().contains("trailing bytes"));
    }
}
