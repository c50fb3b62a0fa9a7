//! # Error Types
//!
//! Custom error types for Padlink using `thiserror`.
//!
//! Only the ambient layers (configuration, wire codec, socket I/O) can fail.
//! The capture core absorbs every input anomaly locally and never returns
//! an error.

use thiserror::Error;

/// Main error type for Padlink
#[derive(Debug, Error)]
pub enum PadlinkError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Listener address could not be resolved
    #[error("Invalid listener address: {0}")]
    InvalidAddress(String),

    /// Connection to the remote listener failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// Wire protocol errors (unknown event, bad payload)
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Result type alias for Padlink
pub type Result<T> = std::result::Result<T, PadlinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PadlinkError::InvalidAddress("nowhere:0".to_string());
        assert_eq!(err.to_string(), "Invalid listener address: nowhere:0");

        let err = PadlinkError::Protocol("unknown event 'foo'".to_string());
        assert_eq!(err.to_string(), "Protocol error: unknown event 'foo'");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: PadlinkError = io.into();
        assert!(matches!(err, PadlinkError::Io(_)));
    }
}
