//! Error types for RADP

use thiserror::Error;

/// Result type alias for RADP operations
pub type Result<T> = std::result::Result<T, RadpError>;

/// Main error type for RADP
#[derive(Error, Debug)]
pub enum RadpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Configuration error: {0}")]
    Config(String),
}
