//! Error types for payload decoding

use thiserror::Error;

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Payload decoding error types
///
/// All of these are recoverable at the extraction call site: the
/// affected payload stays undecoded and processing continues.
#[derive(Error, Debug)]
pub enum CodecError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload too short for the operation
    #[error("Truncated payload: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// No decoder registered for the payload's signature
    #[error("Unknown payload signature: {0:?}")]
    UnknownFormat([u8; 4]),

    /// Decoder rejected the stream
    #[error("Decode failed: {0}")]
    Decode(String),
}
