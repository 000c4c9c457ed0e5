//! Ogg-specific error types.

use thiserror::Error;

/// Errors produced while building Ogg pages or Vorbis streams.
#[derive(Error, Debug)]
pub enum OggError {
    /// A Vorbis header did not match the expected layout.
    #[error("invalid Vorbis header: {0}")]
    InvalidHeader(String),

    /// A writer method was called out of order.
    #[error("invalid writer state: expected {expected}")]
    InvalidState {
        /// The operation the writer was waiting for.
        expected: &'static str,
    },

    /// I/O error from the underlying sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Ogg operations.
pub type Result<T> = std::result::Result<T, OggError>;
