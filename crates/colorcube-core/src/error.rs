//! Core error types.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the core types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A bit-depth token could not be parsed.
    #[error("unknown bit depth: {0}")]
    UnknownBitDepth(String),
}
