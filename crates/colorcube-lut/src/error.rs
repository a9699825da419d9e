//! LUT error types.

use thiserror::Error;

/// Result type for LUT storage operations.
pub type LutResult<T> = Result<T, LutError>;

/// Errors raised at the grid/array level.
#[derive(Debug, Error)]
pub enum LutError {
    /// Requested grid edge length exceeds the supported maximum.
    #[error("grid size '{length}' must not be greater than '{max}'")]
    SizeExceeded {
        /// Requested edge length.
        length: usize,
        /// Supported maximum.
        max: usize,
    },

    /// A flat buffer does not match the grid's value count.
    #[error("grid with {expected} values does not match buffer of {actual}")]
    SizeMismatch {
        /// Value count the grid requires.
        expected: usize,
        /// Value count the buffer supplied.
        actual: usize,
    },

    /// Grid content failed validation.
    #[error("malformed grid content: {0}")]
    Malformed(String),
}
