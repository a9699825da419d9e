//! Error types for transform-node operations.

use colorcube_lut::LutError;
use thiserror::Error;

/// Result type for transform-node operations.
pub type OpsResult<T> = Result<T, OpsError>;

/// Errors raised at the node level.
///
/// Grid-level failures ([`LutError`]) pass through unchanged when a node
/// operation hits them directly; failures found while validating a node's
/// grid content are wrapped with call-site context instead.
#[derive(Debug, Error)]
pub enum OpsError {
    /// Grid-level failure surfaced by a node operation.
    #[error(transparent)]
    Lut(#[from] LutError),

    /// Grid content rejected during node validation.
    #[error("LUT content issue: {0}")]
    Content(LutError),

    /// The requested interpolation cannot be validated for this node type.
    #[error("invalid interpolation type")]
    InvalidInterpolation,

    /// The bit depths at the junction of two LUTs do not match.
    #[error("a bit depth mismatch forbids the composition of LUTs")]
    BitDepthMismatch,

    /// Fast inversion was requested for a LUT that is not inverse-direction.
    #[error("fast LUT inversion expects an inverse-direction LUT")]
    NotInverse,

    /// A structural constraint on the node does not hold.
    #[error("invalid operation: {0}")]
    InvalidOp(String),
}
