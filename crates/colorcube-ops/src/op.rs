//! The transform-node capability interface.

use std::fmt;

use colorcube_core::{BitDepth, FormatMetadata};

use crate::OpsResult;

/// Whether a node represents the original transform or its functional
/// inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// The original transform.
    #[default]
    Forward,
    /// The functional inverse of the original transform.
    Inverse,
}

impl Direction {
    /// The other direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Forward => Direction::Inverse,
            Direction::Inverse => Direction::Forward,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Forward => "forward",
            Direction::Inverse => "inverse",
        };
        f.write_str(s)
    }
}

/// Capability interface shared by the transform-node kinds.
///
/// Pipeline-level code (optimization passes, serialization) depends on this
/// interface rather than on concrete node types.
pub trait Op {
    /// Checks the node's configuration and content; a node that fails
    /// validation must not be evaluated or composed.
    fn validate(&self) -> OpsResult<()>;

    /// Nominal depth of the input side.
    fn input_bit_depth(&self) -> BitDepth;

    /// Nominal depth of the output side.
    fn output_bit_depth(&self) -> BitDepth;

    /// Descriptive metadata carried by the node.
    fn format_metadata(&self) -> &FormatMetadata;

    /// True if evaluating the node can be skipped entirely.
    fn is_noop(&self) -> bool;

    /// True if the node's content is equivalent to an identity mapping at
    /// its current output depth.
    ///
    /// Distinct from [`is_noop`](Op::is_noop): an identity-valued node may
    /// still constrain its domain when evaluated.
    fn is_identity(&self) -> bool;
}
