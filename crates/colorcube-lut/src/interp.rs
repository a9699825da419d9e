//! Interpolation and inversion-quality requests.

use std::fmt;

/// Interpolation requested for LUT evaluation.
///
/// This is the *requested* method; a node resolves it to the algorithm
/// actually used at evaluation time. Requests without a 3D implementation
/// (`Cubic`) and the `Unknown` placeholder are rejected by node validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Placeholder for an unrecognized request. Never valid.
    Unknown,

    /// Whatever the node type considers its default.
    #[default]
    Default,

    /// Linear interpolation (trilinear for 3D).
    Linear,

    /// Cubic interpolation. No 3D implementation exists.
    Cubic,

    /// Nearest neighbor.
    Nearest,

    /// Tetrahedral interpolation (3D only).
    ///
    /// Higher quality than trilinear, especially for smooth gradients.
    Tetrahedral,

    /// Best available quality for the node type.
    Best,
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Interpolation::Unknown => "unknown",
            Interpolation::Default => "default",
            Interpolation::Linear => "linear",
            Interpolation::Cubic => "cubic",
            Interpolation::Nearest => "nearest",
            Interpolation::Tetrahedral => "tetrahedral",
            Interpolation::Best => "best",
        };
        f.write_str(s)
    }
}

/// Quality requested when a LUT is evaluated in the inverse direction.
///
/// Exact inversion solves for the pre-image of each sample and is precise
/// but slow; fast inversion evaluates through a resampled forward-style
/// approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InversionQuality {
    /// Whatever the node type considers its default.
    #[default]
    Default,

    /// Approximate but fast repeated evaluation.
    Fast,

    /// Numerically exact per-sample inversion.
    Exact,

    /// Best available quality.
    Best,
}

impl fmt::Display for InversionQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InversionQuality::Default => "default",
            InversionQuality::Fast => "fast",
            InversionQuality::Exact => "exact",
            InversionQuality::Best => "best",
        };
        f.write_str(s)
    }
}
