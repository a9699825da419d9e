//! Range node: clamp and linear remap.
//!
//! The simplest transform node: a per-channel `scale * v + offset` remap
//! with clamping to the output bounds. An identity-content 3D LUT reduces
//! to one of these, since the LUT still clamps its domain.

use colorcube_core::{BitDepth, FormatMetadata};

use crate::op::Op;
use crate::{OpsError, OpsResult};

/// A clamp/remap node spanning `[min_in, max_in] -> [min_out, max_out]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeOp {
    input_depth: BitDepth,
    output_depth: BitDepth,
    metadata: FormatMetadata,
    min_in: f64,
    max_in: f64,
    min_out: f64,
    max_out: f64,
}

impl RangeOp {
    /// Creates a range node with explicit bounds.
    pub fn new(
        input_depth: BitDepth,
        output_depth: BitDepth,
        metadata: FormatMetadata,
        min_in: f64,
        max_in: f64,
        min_out: f64,
        max_out: f64,
    ) -> Self {
        Self {
            input_depth,
            output_depth,
            metadata,
            min_in,
            max_in,
            min_out,
            max_out,
        }
    }

    /// Input-side bounds.
    pub fn input_bounds(&self) -> (f64, f64) {
        (self.min_in, self.max_in)
    }

    /// Output-side bounds.
    pub fn output_bounds(&self) -> (f64, f64) {
        (self.min_out, self.max_out)
    }

    /// Scale factor of the linear remap.
    pub fn scale(&self) -> f64 {
        let in_range = self.max_in - self.min_in;
        if in_range.abs() < 1e-12 {
            1.0
        } else {
            (self.max_out - self.min_out) / in_range
        }
    }

    /// Offset of the linear remap.
    pub fn offset(&self) -> f64 {
        self.min_out - self.min_in * self.scale()
    }

    /// Applies the remap and clamp to one RGB triplet.
    ///
    /// NaN input becomes the lower output bound.
    pub fn apply(&self, rgb: &mut [f32; 3]) {
        let scale = self.scale() as f32;
        let offset = self.offset() as f32;
        let lower = self.min_out as f32;
        let upper = self.max_out as f32;

        for c in rgb.iter_mut() {
            let v = *c * scale + offset;
            *c = if v.is_nan() {
                lower
            } else {
                v.clamp(lower, upper)
            };
        }
    }
}

impl Op for RangeOp {
    fn validate(&self) -> OpsResult<()> {
        if self.max_in <= self.min_in || self.max_out <= self.min_out {
            return Err(OpsError::InvalidOp(
                "range bounds must satisfy min < max".to_string(),
            ));
        }
        Ok(())
    }

    fn input_bit_depth(&self) -> BitDepth {
        self.input_depth
    }

    fn output_bit_depth(&self) -> BitDepth {
        self.output_depth
    }

    fn format_metadata(&self) -> &FormatMetadata {
        &self.metadata
    }

    fn is_noop(&self) -> bool {
        // The clamp always applies.
        false
    }

    fn is_identity(&self) -> bool {
        self.scale() == 1.0 && self.offset() == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_clamp() {
        let range = RangeOp::new(
            BitDepth::F32,
            BitDepth::F32,
            FormatMetadata::default(),
            0.0,
            1.0,
            0.0,
            1.0,
        );
        assert!(range.is_identity());

        let mut rgb = [1.5_f32, -0.2, 0.5];
        range.apply(&mut rgb);
        assert_eq!(rgb, [1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_remap() {
        let range = RangeOp::new(
            BitDepth::F32,
            BitDepth::Uint10,
            FormatMetadata::default(),
            0.0,
            1.0,
            0.0,
            1023.0,
        );
        assert!(!range.is_identity());
        assert_abs_diff_eq!(range.scale(), 1023.0);

        let mut rgb = [0.0_f32, 0.5, 1.0];
        range.apply(&mut rgb);
        assert_abs_diff_eq!(rgb[1], 511.5, epsilon = 1e-3);
        assert_abs_diff_eq!(rgb[2], 1023.0, epsilon = 1e-3);
    }

    #[test]
    fn test_nan_becomes_lower_bound() {
        let range = RangeOp::new(
            BitDepth::F32,
            BitDepth::F32,
            FormatMetadata::default(),
            0.0,
            1.0,
            0.0,
            1.0,
        );
        let mut rgb = [f32::NAN, 0.5, f32::NAN];
        range.apply(&mut rgb);
        assert_eq!(rgb, [0.0, 0.5, 0.0]);
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let range = RangeOp::new(
            BitDepth::F32,
            BitDepth::F32,
            FormatMetadata::default(),
            1.0,
            0.0,
            0.0,
            1.0,
        );
        assert!(matches!(range.validate(), Err(OpsError::InvalidOp(_))));
    }
}
