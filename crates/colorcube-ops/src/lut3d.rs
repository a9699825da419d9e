//! The 3D LUT transform node.

use std::sync::Mutex;

use sha2::{Digest, Sha256};

use colorcube_core::{BitDepth, FormatMetadata};
use colorcube_lut::{Interpolation, InversionQuality, Lut3dArray};

use crate::op::{Direction, Op};
use crate::range::RangeOp;
use crate::{OpsError, OpsResult};

/// A 3D LUT transform node.
///
/// Wraps a [`Lut3dArray`] together with the evaluation-relevant state:
/// direction, interpolation request, inversion-quality request, and the
/// input/output bit depths. The grid stores output-side values, so changing
/// the output depth of a forward node (or the input depth of an inverse
/// node) rescales the content; the opposite side is consumed at float
/// precision and changing it only re-labels the node.
///
/// # Example
///
/// ```rust
/// use colorcube_ops::{Lut3dOp, Op};
///
/// let lut = Lut3dOp::new(33).unwrap();
/// assert!(lut.validate().is_ok());
/// assert!(lut.is_identity());
/// assert!(!lut.is_noop());
/// ```
#[derive(Debug)]
pub struct Lut3dOp {
    input_depth: BitDepth,
    output_depth: BitDepth,
    metadata: FormatMetadata,
    interpolation: Interpolation,
    array: Lut3dArray,
    direction: Direction,
    inversion_quality: InversionQuality,
    cache_id: Mutex<Option<String>>,
}

impl Lut3dOp {
    /// Creates a forward identity LUT of the given edge length at float
    /// depths.
    pub fn new(grid_size: usize) -> OpsResult<Self> {
        Self::with_direction(grid_size, Direction::Forward)
    }

    /// Creates an identity LUT of the given edge length at float depths,
    /// with an explicit direction.
    pub fn with_direction(grid_size: usize, direction: Direction) -> OpsResult<Self> {
        let output_depth = BitDepth::F32;
        Ok(Self {
            input_depth: BitDepth::F32,
            output_depth,
            metadata: FormatMetadata::default(),
            interpolation: Interpolation::Default,
            array: Lut3dArray::new(grid_size, output_depth)?,
            direction,
            inversion_quality: InversionQuality::Fast,
            cache_id: Mutex::new(None),
        })
    }

    /// Creates a fully specified forward identity LUT.
    pub fn with_parameters(
        input_depth: BitDepth,
        output_depth: BitDepth,
        metadata: FormatMetadata,
        interpolation: Interpolation,
        grid_size: usize,
    ) -> OpsResult<Self> {
        Ok(Self {
            input_depth,
            output_depth,
            metadata,
            interpolation,
            array: Lut3dArray::new(grid_size, output_depth)?,
            direction: Direction::Forward,
            inversion_quality: InversionQuality::Fast,
            cache_id: Mutex::new(None),
        })
    }

    /// The sample grid.
    #[inline]
    pub fn array(&self) -> &Lut3dArray {
        &self.array
    }

    /// Mutable access to the sample grid.
    #[inline]
    pub fn array_mut(&mut self) -> &mut Lut3dArray {
        &mut self.array
    }

    /// The node's direction.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The node name, stored in its metadata.
    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    /// Replaces the node name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.metadata.set_name(name);
    }

    /// Mutable access to the metadata.
    pub fn format_metadata_mut(&mut self) -> &mut FormatMetadata {
        &mut self.metadata
    }

    /// The requested interpolation.
    #[inline]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Replaces the interpolation request.
    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    /// Resolves the interpolation request to the algorithm used at
    /// evaluation time.
    ///
    /// `best` and `tetrahedral` evaluate tetrahedrally; everything else
    /// evaluates trilinearly. Cubic has no 3D implementation and `nearest`
    /// is intentionally evaluated as trilinear for this node type, though
    /// invalid requests still fail [`validate`](Self::validate).
    pub fn concrete_interpolation(&self) -> Interpolation {
        match self.interpolation {
            Interpolation::Best | Interpolation::Tetrahedral => Interpolation::Tetrahedral,
            _ => Interpolation::Linear,
        }
    }

    /// The requested inversion quality.
    #[inline]
    pub fn inversion_quality(&self) -> InversionQuality {
        self.inversion_quality
    }

    /// Replaces the inversion-quality request.
    pub fn set_inversion_quality(&mut self, quality: InversionQuality) {
        self.inversion_quality = quality;
    }

    /// Resolves the inversion-quality request to the style used at
    /// evaluation time.
    pub fn concrete_inversion_quality(&self) -> InversionQuality {
        match self.inversion_quality {
            InversionQuality::Exact | InversionQuality::Best => InversionQuality::Exact,
            InversionQuality::Fast | InversionQuality::Default => InversionQuality::Fast,
        }
    }

    /// Sets the output depth, rescaling grid content on a forward node.
    ///
    /// The grid stores output-side values, so a forward node's content is
    /// multiplied by `max(new) / max(old)`. On an inverse node only the
    /// recorded depth changes. The factor is computed from the depth
    /// recorded *before* the update.
    pub fn set_output_bit_depth(&mut self, depth: BitDepth) {
        if self.direction == Direction::Forward {
            let factor = depth.max_value() / self.output_depth.max_value();
            self.array.scale(factor as f32);
        }
        self.output_depth = depth;
    }

    /// Sets the input depth, rescaling grid content on an inverse node.
    ///
    /// An inverse node's grid holds what would be the output of the
    /// original forward mapping, so this mirrors
    /// [`set_output_bit_depth`](Self::set_output_bit_depth).
    pub fn set_input_bit_depth(&mut self, depth: BitDepth) {
        if self.direction == Direction::Inverse {
            let factor = depth.max_value() / self.input_depth.max_value();
            self.array.scale(factor as f32);
        }
        self.input_depth = depth;
    }

    /// Records an output depth without touching grid content.
    pub(crate) fn set_output_bit_depth_raw(&mut self, depth: BitDepth) {
        self.output_depth = depth;
    }

    /// Records an input depth without touching grid content.
    pub(crate) fn set_input_bit_depth_raw(&mut self, depth: BitDepth) {
        self.input_depth = depth;
    }

    /// Rewrites the grid from a flat buffer in red-fastest channel order.
    pub fn set_array_from_red_fastest(&mut self, flat: &[f32]) -> OpsResult<()> {
        self.array.set_from_red_fastest(flat)?;
        Ok(())
    }

    /// The range node this LUT reduces to when its content is identity.
    ///
    /// A 3D LUT clamps its domain even when identity-valued, so the
    /// structural replacement is a clamp spanning the depth maxima.
    pub fn identity_replacement(&self) -> RangeOp {
        RangeOp::new(
            self.input_depth,
            self.output_depth,
            FormatMetadata::default(),
            0.0,
            self.input_depth.max_value(),
            0.0,
            self.output_depth.max_value(),
        )
    }

    /// Returns a node representing the functional inverse of this one.
    ///
    /// The clone's direction flips and its depths swap without any content
    /// rescale; only the labeling of which side is input changes. Metadata
    /// may become stale and is left as-is.
    pub fn inverse(&self) -> Lut3dOp {
        let mut inv = self.clone();
        inv.direction = self.direction.opposite();
        inv.set_input_bit_depth_raw(self.output_depth);
        inv.set_output_bit_depth_raw(self.input_depth);
        inv
    }

    /// True if `fwd`'s output side matches `inv`'s input side.
    ///
    /// When the two sides' maximum representable values match, grid content
    /// compares directly. Otherwise a size check rejects cheaply, then
    /// `fwd` is cloned and rescaled to `inv`'s input depth so content can
    /// be compared proportionally: two LUTs are inverses if their content
    /// is consistent after depth harmonization, not merely if their depth
    /// tags agree.
    pub fn is_inverse_pair(fwd: &Lut3dOp, inv: &Lut3dOp) -> bool {
        if fwd.output_depth.max_value() != inv.input_depth.max_value() {
            if fwd.array.num_values() != inv.array.num_values() {
                return false;
            }
            let mut harmonized = fwd.clone();
            harmonized.set_output_bit_depth(inv.input_depth);
            harmonized.array == inv.array
        } else {
            fwd.array == inv.array
        }
    }

    /// True if this node and `other` form a forward/inverse pair.
    ///
    /// Meaningful only across opposite directions; same-direction
    /// comparisons are always false.
    pub fn is_inverse(&self, other: &Lut3dOp) -> bool {
        match (self.direction, other.direction) {
            (Direction::Forward, Direction::Inverse) => Self::is_inverse_pair(self, other),
            (Direction::Inverse, Direction::Forward) => Self::is_inverse_pair(other, self),
            _ => false,
        }
    }

    /// Validates, then computes and caches the content-derived identifier.
    ///
    /// The identifier is a SHA-256 digest of the raw grid bytes followed by
    /// the interpolation request, direction, and both depths. The
    /// inversion-quality request is excluded, mirroring its exclusion from
    /// equality. Concurrent calls on a shared node serialize on an internal
    /// lock. An invalid node never yields an identifier.
    pub fn finalize(&self) -> OpsResult<String> {
        let mut slot = self.cache_id.lock().unwrap();

        self.validate()?;

        let mut hasher = Sha256::new();
        for v in self.array.values() {
            hasher.update(v.to_le_bytes());
        }

        let id = format!(
            "{} {} {} {} {}",
            hex::encode(hasher.finalize()),
            self.interpolation,
            self.direction,
            self.input_depth,
            self.output_depth
        );
        *slot = Some(id.clone());
        Ok(id)
    }

    /// The identifier computed by the last [`finalize`](Self::finalize)
    /// call, if any.
    ///
    /// Stale after any mutation that affects evaluation semantics until
    /// `finalize` runs again.
    pub fn cache_id(&self) -> Option<String> {
        self.cache_id.lock().unwrap().clone()
    }
}

impl Op for Lut3dOp {
    fn validate(&self) -> OpsResult<()> {
        match self.interpolation {
            Interpolation::Default
            | Interpolation::Linear
            | Interpolation::Nearest
            | Interpolation::Tetrahedral
            | Interpolation::Best => {}
            Interpolation::Cubic | Interpolation::Unknown => {
                return Err(OpsError::InvalidInterpolation);
            }
        }

        self.array.validate().map_err(OpsError::Content)?;

        if self.array.channels() != 3 {
            return Err(OpsError::InvalidOp(
                "3D LUT must have exactly 3 color components".to_string(),
            ));
        }

        // Already enforced by resize; kept as a structural invariant check.
        if self.array.length() > Lut3dArray::MAX_GRID_LENGTH {
            return Err(OpsError::InvalidOp(format!(
                "3D LUT length {} is not supported",
                self.array.length()
            )));
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
        // A 3D LUT clamps to its domain even when identity-valued.
        false
    }

    fn is_identity(&self) -> bool {
        self.array.is_identity(self.output_depth)
    }
}

impl Clone for Lut3dOp {
    fn clone(&self) -> Self {
        Self {
            input_depth: self.input_depth,
            output_depth: self.output_depth,
            metadata: self.metadata.clone(),
            interpolation: self.interpolation,
            array: self.array.clone(),
            direction: self.direction,
            inversion_quality: self.inversion_quality,
            cache_id: Mutex::new(self.cache_id.lock().unwrap().clone()),
        }
    }
}

impl PartialEq for Lut3dOp {
    /// Equality covers the evaluation-relevant state: depths, direction,
    /// interpolation request, and exact grid content. The inversion-quality
    /// request, metadata, and the cached identifier are excluded.
    fn eq(&self, other: &Self) -> bool {
        self.input_depth == other.input_depth
            && self.output_depth == other.output_depth
            && self.direction == other.direction
            && self.interpolation == other.interpolation
            && self.array == other.array
    }
}
