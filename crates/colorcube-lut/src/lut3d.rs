//! Cubic RGB sample grids.

use colorcube_core::BitDepth;

use crate::{Array, LutError, LutResult};

/// Absolute tolerance for identity detection.
///
/// Fixed regardless of bit depth; see [`Lut3dArray::is_identity`].
const IDENTITY_TOLERANCE: f32 = 1e-4;

/// A cubic grid of RGB samples: the storage behind a 3D LUT.
///
/// Specializes [`Array`] to three dimensions and three channels. Values are
/// stored blue-fastest: for grid coordinates `(r, g, b)` the flat channel-0
/// offset is `((r*len + g)*len + b) * 3`. The ordering determines
/// compatibility with LUT interchange formats and is part of the contract.
///
/// # Example
///
/// ```rust
/// use colorcube_core::BitDepth;
/// use colorcube_lut::Lut3dArray;
///
/// let mut lut = Lut3dArray::new(17, BitDepth::F32).unwrap();
/// assert!(lut.is_identity(BitDepth::F32));
///
/// lut.set_rgb(0, 0, 0, [0.1, 0.0, 0.0]);
/// assert!(!lut.is_identity(BitDepth::F32));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Lut3dArray {
    array: Array,
}

impl Lut3dArray {
    /// Largest supported grid edge length.
    ///
    /// 129 keeps the grid divisible by the mesh sizes used in common LUT
    /// interchange formats.
    pub const MAX_GRID_LENGTH: usize = 129;

    /// Creates an identity grid of the given edge length, with content
    /// scaled to `out_depth`.
    pub fn new(length: usize, out_depth: BitDepth) -> LutResult<Self> {
        let mut lut = Self {
            array: Array::new(0, 3, 3),
        };
        lut.resize(length, 3)?;
        lut.fill(out_depth);
        Ok(lut)
    }

    /// Grid edge length.
    #[inline]
    pub fn length(&self) -> usize {
        self.array.length()
    }

    /// Channels per sample.
    #[inline]
    pub fn channels(&self) -> usize {
        self.array.channels()
    }

    /// Total value count: `length^3 * channels`.
    #[inline]
    pub fn num_values(&self) -> usize {
        self.array.num_values()
    }

    /// The flat value buffer, blue-fastest order.
    #[inline]
    pub fn values(&self) -> &[f32] {
        self.array.values()
    }

    /// Mutable access to the flat value buffer.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [f32] {
        self.array.values_mut()
    }

    /// Reallocates the grid.
    ///
    /// Fails if `length` exceeds [`Self::MAX_GRID_LENGTH`]. Content after a
    /// resize is zeroed; callers must re-fill.
    pub fn resize(&mut self, length: usize, channels: usize) -> LutResult<()> {
        if length > Self::MAX_GRID_LENGTH {
            return Err(LutError::SizeExceeded {
                length,
                max: Self::MAX_GRID_LENGTH,
            });
        }
        self.array.resize(length, channels);
        Ok(())
    }

    /// Checks that the stored content matches the grid's structure.
    pub fn validate(&self) -> LutResult<()> {
        self.array.validate()
    }

    /// Sample spacing of an identity grid at `out_depth`.
    ///
    /// Uses `(length - 1).max(1)` so a one-sample grid is zero-valued
    /// instead of undefined.
    fn identity_step(&self, out_depth: BitDepth) -> f32 {
        let divisions = (self.length().saturating_sub(1)).max(1);
        out_depth.max_value() as f32 / divisions as f32
    }

    /// Overwrites the content with the identity mapping at `out_depth`.
    ///
    /// The value at grid coordinates `(r, g, b)`, channel `c`, is the
    /// coordinate index for `c` times the identity step.
    pub fn fill(&mut self, out_depth: BitDepth) {
        let length = self.length();
        let step = self.identity_step(out_depth);
        let values = self.array.values_mut();

        for r in 0..length {
            for g in 0..length {
                for b in 0..length {
                    let offset = ((r * length + g) * length + b) * 3;
                    values[offset] = r as f32 * step;
                    values[offset + 1] = g as f32 * step;
                    values[offset + 2] = b as f32 * step;
                }
            }
        }
    }

    /// True if every sample matches the identity mapping at `out_depth`
    /// within a fixed absolute tolerance of 1e-4.
    ///
    /// The tolerance does not scale with the depth's value range.
    pub fn is_identity(&self, out_depth: BitDepth) -> bool {
        let length = self.length();
        let step = self.identity_step(out_depth);
        let values = self.array.values();

        let entries = length * length * length;
        for i in 0..entries {
            let r = (i / (length * length)) % length;
            let g = (i / length) % length;
            let b = i % length;

            if !equal_abs(values[3 * i], r as f32 * step)
                || !equal_abs(values[3 * i + 1], g as f32 * step)
                || !equal_abs(values[3 * i + 2], b as f32 * step)
            {
                return false;
            }
        }
        true
    }

    /// Reads the RGB triplet at grid coordinates `(r, g, b)`.
    #[inline]
    pub fn get_rgb(&self, r: usize, g: usize, b: usize) -> [f32; 3] {
        let length = self.length();
        let offset = ((r * length + g) * length + b) * 3;
        let values = self.array.values();
        [values[offset], values[offset + 1], values[offset + 2]]
    }

    /// Writes the RGB triplet at grid coordinates `(r, g, b)`.
    #[inline]
    pub fn set_rgb(&mut self, r: usize, g: usize, b: usize, rgb: [f32; 3]) {
        let length = self.length();
        let offset = ((r * length + g) * length + b) * 3;
        let values = self.array.values_mut();
        values[offset] = rgb[0];
        values[offset + 1] = rgb[1];
        values[offset + 2] = rgb[2];
    }

    /// Multiplies every value by `factor`.
    ///
    /// A factor of exactly 1.0 leaves the buffer untouched.
    pub fn scale(&mut self, factor: f32) {
        if factor != 1.0 {
            for v in self.array.values_mut() {
                *v *= factor;
            }
        }
    }

    /// Rewrites the grid from a flat buffer in red-fastest channel order.
    ///
    /// Many interchange formats store the red coordinate varying fastest;
    /// internally blue varies fastest. Fails if the buffer length does not
    /// equal `length^3 * 3`.
    pub fn set_from_red_fastest(&mut self, flat: &[f32]) -> LutResult<()> {
        let length = self.length();
        let expected = length * length * length * 3;
        if flat.len() != expected {
            return Err(LutError::SizeMismatch {
                expected,
                actual: flat.len(),
            });
        }

        let values = self.array.values_mut();
        for b in 0..length {
            for g in 0..length {
                for r in 0..length {
                    let blue_fast = 3 * ((r * length + g) * length + b);
                    let red_fast = 3 * ((b * length + g) * length + r);
                    values[blue_fast] = flat[red_fast];
                    values[blue_fast + 1] = flat[red_fast + 1];
                    values[blue_fast + 2] = flat[red_fast + 2];
                }
            }
        }
        Ok(())
    }
}

#[inline]
fn equal_abs(a: f32, b: f32) -> bool {
    (a - b).abs() <= IDENTITY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_identity_fill() {
        for length in [2, 5, 33, 129] {
            let lut = Lut3dArray::new(length, BitDepth::F32).unwrap();
            assert!(lut.is_identity(BitDepth::F32), "length {length}");
            assert_eq!(lut.num_values(), length * length * length * 3);
        }
    }

    #[test]
    fn test_identity_fill_length_one() {
        // A one-sample grid degenerates to all zeros and stays consistent
        // between fill and is_identity.
        let lut = Lut3dArray::new(1, BitDepth::F32).unwrap();
        assert_eq!(lut.values(), &[0.0, 0.0, 0.0]);
        assert!(lut.is_identity(BitDepth::F32));
    }

    #[test]
    fn test_identity_at_integer_depth() {
        let lut = Lut3dArray::new(5, BitDepth::Uint10).unwrap();
        assert!(lut.is_identity(BitDepth::Uint10));
        // Last sample of the red axis reaches the depth maximum.
        assert_abs_diff_eq!(lut.get_rgb(4, 0, 0)[0], 1023.0, epsilon = 1e-4);
        // Content scaled for one depth is not identity at another.
        assert!(!lut.is_identity(BitDepth::F32));
    }

    #[test]
    fn test_resize_rejects_oversize() {
        let mut lut = Lut3dArray::new(2, BitDepth::F32).unwrap();
        assert!(matches!(
            lut.resize(130, 3),
            Err(LutError::SizeExceeded { length: 130, .. })
        ));
        assert!(lut.resize(129, 3).is_ok());
        assert!(Lut3dArray::new(130, BitDepth::F32).is_err());
    }

    #[test]
    fn test_blue_fastest_offsets() {
        let mut lut = Lut3dArray::new(3, BitDepth::F32).unwrap();
        lut.set_rgb(1, 2, 0, [0.1, 0.2, 0.3]);
        let offset = ((1 * 3 + 2) * 3 + 0) * 3;
        assert_eq!(lut.values()[offset], 0.1);
        assert_eq!(lut.values()[offset + 1], 0.2);
        assert_eq!(lut.values()[offset + 2], 0.3);
        assert_eq!(lut.get_rgb(1, 2, 0), [0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_scale_one_is_bitwise_noop() {
        let mut lut = Lut3dArray::new(4, BitDepth::F32).unwrap();
        let before = lut.values().to_vec();
        lut.scale(1.0);
        assert_eq!(lut.values(), &before[..]);
    }

    #[test]
    fn test_scale_multiplies() {
        let mut lut = Lut3dArray::new(4, BitDepth::F32).unwrap();
        let before = lut.values().to_vec();
        lut.scale(2.5);
        for (a, b) in lut.values().iter().zip(&before) {
            assert_eq!(*a, b * 2.5);
        }
    }

    #[test]
    fn test_red_fastest_import() {
        let length = 3usize;
        let mut flat = vec![0.0f32; length * length * length * 3];
        // Mark the sample at (r=2, g=1, b=0) in red-fastest order.
        let red_fast = 3 * ((0 * length + 1) * length + 2);
        flat[red_fast] = 0.9;
        flat[red_fast + 1] = 0.8;
        flat[red_fast + 2] = 0.7;

        let mut lut = Lut3dArray::new(length, BitDepth::F32).unwrap();
        lut.set_from_red_fastest(&flat).unwrap();
        assert_eq!(lut.get_rgb(2, 1, 0), [0.9, 0.8, 0.7]);
    }

    #[test]
    fn test_red_fastest_import_rejects_bad_size() {
        let mut lut = Lut3dArray::new(3, BitDepth::F32).unwrap();
        let flat = vec![0.0f32; 10];
        assert!(matches!(
            lut.set_from_red_fastest(&flat),
            Err(LutError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_identity_tolerance_boundary() {
        let mut lut = Lut3dArray::new(2, BitDepth::F32).unwrap();
        let v = lut.values()[0];
        lut.values_mut()[0] = v + 9e-5;
        assert!(lut.is_identity(BitDepth::F32));
        lut.values_mut()[0] = v + 2e-4;
        assert!(!lut.is_identity(BitDepth::F32));
    }
}
