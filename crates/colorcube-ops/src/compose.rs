//! Functional composition of 3D LUT nodes.
//!
//! Composition collapses two LUTs evaluated in sequence into a single LUT,
//! for faster processing of op chains. The result takes the domain of the
//! first node into the range of the second, so every grid point of a chosen
//! domain is rendered through an evaluation chain. A single grid cannot
//! represent the composition of two arbitrary non-linear grids exactly, so
//! the domain is chosen at least as finely sampled as either input.

use tracing::debug;

use colorcube_core::BitDepth;

use crate::guard::InversionStyleGuard;
use crate::lut3d::Lut3dOp;
use crate::op::{Direction, Op};
use crate::pipeline::{eval_chain, EvalOp};
use crate::{OpsError, OpsResult};

/// Edge length of the identity domain resampled through an inverse LUT.
///
/// A tuned trade-off: larger grids track the exact inverse more closely but
/// stretch construction latency.
const FAST_INVERSE_GRID_SIZE: usize = 48;

/// Replaces `a` with a single LUT equivalent to evaluating `a` then `b`.
///
/// The connecting depths must match: `a`'s output depth and `b`'s input
/// depth. The result keeps `a`'s input depth and interpolation request,
/// takes `b`'s output depth, and merges both nodes' metadata.
///
/// Domain selection: when `a`'s grid is at least as finely sampled as
/// `b`'s, `a`'s own range feeds `b` directly; otherwise a finer identity
/// domain at `b`'s edge length is rendered through both nodes, so the
/// result never under-samples relative to either input. Resolution is
/// chosen pairwise; chains of three or more compositions may still
/// accumulate resampling loss.
pub fn compose(a: &mut Lut3dOp, b: &Lut3dOp) -> OpsResult<()> {
    if a.output_bit_depth() != b.input_bit_depth() {
        return Err(OpsError::BitDepthMismatch);
    }

    let n = a.array().length();
    let m = b.array().length();
    debug!(n, m, "composing 3D LUTs");

    let mut ops: Vec<EvalOp> = Vec::new();

    let (domain_values, grid_size) = if n >= m {
        // The range of the first LUT becomes the domain to interpolate in
        // the second.
        ops.push(EvalOp::Scale(1.0 / a.output_bit_depth().max_value()));
        (a.array().values().to_vec(), n)
    } else {
        // The second LUT is more finely sampled: render a finer identity
        // domain through both.
        let domain = Lut3dOp::with_parameters(
            a.input_bit_depth(),
            BitDepth::F32,
            a.format_metadata().clone(),
            a.interpolation(),
            m,
        )?;
        let values = domain.array().values().to_vec();
        ops.push(EvalOp::Lut(a.clone()));
        (values, m)
    };

    ops.push(EvalOp::Lut(b.clone()));
    ops.push(EvalOp::Scale(b.output_bit_depth().max_value()));

    let rendered = eval_chain(&ops, &domain_values)?;

    let mut metadata = a.format_metadata().clone();
    metadata.combine(b.format_metadata());

    let mut composed = Lut3dOp::with_parameters(
        a.input_bit_depth(),
        b.output_bit_depth(),
        metadata,
        a.interpolation(),
        grid_size,
    )?;
    composed.array_mut().values_mut().copy_from_slice(&rendered);

    *a = composed;
    Ok(())
}

/// Builds a forward-style replacement for an inverse LUT.
///
/// Exact inversion is precise but slow to evaluate repeatedly. This
/// renders a fixed-resolution identity domain through the inverse LUT once,
/// producing an ordinary forward LUT that approximates it.
///
/// The input must be inverse-direction. Its inversion style is forced to
/// exact for the duration of the composition and restored on exit: the
/// exact style is what gets sampled, and the override also keeps the fast
/// path from re-entering itself. The domain carries the input LUT's input
/// depth on both sides so scaling inside the composition lines up.
pub fn make_fast_lut3d_from_inverse(lut: &mut Lut3dOp) -> OpsResult<Lut3dOp> {
    if lut.direction() != Direction::Inverse {
        return Err(OpsError::NotInverse);
    }

    let guard = InversionStyleGuard::force_exact(lut);

    debug!(size = FAST_INVERSE_GRID_SIZE, "building fast inverse LUT");

    let mut domain = Lut3dOp::new(FAST_INVERSE_GRID_SIZE)?;
    let depth = guard.input_bit_depth();
    domain.set_input_bit_depth(depth);
    domain.set_output_bit_depth(depth);

    compose(&mut domain, &guard)?;

    Ok(domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use colorcube_core::FormatMetadata;
    use colorcube_lut::{Interpolation, InversionQuality};

    fn named(name: &str, grid_size: usize) -> Lut3dOp {
        let mut metadata = FormatMetadata::new(name);
        metadata.add_child("Description", format!("description of {name}"));
        Lut3dOp::with_parameters(
            BitDepth::F32,
            BitDepth::F32,
            metadata,
            Interpolation::Linear,
            grid_size,
        )
        .unwrap()
    }

    #[test]
    fn test_depth_mismatch_is_rejected() {
        let mut a = Lut3dOp::with_parameters(
            BitDepth::Uint8,
            BitDepth::Uint10,
            FormatMetadata::default(),
            Interpolation::Linear,
            5,
        )
        .unwrap();
        let b = Lut3dOp::new(5).unwrap();
        assert!(matches!(compose(&mut a, &b), Err(OpsError::BitDepthMismatch)));
    }

    #[test]
    fn test_identities_compose_to_identity() {
        let mut a = Lut3dOp::new(5).unwrap();
        let b = Lut3dOp::new(9).unwrap();
        compose(&mut a, &b).unwrap();

        assert_eq!(a.array().length(), 9);
        assert!(a.is_identity());
        assert_eq!(a.input_bit_depth(), BitDepth::F32);
        assert_eq!(a.output_bit_depth(), BitDepth::F32);
    }

    #[test]
    fn test_result_uses_larger_grid() {
        let mut a = Lut3dOp::new(9).unwrap();
        let b = Lut3dOp::new(5).unwrap();
        compose(&mut a, &b).unwrap();
        assert_eq!(a.array().length(), 9);

        let mut a = Lut3dOp::new(5).unwrap();
        let b = Lut3dOp::new(9).unwrap();
        compose(&mut a, &b).unwrap();
        assert_eq!(a.array().length(), 9);
    }

    #[test]
    fn test_gain_through_identity() {
        // a halves, b passes through: the composition halves.
        let mut a = Lut3dOp::new(5).unwrap();
        a.array_mut().scale(0.5);
        let b = Lut3dOp::new(5).unwrap();
        compose(&mut a, &b).unwrap();

        let length = a.array().length();
        let step = 1.0 / (length - 1) as f32;
        for (r, g, b_idx) in [(0, 0, 0), (1, 2, 3), (4, 4, 4), (3, 0, 2)] {
            let rgb = a.array().get_rgb(r, g, b_idx);
            assert_abs_diff_eq!(rgb[0], 0.5 * r as f32 * step, epsilon = 1e-6);
            assert_abs_diff_eq!(rgb[1], 0.5 * g as f32 * step, epsilon = 1e-6);
            assert_abs_diff_eq!(rgb[2], 0.5 * b_idx as f32 * step, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_gains_multiply() {
        // Both nodes halve: the composition quarters.
        let mut a = Lut3dOp::new(5).unwrap();
        a.array_mut().scale(0.5);
        let mut b = Lut3dOp::new(5).unwrap();
        b.array_mut().scale(0.5);
        compose(&mut a, &b).unwrap();

        let rgb = a.array().get_rgb(4, 4, 4);
        assert_abs_diff_eq!(rgb[0], 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(rgb[1], 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(rgb[2], 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_finer_second_lut_resamples_through_first() {
        // a halves on a coarse grid, b is a finer identity: the result is
        // rendered on b's grid and still halves.
        let mut a = Lut3dOp::new(3).unwrap();
        a.array_mut().scale(0.5);
        let b = Lut3dOp::new(5).unwrap();
        compose(&mut a, &b).unwrap();

        assert_eq!(a.array().length(), 5);
        let rgb = a.array().get_rgb(4, 2, 0);
        assert_abs_diff_eq!(rgb[0], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(rgb[1], 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(rgb[2], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_metadata_and_parameters_merge() {
        let mut a = named("lut1", 5);
        a.set_interpolation(Interpolation::Tetrahedral);
        let mut b = named("lut2", 5);
        b.set_output_bit_depth(BitDepth::Uint10);

        let mut composed = a.clone();
        compose(&mut composed, &b).unwrap();

        assert_eq!(composed.name(), "lut1 + lut2");
        let children = composed.format_metadata().children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].value, "description of lut1");
        assert_eq!(children[1].value, "description of lut2");

        // The result keeps a's input depth and interpolation and takes b's
        // output depth.
        assert_eq!(composed.interpolation(), Interpolation::Tetrahedral);
        assert_eq!(composed.input_bit_depth(), BitDepth::F32);
        assert_eq!(composed.output_bit_depth(), BitDepth::Uint10);
        assert_eq!(composed.direction(), Direction::Forward);
    }

    #[test]
    fn test_fast_inverse_rejects_forward_lut() {
        let mut lut = Lut3dOp::new(5).unwrap();
        assert!(matches!(
            make_fast_lut3d_from_inverse(&mut lut),
            Err(OpsError::NotInverse)
        ));
    }

    #[test]
    fn test_fast_inverse_of_identity() {
        let fwd = Lut3dOp::new(17).unwrap();
        let mut inv = fwd.inverse();

        let fast = make_fast_lut3d_from_inverse(&mut inv).unwrap();

        assert_eq!(fast.direction(), Direction::Forward);
        assert_eq!(fast.array().length(), FAST_INVERSE_GRID_SIZE);
        assert!(fast.is_identity());
    }

    #[test]
    fn test_fast_inverse_keeps_depths_and_restores_quality() {
        let fwd = Lut3dOp::with_parameters(
            BitDepth::Uint10,
            BitDepth::Uint12,
            FormatMetadata::default(),
            Interpolation::Linear,
            5,
        )
        .unwrap();
        let mut inv = fwd.inverse();
        inv.set_inversion_quality(InversionQuality::Best);

        let fast = make_fast_lut3d_from_inverse(&mut inv).unwrap();

        assert_eq!(fast.input_bit_depth(), BitDepth::Uint12);
        assert_eq!(fast.output_bit_depth(), BitDepth::Uint10);
        assert_eq!(fast.array().length(), FAST_INVERSE_GRID_SIZE);

        // The scoped override is gone after the call.
        assert_eq!(inv.inversion_quality(), InversionQuality::Best);
    }

    #[test]
    fn test_fast_inverse_recovers_gain() {
        // Forward LUT halves; its fast inverse must double.
        let mut fwd = Lut3dOp::new(9).unwrap();
        fwd.array_mut().scale(0.5);
        let mut inv = fwd.inverse();

        let fast = make_fast_lut3d_from_inverse(&mut inv).unwrap();

        // Sample the fast LUT's grid at a point inside the reachable range:
        // target 0.25 should map back to 0.5.
        let length = fast.array().length();
        let idx = (length - 1) / 2;
        let step = 1.0 / (length - 1) as f32;
        let rgb = fast.array().get_rgb(idx, idx, idx);
        let target = idx as f32 * step;
        assert_abs_diff_eq!(rgb[0], target * 2.0, epsilon = 1e-3);
        assert_abs_diff_eq!(rgb[1], target * 2.0, epsilon = 1e-3);
        assert_abs_diff_eq!(rgb[2], target * 2.0, epsilon = 1e-3);
    }
}
