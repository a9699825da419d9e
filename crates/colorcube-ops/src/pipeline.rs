//! Evaluation chain used by LUT composition.
//!
//! Composition renders every grid point of a domain through a short chain
//! of simple operations: uniform per-channel scales and full LUT
//! evaluations. The chain works on normalized values; the scale steps move
//! content between bit-depth ranges and [0, 1].
//!
//! Forward LUT evaluation interpolates (trilinearly or tetrahedrally) over
//! the grid normalized by the output depth's maximum. Inverse evaluation in
//! the exact style solves `forward(x) = target` per sample with a damped
//! Newton iteration; the fast style evaluates through the resampled
//! forward-style approximation instead.

use colorcube_core::BitDepth;
use colorcube_lut::{Interpolation, InversionQuality, Lut3dArray, LutError};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::trace;

use crate::compose::make_fast_lut3d_from_inverse;
use crate::lut3d::Lut3dOp;
use crate::op::{Direction, Op};
use crate::OpsResult;

const MAX_ITERATIONS: usize = 30;
const TOLERANCE: f32 = 1e-6;
const DAMPING: f32 = 0.8;
const JACOBIAN_DELTA: f32 = 1e-4;

/// One step of an evaluation chain.
#[derive(Debug, Clone)]
pub(crate) enum EvalOp {
    /// Uniform per-channel multiply.
    Scale(f64),
    /// Full LUT evaluation, honoring the node's direction and concrete
    /// interpolation/inversion settings.
    Lut(Lut3dOp),
}

/// Runs `src` through the chain, producing a buffer of equal length.
///
/// `src` is a flat RGB buffer (length divisible by 3).
pub(crate) fn eval_chain(ops: &[EvalOp], src: &[f32]) -> OpsResult<Vec<f32>> {
    trace!(ops = ops.len(), samples = src.len() / 3, "evaluating op chain");

    let mut buf = src.to_vec();
    for op in ops {
        match op {
            EvalOp::Scale(factor) => {
                let factor = *factor as f32;
                for v in buf.iter_mut() {
                    *v *= factor;
                }
            }
            EvalOp::Lut(lut) => apply_lut(lut, &mut buf)?,
        }
    }
    Ok(buf)
}

fn apply_lut(lut: &Lut3dOp, buf: &mut [f32]) -> OpsResult<()> {
    let length = lut.array().length();
    if length < 2 {
        return Err(LutError::Malformed(format!(
            "grid of length {length} is too small to interpolate"
        ))
        .into());
    }

    let interp = lut.concrete_interpolation();
    match lut.direction() {
        Direction::Forward => {
            // The grid stores output-side values at the output depth scale.
            let table = normalized_table(lut.array(), lut.output_bit_depth());
            for_each_rgb(buf, |rgb| {
                let out = eval_forward(&table, length, interp, [rgb[0], rgb[1], rgb[2]]);
                rgb.copy_from_slice(&out);
            });
            Ok(())
        }
        Direction::Inverse => match lut.concrete_inversion_quality() {
            InversionQuality::Exact | InversionQuality::Best => {
                // For an inverse node the stored grid belongs to the
                // original forward mapping, scaled to this node's input
                // depth.
                let table = normalized_table(lut.array(), lut.input_bit_depth());
                for_each_rgb(buf, |rgb| {
                    let out = eval_inverse_exact(&table, length, interp, [rgb[0], rgb[1], rgb[2]]);
                    rgb.copy_from_slice(&out);
                });
                Ok(())
            }
            InversionQuality::Fast | InversionQuality::Default => {
                let mut scratch = lut.clone();
                let fast = make_fast_lut3d_from_inverse(&mut scratch)?;
                apply_lut(&fast, buf)
            }
        },
    }
}

/// Grid values scaled into [0, 1] by the given depth's maximum.
fn normalized_table(array: &Lut3dArray, depth: BitDepth) -> Vec<f32> {
    let factor = (1.0 / depth.max_value()) as f32;
    if factor == 1.0 {
        array.values().to_vec()
    } else {
        array.values().iter().map(|v| v * factor).collect()
    }
}

fn for_each_rgb<F>(buf: &mut [f32], f: F)
where
    F: Fn(&mut [f32]) + Sync + Send,
{
    #[cfg(feature = "parallel")]
    buf.par_chunks_exact_mut(3).for_each(|rgb| f(rgb));

    #[cfg(not(feature = "parallel"))]
    for rgb in buf.chunks_exact_mut(3) {
        f(rgb);
    }
}

#[inline]
fn fetch(table: &[f32], length: usize, r: usize, g: usize, b: usize) -> [f32; 3] {
    // Blue varies fastest, matching the storage convention.
    let offset = ((r * length + g) * length + b) * 3;
    [table[offset], table[offset + 1], table[offset + 2]]
}

fn eval_forward(table: &[f32], length: usize, interp: Interpolation, rgb: [f32; 3]) -> [f32; 3] {
    match interp {
        Interpolation::Tetrahedral => tetrahedral(table, length, rgb),
        _ => trilinear(table, length, rgb),
    }
}

/// Trilinear interpolation over a normalized [0, 1] domain.
fn trilinear(table: &[f32], length: usize, rgb: [f32; 3]) -> [f32; 3] {
    let n = (length - 1) as f32;
    let r = rgb[0].clamp(0.0, 1.0) * n;
    let g = rgb[1].clamp(0.0, 1.0) * n;
    let b = rgb[2].clamp(0.0, 1.0) * n;

    let ri = (r.floor() as usize).min(length - 2);
    let gi = (g.floor() as usize).min(length - 2);
    let bi = (b.floor() as usize).min(length - 2);

    let rf = r - ri as f32;
    let gf = g - gi as f32;
    let bf = b - bi as f32;

    let c000 = fetch(table, length, ri, gi, bi);
    let c100 = fetch(table, length, ri + 1, gi, bi);
    let c010 = fetch(table, length, ri, gi + 1, bi);
    let c110 = fetch(table, length, ri + 1, gi + 1, bi);
    let c001 = fetch(table, length, ri, gi, bi + 1);
    let c101 = fetch(table, length, ri + 1, gi, bi + 1);
    let c011 = fetch(table, length, ri, gi + 1, bi + 1);
    let c111 = fetch(table, length, ri + 1, gi + 1, bi + 1);

    let mut out = [0.0f32; 3];
    for i in 0..3 {
        let c00 = c000[i] * (1.0 - rf) + c100[i] * rf;
        let c01 = c001[i] * (1.0 - rf) + c101[i] * rf;
        let c10 = c010[i] * (1.0 - rf) + c110[i] * rf;
        let c11 = c011[i] * (1.0 - rf) + c111[i] * rf;

        let c0 = c00 * (1.0 - gf) + c10 * gf;
        let c1 = c01 * (1.0 - gf) + c11 * gf;

        out[i] = c0 * (1.0 - bf) + c1 * bf;
    }
    out
}

/// Tetrahedral interpolation over a normalized [0, 1] domain.
fn tetrahedral(table: &[f32], length: usize, rgb: [f32; 3]) -> [f32; 3] {
    let n = (length - 1) as f32;
    let r = rgb[0].clamp(0.0, 1.0) * n;
    let g = rgb[1].clamp(0.0, 1.0) * n;
    let b = rgb[2].clamp(0.0, 1.0) * n;

    let ri = (r.floor() as usize).min(length - 2);
    let gi = (g.floor() as usize).min(length - 2);
    let bi = (b.floor() as usize).min(length - 2);

    let rf = r - ri as f32;
    let gf = g - gi as f32;
    let bf = b - bi as f32;

    let c000 = fetch(table, length, ri, gi, bi);
    let c100 = fetch(table, length, ri + 1, gi, bi);
    let c010 = fetch(table, length, ri, gi + 1, bi);
    let c110 = fetch(table, length, ri + 1, gi + 1, bi);
    let c001 = fetch(table, length, ri, gi, bi + 1);
    let c101 = fetch(table, length, ri + 1, gi, bi + 1);
    let c011 = fetch(table, length, ri, gi + 1, bi + 1);
    let c111 = fetch(table, length, ri + 1, gi + 1, bi + 1);

    let mut out = [0.0f32; 3];
    for i in 0..3 {
        out[i] = if rf > gf {
            if gf > bf {
                c000[i]
                    + rf * (c100[i] - c000[i])
                    + gf * (c110[i] - c100[i])
                    + bf * (c111[i] - c110[i])
            } else if rf > bf {
                c000[i]
                    + rf * (c100[i] - c000[i])
                    + bf * (c101[i] - c100[i])
                    + gf * (c111[i] - c101[i])
            } else {
                c000[i]
                    + bf * (c001[i] - c000[i])
                    + rf * (c101[i] - c001[i])
                    + gf * (c111[i] - c101[i])
            }
        } else if gf > bf {
            if rf > bf {
                c000[i]
                    + gf * (c010[i] - c000[i])
                    + rf * (c110[i] - c010[i])
                    + bf * (c111[i] - c110[i])
            } else {
                c000[i]
                    + gf * (c010[i] - c000[i])
                    + bf * (c011[i] - c010[i])
                    + rf * (c111[i] - c011[i])
            }
        } else {
            c000[i]
                + bf * (c001[i] - c000[i])
                + gf * (c011[i] - c001[i])
                + rf * (c111[i] - c011[i])
        };
    }
    out
}

/// Solves `forward(x) = target` by damped Newton iteration.
///
/// The Jacobian is estimated numerically and the 3x3 update solved by
/// Cramer's rule. Works best for monotonic grids; the result is clamped to
/// the [0, 1] domain at every step.
fn eval_inverse_exact(
    table: &[f32],
    length: usize,
    interp: Interpolation,
    target: [f32; 3],
) -> [f32; 3] {
    let target = [
        target[0].clamp(0.0, 1.0),
        target[1].clamp(0.0, 1.0),
        target[2].clamp(0.0, 1.0),
    ];
    let mut guess = target;

    for _ in 0..MAX_ITERATIONS {
        let eval = eval_forward(table, length, interp, guess);
        let err = [
            eval[0] - target[0],
            eval[1] - target[1],
            eval[2] - target[2],
        ];

        let err_mag = (err[0] * err[0] + err[1] * err[1] + err[2] * err[2]).sqrt();
        if err_mag < TOLERANCE {
            break;
        }

        let mut jacobian = [[0.0f32; 3]; 3];
        for j in 0..3 {
            let mut probe = guess;
            probe[j] = (probe[j] + JACOBIAN_DELTA).min(1.0);
            let eval_probe = eval_forward(table, length, interp, probe);
            for i in 0..3 {
                jacobian[i][j] = (eval_probe[i] - eval[i]) / JACOBIAN_DELTA;
            }
        }

        let dx = solve_3x3(&jacobian, &[-err[0], -err[1], -err[2]]);
        guess[0] = (guess[0] + DAMPING * dx[0]).clamp(0.0, 1.0);
        guess[1] = (guess[1] + DAMPING * dx[1]).clamp(0.0, 1.0);
        guess[2] = (guess[2] + DAMPING * dx[2]).clamp(0.0, 1.0);
    }

    guess
}

/// Solves the 3x3 linear system `Ax = b` by Cramer's rule.
fn solve_3x3(a: &[[f32; 3]; 3], b: &[f32; 3]) -> [f32; 3] {
    let det = a[0][0] * (a[1][1] * a[2][2] - a[1][2] * a[2][1])
        - a[0][1] * (a[1][0] * a[2][2] - a[1][2] * a[2][0])
        + a[0][2] * (a[1][0] * a[2][1] - a[1][1] * a[2][0]);

    if det.abs() < 1e-10 {
        return [0.0, 0.0, 0.0];
    }

    let det_x = b[0] * (a[1][1] * a[2][2] - a[1][2] * a[2][1])
        - a[0][1] * (b[1] * a[2][2] - a[1][2] * b[2])
        + a[0][2] * (b[1] * a[2][1] - a[1][1] * b[2]);

    let det_y = a[0][0] * (b[1] * a[2][2] - a[1][2] * b[2])
        - b[0] * (a[1][0] * a[2][2] - a[1][2] * a[2][0])
        + a[0][2] * (a[1][0] * b[2] - b[1] * a[2][0]);

    let det_z = a[0][0] * (a[1][1] * b[2] - b[1] * a[2][1])
        - a[0][1] * (a[1][0] * b[2] - b[1] * a[2][0])
        + b[0] * (a[1][0] * a[2][1] - a[1][1] * a[2][0]);

    [det_x / det, det_y / det, det_z / det]
}
