//! # colorcube-ops
//!
//! LUT transform nodes and their composition algebra.
//!
//! A [`Lut3dOp`] wraps a cubic RGB sample grid together with direction,
//! interpolation request, inversion-quality request, and input/output bit
//! depths. Optimization passes use the algebra on top:
//!
//! - [`compose`] - collapse two LUTs evaluated in sequence into one
//! - [`make_fast_lut3d_from_inverse`] - trade accuracy for speed by
//!   resampling an inverse LUT into a forward-style approximation
//! - [`Lut3dOp::is_inverse`] / equality - cancel adjacent forward/inverse
//!   pairs in a pipeline
//! - [`Lut3dOp::finalize`] - content-derived cache identifiers for
//!   pipeline-level memoization
//!
//! # Example
//!
//! ```rust
//! use colorcube_ops::{compose, Lut3dOp, Op};
//!
//! let mut a = Lut3dOp::new(17).unwrap();
//! let b = Lut3dOp::new(33).unwrap();
//!
//! // a becomes the composition "a then b", sampled on the finer grid.
//! compose(&mut a, &b).unwrap();
//! assert_eq!(a.array().length(), 33);
//! assert!(a.is_identity());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod compose;
mod error;
pub mod guard;
mod lut3d;
mod op;
mod pipeline;
mod range;

pub use compose::{compose, make_fast_lut3d_from_inverse};
pub use error::{OpsError, OpsResult};
pub use guard::InversionStyleGuard;
pub use lut3d::Lut3dOp;
pub use op::{Direction, Op};
pub use range::RangeOp;
