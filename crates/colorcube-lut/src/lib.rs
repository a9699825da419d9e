//! # colorcube-lut
//!
//! Grid storage and 3D LUT data for color transform pipelines.
//!
//! A 3D LUT maps an input RGB triplet to an output RGB triplet by
//! interpolating over a regular cubic grid of sample points. This crate
//! provides the storage layer:
//!
//! - [`Array`] - flat, channel-interleaved storage for a regular sample grid
//! - [`Lut3dArray`] - the cubic RGB specialization, with identity
//!   generation/detection and bit-depth-aware scaling
//! - [`Interpolation`] / [`InversionQuality`] - the request enums a LUT
//!   node resolves to concrete algorithms
//!
//! Values are stored in blue-fastest order: for grid coordinates
//! `(r, g, b)` the flat channel-0 offset is `((r*len + g)*len + b) * 3`.
//! This matches the channel ordering of the common LUT interchange formats
//! and must not be changed.
//!
//! # Example
//!
//! ```rust
//! use colorcube_core::BitDepth;
//! use colorcube_lut::Lut3dArray;
//!
//! let lut = Lut3dArray::new(33, BitDepth::F32).unwrap();
//! assert!(lut.is_identity(BitDepth::F32));
//! assert_eq!(lut.num_values(), 33 * 33 * 33 * 3);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod array;
mod error;
mod interp;
mod lut3d;

pub use array::Array;
pub use error::{LutError, LutResult};
pub use interp::{Interpolation, InversionQuality};
pub use lut3d::Lut3dArray;
