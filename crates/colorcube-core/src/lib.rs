//! # colorcube-core
//!
//! Core types shared across the colorcube color-transform pipeline.
//!
//! This crate holds the primitives that every transform node needs but that
//! belong to no node in particular:
//!
//! - [`BitDepth`] - the nominal precision of a transform side, and the
//!   maximum representable value used for content scaling
//! - [`FormatMetadata`] - descriptive name + free-form child elements
//!   carried alongside transform data
//!
//! # Example
//!
//! ```rust
//! use colorcube_core::BitDepth;
//!
//! assert_eq!(BitDepth::Uint10.max_value(), 1023.0);
//! assert_eq!(BitDepth::F32.max_value(), 1.0);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod depth;
mod error;
mod metadata;

pub use depth::BitDepth;
pub use error::{CoreError, CoreResult};
pub use metadata::{FormatMetadata, MetadataElement};
