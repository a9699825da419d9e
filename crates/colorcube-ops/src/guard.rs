//! Scoped inversion-style override.
//!
//! The fast-inverse builder must evaluate its input with the exact
//! inversion style for the duration of one composition, then hand the node
//! back with whatever quality the caller had configured. The guard captures
//! the prior setting on construction and restores it when dropped, on every
//! exit path.

use std::ops::Deref;

use colorcube_lut::InversionQuality;

use crate::lut3d::Lut3dOp;

/// Forces a LUT's inversion quality to [`InversionQuality::Exact`] for the
/// guard's lifetime.
///
/// Dereferences to the guarded node so read-only consumers can borrow
/// through it.
#[derive(Debug)]
pub struct InversionStyleGuard<'a> {
    lut: &'a mut Lut3dOp,
    saved: InversionQuality,
}

impl<'a> InversionStyleGuard<'a> {
    /// Captures the current quality and forces `Exact`.
    pub fn force_exact(lut: &'a mut Lut3dOp) -> Self {
        let saved = lut.inversion_quality();
        lut.set_inversion_quality(InversionQuality::Exact);
        Self { lut, saved }
    }
}

impl Deref for InversionStyleGuard<'_> {
    type Target = Lut3dOp;

    fn deref(&self) -> &Lut3dOp {
        self.lut
    }
}

impl Drop for InversionStyleGuard<'_> {
    fn drop(&mut self) {
        self.lut.set_inversion_quality(self.saved);
    }
}
