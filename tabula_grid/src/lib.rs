// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid-geometry math for the Tabula tabletop engine.
//!
//! This crate is pure coordinate math with no state: it knows nothing about
//! pieces, tables, or assets. Higher layers use it for two things:
//!
//! - **Snapping** a pointer position to the nearest valid grid vertex, for
//!   the square grid and for the two hex tilings used by the hex template
//!   families ([`snap_square`], [`snap_hex`], [`snap_hex2`]).
//! - **Rotated bounding boxes**: the axis-aligned pixel footprint of a
//!   rotated piece ([`rotated_dimensions`]), which drives spatial queries
//!   and renderer offset correction.
//!
//! All snapping honors a [`SnapLevel`]: centers only, centers + corners,
//! centers + corners + edge midpoints (the default), or no snapping at all
//! (coordinates are still rounded to whole pixels). Rounding ties break
//! half-up everywhere, so snapping an already-snapped point is a no-op.
//!
//! Angles are expected in `[0, 360)`; callers wrap before calling in. This
//! layer has no error paths.

mod rotate;
mod snap;

pub use rotate::rotated_dimensions;
pub use snap::{SnapLevel, snap_hex, snap_hex2, snap_square};

/// Round half-up to the nearest integer, as an `f64`.
///
/// `round_half_up(0.5) == 1.0` and `round_half_up(-0.5) == 0.0`, unlike
/// `f64::round` which rounds halves away from zero. Snapping relies on this
/// tie-break being consistent for positive and negative coordinates.
#[inline]
pub(crate) fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::round_half_up;

    #[test]
    fn half_up_ties() {
        assert_eq!(round_half_up(0.5), 1.0);
        assert_eq!(round_half_up(-0.5), 0.0);
        assert_eq!(round_half_up(-1.5), -1.0);
        assert_eq!(round_half_up(2.4), 2.0);
        assert_eq!(round_half_up(2.6), 3.0);
    }
}
