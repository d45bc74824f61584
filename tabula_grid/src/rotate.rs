// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned bounding boxes of rotated rectangles.

use crate::round_half_up;

/// The axis-aligned bounding box of a `w`×`h` rectangle rotated about its
/// center by `deg` degrees, in integer pixels.
///
/// Quarter turns are exact: 0° and 180° return `(w, h)`, 90° and 270°
/// return `(h, w)`. Any other angle uses the standard
/// `|w·cosθ| + |h·sinθ|` projection, rounded half-up per axis.
///
/// ```
/// use tabula_grid::rotated_dimensions;
///
/// assert_eq!(rotated_dimensions(256, 128, 0), (256, 128));
/// assert_eq!(rotated_dimensions(256, 128, 90), (128, 256));
/// assert_eq!(rotated_dimensions(256, 128, 60), (239, 286));
/// ```
#[allow(
    clippy::cast_possible_truncation,
    reason = "Pixel dimensions fit in i64 by a wide margin; the f64 values are already rounded."
)]
pub fn rotated_dimensions(w: i64, h: i64, deg: u16) -> (i64, i64) {
    match deg % 360 {
        0 | 180 => (w, h),
        90 | 270 => (h, w),
        d => {
            let theta = f64::from(d).to_radians();
            let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
            let (w, h) = (w as f64, h as f64);
            (
                round_half_up(w * cos + h * sin) as i64,
                round_half_up(w * sin + h * cos) as i64,
            )
        }
    }
}
