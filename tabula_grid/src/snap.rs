// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Snapping pointer coordinates to grid vertices.
//!
//! Three tilings are supported: the square grid, the pointy-top hex grid
//! (`hex` templates, where the grid size is the flat-to-flat hex width),
//! and the transposed flat-top variant (`hex2` templates). All three share
//! the same [`SnapLevel`] semantics.

use kurbo::Point;
use smallvec::SmallVec;

use crate::round_half_up;

/// √3, used by the hex axial coordinate transforms.
const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Which grid vertices a snap may land on.
///
/// Levels are cumulative: corners imply centers, edge midpoints imply both.
/// [`SnapLevel::Off`] disables snapping entirely but still rounds to whole
/// pixels so repeated application stays idempotent.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SnapLevel {
    /// Cell centers only.
    Center,
    /// Cell centers and cell corners.
    CenterCorner,
    /// Cell centers, corners, and edge midpoints.
    #[default]
    CenterCornerEdge,
    /// No snapping; coordinates are rounded to whole pixels.
    Off,
}

impl SnapLevel {
    /// Map a wire-level level-of-detail number (1–4) to a snap level.
    ///
    /// Out-of-range values fall back to the default level, matching the
    /// tolerant treatment of every other piece of wire data.
    pub fn from_lod(lod: u8) -> Self {
        match lod {
            1 => Self::Center,
            2 => Self::CenterCorner,
            4 => Self::Off,
            _ => Self::CenterCornerEdge,
        }
    }

    /// Whether cell corners are valid snap targets.
    fn corners(self) -> bool {
        matches!(self, Self::CenterCorner | Self::CenterCornerEdge)
    }

    /// Whether edge midpoints are valid snap targets.
    fn edges(self) -> bool {
        matches!(self, Self::CenterCornerEdge)
    }
}

/// Round both coordinates of a point half-up to whole pixels.
fn round_point(p: Point) -> Point {
    Point::new(round_half_up(p.x), round_half_up(p.y))
}

/// Snap one axis to the nearest `offset + k·step`, half-up on ties.
fn snap_axis(v: f64, step: f64, offset: f64) -> f64 {
    round_half_up((v - offset) / step) * step + offset
}

/// Squared distance between two points; snapping only compares, never
/// measures, so the square root is skipped.
fn dist2(a: Point, b: Point) -> f64 {
    let (dx, dy) = (a.x - b.x, a.y - b.y);
    dx * dx + dy * dy
}

/// Pick the candidate nearest to `p`, preferring earlier candidates on
/// exact ties so the choice is deterministic.
fn nearest(p: Point, candidates: &[Point]) -> Point {
    let mut best = candidates[0];
    let mut best_d = dist2(p, best);
    for &c in &candidates[1..] {
        let d = dist2(p, c);
        if d < best_d {
            best = c;
            best_d = d;
        }
    }
    best
}

/// Snap a pixel coordinate to the nearest vertex of a square grid with
/// `cell` pixels per cell.
///
/// At the default level every half-cell point is a valid target, which
/// covers corners, centers, and edge midpoints at once.
///
/// ```
/// use kurbo::Point;
/// use tabula_grid::{SnapLevel, snap_square};
///
/// let snapped = snap_square(Point::new(31.0, -1.0), 64.0, SnapLevel::CenterCornerEdge);
/// assert_eq!((snapped.x, snapped.y), (32.0, 0.0));
/// ```
pub fn snap_square(p: Point, cell: f64, lod: SnapLevel) -> Point {
    let snapped = match lod {
        SnapLevel::Off => return round_point(p),
        SnapLevel::Center => {
            let half = cell / 2.0;
            Point::new(snap_axis(p.x, cell, half), snap_axis(p.y, cell, half))
        }
        SnapLevel::CenterCorner => {
            let half = cell / 2.0;
            let corner = Point::new(snap_axis(p.x, cell, 0.0), snap_axis(p.y, cell, 0.0));
            let center = Point::new(snap_axis(p.x, cell, half), snap_axis(p.y, cell, half));
            nearest(p, &[corner, center])
        }
        SnapLevel::CenterCornerEdge => {
            let half = cell / 2.0;
            Point::new(snap_axis(p.x, half, 0.0), snap_axis(p.y, half, 0.0))
        }
    };
    round_point(snapped)
}

/// Round fractional axial hex coordinates to the containing hex, via cube
/// coordinates (the axis with the largest rounding error is recomputed
/// from the other two).
fn axial_round(q: f64, r: f64) -> (f64, f64) {
    let s = -q - r;
    let (mut rq, mut rr, rs) = (q.round(), r.round(), s.round());
    let (dq, dr, ds) = ((rq - q).abs(), (rr - r).abs(), (rs - s).abs());
    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }
    (rq, rr)
}

/// Snap a pixel coordinate to the nearest vertex of a pointy-top hex grid
/// whose flat-to-flat width is `cell` pixels.
///
/// The snap candidates are the containing hex's center plus, per
/// [`SnapLevel`], its six corners and six edge midpoints. For any point
/// inside a hex those are exactly the nearest lattice vertices, so no
/// neighbor scan is needed.
pub fn snap_hex(p: Point, cell: f64, lod: SnapLevel) -> Point {
    if lod == SnapLevel::Off {
        return round_point(p);
    }

    let size = cell / SQRT_3; // center-to-corner radius
    let q = (SQRT_3 / 3.0 * p.x - p.y / 3.0) / size;
    let r = (2.0 / 3.0 * p.y) / size;
    let (hq, hr) = axial_round(q, r);
    let center = Point::new(cell * (hq + hr / 2.0), 1.5 * size * hr);

    let mut candidates: SmallVec<[Point; 13]> = SmallVec::new();
    candidates.push(center);
    if lod.corners() {
        // Pointy-top corners sit at 60k − 30 degrees, radius `size`.
        for k in 0..6 {
            let a = f64::from(60 * k - 30).to_radians();
            candidates.push(Point::new(
                center.x + size * a.cos(),
                center.y + size * a.sin(),
            ));
        }
    }
    if lod.edges() {
        // Edge midpoints sit at 60k degrees, radius `cell`/2.
        for k in 0..6 {
            let a = f64::from(60 * k).to_radians();
            candidates.push(Point::new(
                center.x + cell / 2.0 * a.cos(),
                center.y + cell / 2.0 * a.sin(),
            ));
        }
    }

    round_point(nearest(p, &candidates))
}

/// Snap a pixel coordinate to the nearest vertex of the transposed
/// (flat-top) hex grid used by the second hex template family.
///
/// The tiling is exactly [`snap_hex`] with the axes swapped.
pub fn snap_hex2(p: Point, cell: f64, lod: SnapLevel) -> Point {
    let t = snap_hex(Point::new(p.y, p.x), cell, lod);
    Point::new(t.y, t.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy(p: Point) -> (f64, f64) {
        (p.x, p.y)
    }

    #[test]
    fn square_snaps_to_nearest_half_cell_vertex() {
        let p = snap_square(Point::new(31.0, -1.0), 64.0, SnapLevel::CenterCornerEdge);
        assert_eq!(xy(p), (32.0, 0.0));
    }

    #[test]
    fn square_center_level_only_hits_centers() {
        let p = snap_square(Point::new(1.0, 1.0), 64.0, SnapLevel::Center);
        assert_eq!(xy(p), (32.0, 32.0));
        let p = snap_square(Point::new(70.0, 70.0), 64.0, SnapLevel::Center);
        assert_eq!(xy(p), (96.0, 96.0));
    }

    #[test]
    fn square_center_corner_level_picks_the_nearer_kind() {
        // (5, 5) is nearer the (0, 0) corner than the (32, 32) center.
        let p = snap_square(Point::new(5.0, 5.0), 64.0, SnapLevel::CenterCorner);
        assert_eq!(xy(p), (0.0, 0.0));
        // (30, 30) is nearer the center.
        let p = snap_square(Point::new(30.0, 30.0), 64.0, SnapLevel::CenterCorner);
        assert_eq!(xy(p), (32.0, 32.0));
        // (16, 0) would be an edge midpoint at the default level; here it
        // must fall back to a corner or center.
        let p = snap_square(Point::new(16.0, 0.0), 64.0, SnapLevel::CenterCorner);
        assert_eq!(xy(p), (0.0, 0.0));
    }

    #[test]
    fn square_off_level_only_rounds() {
        let p = snap_square(Point::new(31.4, -1.5), 64.0, SnapLevel::Off);
        assert_eq!(xy(p), (31.0, -1.0));
    }

    #[test]
    fn square_snapping_is_idempotent() {
        for lod in [
            SnapLevel::Center,
            SnapLevel::CenterCorner,
            SnapLevel::CenterCornerEdge,
            SnapLevel::Off,
        ] {
            let once = snap_square(Point::new(47.3, 81.9), 64.0, lod);
            let twice = snap_square(once, 64.0, lod);
            assert_eq!(xy(once), xy(twice), "level {lod:?} must be idempotent");
        }
    }

    #[test]
    fn hex_snaps_to_the_containing_hex_center() {
        // The hex at axial (1, 0) has its center at (64, 0).
        let p = snap_hex(Point::new(60.0, 3.0), 64.0, SnapLevel::Center);
        assert_eq!(xy(p), (64.0, 0.0));
    }

    #[test]
    fn hex_corner_level_reaches_corners() {
        // Corner 0 of the hex at (64, 0) sits at (96, -18.48).
        let p = snap_hex(Point::new(95.0, -18.0), 64.0, SnapLevel::CenterCorner);
        assert_eq!(xy(p), (96.0, -18.0));
    }

    #[test]
    fn hex_edge_level_reaches_edge_midpoints() {
        // The midpoint of the right edge of the hex at (64, 0) is (96, 0).
        let p = snap_hex(Point::new(94.0, 1.0), 64.0, SnapLevel::CenterCornerEdge);
        assert_eq!(xy(p), (96.0, 0.0));
        // Without edge midpoints the same point goes to the nearest corner.
        let p = snap_hex(Point::new(94.0, 1.0), 64.0, SnapLevel::CenterCorner);
        assert_eq!(xy(p), (96.0, 18.0));
    }

    #[test]
    fn hex_snapping_is_idempotent() {
        let once = snap_hex(Point::new(47.0, 81.0), 64.0, SnapLevel::CenterCornerEdge);
        let twice = snap_hex(once, 64.0, SnapLevel::CenterCornerEdge);
        assert_eq!(xy(once), xy(twice));
    }

    #[test]
    fn hex2_is_the_transposed_tiling() {
        for (x, y) in [(60.0, 3.0), (95.0, -18.0), (10.0, 40.0), (0.0, 0.0)] {
            let a = snap_hex(Point::new(x, y), 64.0, SnapLevel::CenterCornerEdge);
            let b = snap_hex2(Point::new(y, x), 64.0, SnapLevel::CenterCornerEdge);
            assert_eq!((a.x, a.y), (b.y, b.x), "hex2 must mirror hex across x=y");
        }
    }

    #[test]
    fn lod_numbers_map_to_levels() {
        assert_eq!(SnapLevel::from_lod(1), SnapLevel::Center);
        assert_eq!(SnapLevel::from_lod(2), SnapLevel::CenterCorner);
        assert_eq!(SnapLevel::from_lod(3), SnapLevel::CenterCornerEdge);
        assert_eq!(SnapLevel::from_lod(4), SnapLevel::Off);
        assert_eq!(SnapLevel::from_lod(0), SnapLevel::CenterCornerEdge);
        assert_eq!(SnapLevel::from_lod(9), SnapLevel::CenterCornerEdge);
    }
}
