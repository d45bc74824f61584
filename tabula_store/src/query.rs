// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only queries over the table store.
//!
//! All queries default to the active table and never fail hard: unknown
//! ids return `None`, spatial queries return empty vectors. Boundaries are
//! inclusive — a query rectangle that merely touches a piece's bounds (a
//! shared pixel) intersects it, matching how snapped pieces sit flush
//! against each other.

use kurbo::{Point, Rect};
use tabula_model::{Layer, Piece, PieceId, Setup};

use crate::table::{TableNo, TableStore};

/// Whether two rectangles overlap, edges included.
///
/// Two rects that share an edge or a corner count as overlapping; a rect
/// one pixel away does not.
pub fn overlaps_inclusive(a: &Rect, b: &Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

/// Whether `inner` lies fully inside `outer`, edges included.
pub fn contains_inclusive(outer: &Rect, inner: &Rect) -> bool {
    inner.x0 >= outer.x0 && inner.x1 <= outer.x1 && inner.y0 >= outer.y0 && inner.y1 <= outer.y1
}

fn layer_matches(piece: &Piece, layer: Option<Layer>) -> bool {
    layer.is_none_or(|l| piece.layer == l)
}

/// # Query layer
///
/// Read-only lookups over one table; see the crate docs for the tolerance
/// and boundary rules.
impl TableStore {
    /// Find a piece by id, or `None`.
    pub fn piece_by_id(&self, id: &PieceId, no: Option<TableNo>) -> Option<&Piece> {
        self.table(no).iter().find(|p| &p.id == id)
    }

    /// All pieces whose (rotated) bounds intersect `rect`, boundary
    /// inclusive, optionally restricted to one layer.
    pub fn pieces_within(
        &self,
        rect: Rect,
        layer: Option<Layer>,
        no: Option<TableNo>,
    ) -> Vec<&Piece> {
        self.table(no)
            .iter()
            .filter(|p| layer_matches(p, layer) && overlaps_inclusive(&p.bounds(), &rect))
            .collect()
    }

    /// The stricter variant of [`pieces_within`](Self::pieces_within):
    /// only pieces fully inside `rect`.
    pub fn pieces_contained(
        &self,
        rect: Rect,
        layer: Option<Layer>,
        no: Option<TableNo>,
    ) -> Vec<&Piece> {
        self.table(no)
            .iter()
            .filter(|p| layer_matches(p, layer) && contains_inclusive(&rect, &p.bounds()))
            .collect()
    }

    /// All pieces whose computed expiry lies in the past at `now_ms`.
    pub fn expired_pieces(&self, now_ms: u64, no: Option<TableNo>) -> Vec<&Piece> {
        self.table(no)
            .iter()
            .filter(|p| p.meta.expires_at.is_some_and(|t| t < now_ms))
            .collect()
    }

    /// Lowest z among pieces of `layer`, optionally restricted to those
    /// intersecting `area`. Returns 0 when no piece matches, keeping
    /// "next z" arithmetic simple for empty layers.
    pub fn min_z(&self, layer: Layer, area: Option<Rect>, no: Option<TableNo>) -> i64 {
        self.z_extent(layer, area, no, i64::min)
    }

    /// Highest z among pieces of `layer`, optionally restricted to those
    /// intersecting `area`. Returns 0 when no piece matches.
    pub fn max_z(&self, layer: Layer, area: Option<Rect>, no: Option<TableNo>) -> i64 {
        self.z_extent(layer, area, no, i64::max)
    }

    fn z_extent(
        &self,
        layer: Layer,
        area: Option<Rect>,
        no: Option<TableNo>,
        pick: fn(i64, i64) -> i64,
    ) -> i64 {
        self.table(no)
            .iter()
            .filter(|p| {
                p.layer == layer && area.is_none_or(|a| overlaps_inclusive(&p.bounds(), &a))
            })
            .map(|p| p.z)
            .reduce(pick)
            .unwrap_or(0)
    }

    /// The tightest rectangle covering every piece on a table; the
    /// all-zero rect for an empty table.
    pub fn content_rect(&self, no: Option<TableNo>) -> Rect {
        self.table(no)
            .iter()
            .map(Piece::bounds)
            .reduce(|acc, b| acc.union(b))
            .unwrap_or(Rect::ZERO)
    }

    /// The center of a table's content, falling back to the geometric
    /// table center when the table is empty.
    pub fn content_center(&self, setup: &Setup, no: Option<TableNo>) -> Point {
        if self.table(no).is_empty() {
            let (w, h) = setup.table_size_px();
            Point::new(w as f64 / 2.0, h as f64 / 2.0)
        } else {
            self.content_rect(no).center()
        }
    }
}
