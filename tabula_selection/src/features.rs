// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Derived selection state: capability features, combined bounds, and
//! z-stacking probes.
//!
//! Capability semantics follow a strict split. Actions gated by a
//! protection flag (clone, delete, move — and piling, which is moving)
//! are available when **at least one** selected piece permits them: a
//! locked tile in the selection must not freeze every other piece.
//! Cosmetic actions applied uniformly (color, border, number, rotate)
//! require **all** selected pieces to support them: one non-conforming
//! piece disables the whole group.

use kurbo::{Point, Rect};
use tabula_model::{Feature, Layer, Piece, PieceFlags};
use tabula_store::{TableStore, overlaps_inclusive};

use crate::Selection;

/// Pixel-space bounding box of a selection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionBounds {
    /// Left edge.
    pub left: i64,
    /// Top edge.
    pub top: i64,
    /// Right edge.
    pub right: i64,
    /// Bottom edge.
    pub bottom: i64,
    /// Width.
    pub w: i64,
    /// Height.
    pub h: i64,
    /// Center point.
    pub center: Point,
}

impl SelectionBounds {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Pixel coordinates fit in i64; floor/ceil have already produced integral values."
    )]
    fn from_rect(rect: Rect) -> Self {
        let (left, top) = (rect.x0.floor() as i64, rect.y0.floor() as i64);
        let (right, bottom) = (rect.x1.ceil() as i64, rect.y1.ceil() as i64);
        Self {
            left,
            top,
            right,
            bottom,
            w: right - left,
            h: bottom - top,
            center: rect.center(),
        }
    }
}

/// What the current selection is capable of.
///
/// An empty selection yields the all-false default with a zero-sized
/// bounding box at the origin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionFeatures {
    /// Exactly one piece is selected, so its properties can be edited.
    pub edit: bool,
    /// Every selected piece can rotate.
    pub rotate: bool,
    /// At least one selected piece has a second side to flip to.
    pub flip: bool,
    /// At least one selected piece is meaningfully randomizable.
    pub random: bool,
    /// At least one selected piece can be raised to the top of its layer.
    pub top: bool,
    /// At least one selected piece can be sent to the bottom of its layer.
    pub bottom: bool,
    /// At least one selected piece can be cloned.
    pub clone: bool,
    /// At least one selected piece can be deleted.
    pub delete: bool,
    /// Every selected piece takes a fill color.
    pub color: bool,
    /// Every selected piece takes a border color.
    pub border: bool,
    /// Every selected piece carries a token letter/number.
    pub number: bool,
    /// More than one selected piece is movable, so they can be piled.
    pub pile: bool,
    /// Combined pixel bounding box of the selection.
    pub bounds: SelectionBounds,
}

/// Per-layer z values from a stacking probe; untouched layers read 0.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ZByLayer([i64; Layer::COUNT]);

impl ZByLayer {
    /// The probed z for `layer` (0 when nothing intersected it).
    pub fn get(&self, layer: Layer) -> i64 {
        self.0[layer.index()]
    }
}

fn supports_rotate(piece: &Piece) -> bool {
    piece.layer != Layer::Other && piece.meta.feature != Some(Feature::Pointer)
}

impl Selection {
    /// Compute the capability record and bounding box of the current
    /// selection on the active table.
    pub fn features(&self, store: &TableStore) -> SelectionFeatures {
        let pieces = self.selected_pieces(store, None);
        let Some(first) = pieces.first() else {
            return SelectionFeatures::default();
        };

        let mut movable = 0_usize;
        let (mut clone, mut delete, mut flip, mut random) = (false, false, false, false);
        let (mut rotate, mut color, mut border, mut number) = (true, true, true, true);
        let mut union = first.bounds();

        for p in &pieces {
            union = union.union(p.bounds());
            if p.is_movable() {
                movable += 1;
            }
            clone |= !p.flags.contains(PieceFlags::NO_CLONE);
            delete |= !p.flags.contains(PieceFlags::NO_DELETE);
            flip |= p.meta.sides > 1;
            random |= p.meta.sides > 2
                || matches!(p.meta.feature, Some(Feature::Dicemat | Feature::Discard));
            rotate &= supports_rotate(p);
            color &= p.meta.has_color;
            border &= p.meta.has_border;
            number &= p.layer == Layer::Token;
        }

        SelectionFeatures {
            edit: pieces.len() == 1,
            rotate,
            flip,
            random,
            top: movable >= 1,
            bottom: movable >= 1,
            clone,
            delete,
            color,
            border,
            number,
            pile: movable > 1,
            bounds: SelectionBounds::from_rect(union),
        }
    }

    /// Highest z per layer among *unselected* pieces intersecting `bounds`
    /// (optionally re-centered on `center`).
    ///
    /// Used to land a moved/cloned selection visually above whatever is
    /// already at the target spot without a global re-sort. The probe area
    /// is inset by 2 px so pieces merely sharing an edge don't count.
    pub fn max_z_below(
        &self,
        store: &TableStore,
        bounds: Rect,
        center: Option<Point>,
    ) -> ZByLayer {
        self.z_below(store, bounds, center, i64::max)
    }

    /// Lowest z per layer among *unselected* pieces intersecting `bounds`
    /// (optionally re-centered on `center`); the counterpart of
    /// [`max_z_below`](Self::max_z_below) for sending a selection to the
    /// bottom.
    pub fn min_z_below(
        &self,
        store: &TableStore,
        bounds: Rect,
        center: Option<Point>,
    ) -> ZByLayer {
        self.z_below(store, bounds, center, i64::min)
    }

    fn z_below(
        &self,
        store: &TableStore,
        bounds: Rect,
        center: Option<Point>,
        pick: fn(i64, i64) -> i64,
    ) -> ZByLayer {
        let area = match center {
            Some(c) => Rect::from_center_size(c, bounds.size()),
            None => bounds,
        };
        let area = area.inflate(-2.0, -2.0);

        let selected = self.selected_ids(store);
        let mut extents = [None::<i64>; Layer::COUNT];
        for p in store.table(None) {
            if selected.contains(&&p.id) || !overlaps_inclusive(&p.bounds(), &area) {
                continue;
            }
            let slot = &mut extents[p.layer.index()];
            *slot = Some(slot.map_or(p.z, |z| pick(z, p.z)));
        }
        ZByLayer(core::array::from_fn(|i| extents[i].unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_model::{
        Asset, AssetId, Library, LibrarySources, PieceId, RawPiece, Room, RoomCtx, Setup,
        populate_defaults,
    };
    use tabula_store::TableNo;

    fn library() -> Library {
        LibrarySources {
            token: vec![Asset {
                id: AssetId::new("die"),
                name: "die-6".into(),
                media: (1..=6).map(|i| format!("side-{i}.png")).collect(),
                ..Asset::default()
            }],
            other: vec![Asset {
                id: AssetId::new("mat"),
                name: "dicemat-4x4".into(),
                media: vec!["mat.png".into()],
                w: 4,
                h: 4,
                ..Asset::default()
            }],
            ..LibrarySources::default()
        }
        .into()
    }

    fn populate(raw: RawPiece) -> Piece {
        let setup = Setup::default();
        let room = Room::default();
        let library = library();
        let ctx = RoomCtx::new(&setup, &room, &library);
        populate_defaults(raw, &ctx, 0)
    }

    fn token(id: &str, x: i64, y: i64, z: i64) -> Piece {
        populate(RawPiece {
            id: Some(PieceId::new(id)),
            layer: Some(Layer::Token),
            x: Some(x),
            y: Some(y),
            z: Some(z),
            ..RawPiece::default()
        })
    }

    fn select_all(store: &TableStore, ids: &[&str]) -> Selection {
        let mut sel = Selection::new();
        for id in ids {
            assert!(sel.add(store, PieceId::new(*id), false), "piece {id} must exist");
        }
        sel
    }

    #[test]
    fn empty_selection_has_no_features() {
        let store = TableStore::new();
        let sel = Selection::new();
        assert_eq!(sel.features(&store), SelectionFeatures::default());
    }

    #[test]
    fn two_token_selection_bounds_enclose_both_footprints() {
        let mut store = TableStore::new();
        store.set_table(
            TableNo::ONE,
            vec![token("k1", 100, 100, 34), token("k2", 300, 100, 35)],
        );
        let sel = select_all(&store, &["k1", "k2"]);
        let f = sel.features(&store);
        // Two 64×64 tokens centered at (100, 100) and (300, 100).
        assert_eq!(
            (f.bounds.left, f.bounds.top, f.bounds.right, f.bounds.bottom),
            (68, 68, 332, 132)
        );
        assert_eq!((f.bounds.w, f.bounds.h), (264, 64));
        assert_eq!(f.bounds.center, Point::new(200.0, 100.0));
        assert!(f.rotate, "plain tokens rotate");
        assert!(f.number && f.border, "uniform token-only capabilities hold");
        assert!(f.pile, "two movable pieces pile");
        assert!(!f.edit, "edit needs exactly one piece");
    }

    #[test]
    fn rotate_needs_every_piece_to_support_it() {
        let mut store = TableStore::new();
        store.set_table(
            TableNo::ONE,
            vec![
                token("k1", 100, 100, 1),
                populate(RawPiece {
                    id: Some(PieceId::new("widget")),
                    layer: Some(Layer::Other),
                    ..RawPiece::default()
                }),
            ],
        );
        let sel = select_all(&store, &["k1", "widget"]);
        let f = sel.features(&store);
        assert!(!f.rotate, "an other-layer piece disables rotation for the group");
        assert!(!f.number, "an other-layer piece disables numbering too");
    }

    #[test]
    fn protected_actions_use_or_semantics() {
        let no_delete = u32::from(PieceFlags::NO_DELETE.bits());
        let mut store = TableStore::new();
        store.set_table(
            TableNo::ONE,
            vec![
                populate(RawPiece {
                    id: Some(PieceId::new("locked")),
                    layer: Some(Layer::Token),
                    flags: Some(no_delete),
                    ..RawPiece::default()
                }),
                token("free", 300, 100, 2),
            ],
        );
        let sel = select_all(&store, &["locked", "free"]);
        assert!(sel.features(&store).delete, "one deletable piece is enough");

        let sel = select_all(&store, &["locked"]);
        assert!(!sel.features(&store).delete, "a lone protected piece cannot be deleted");
    }

    #[test]
    fn pile_needs_more_than_one_movable_piece() {
        let no_move = u32::from(PieceFlags::NO_MOVE.bits());
        let mut store = TableStore::new();
        store.set_table(
            TableNo::ONE,
            vec![
                token("k1", 100, 100, 1),
                populate(RawPiece {
                    id: Some(PieceId::new("pinned")),
                    layer: Some(Layer::Token),
                    flags: Some(no_move),
                    ..RawPiece::default()
                }),
            ],
        );
        let sel = select_all(&store, &["k1", "pinned"]);
        let f = sel.features(&store);
        assert!(!f.pile, "only one piece is movable");
        assert!(f.top && f.bottom, "one movable piece still restacks");
    }

    #[test]
    fn cosmetic_color_uses_and_semantics() {
        let mut store = TableStore::new();
        store.set_table(
            TableNo::ONE,
            vec![
                populate(RawPiece {
                    id: Some(PieceId::new("note")),
                    layer: Some(Layer::Note),
                    ..RawPiece::default()
                }),
                token("k1", 300, 100, 1),
            ],
        );
        let sel = select_all(&store, &["note"]);
        assert!(sel.features(&store).color, "notes always take a color");
        let sel = select_all(&store, &["note", "k1"]);
        assert!(
            !sel.features(&store).color,
            "a colorless token disables the group"
        );
    }

    #[test]
    fn flip_and_random_use_or_semantics_over_sides_and_features() {
        let mut store = TableStore::new();
        store.set_table(
            TableNo::ONE,
            vec![
                populate(RawPiece {
                    id: Some(PieceId::new("d6")),
                    layer: Some(Layer::Token),
                    asset: Some(AssetId::new("die")),
                    ..RawPiece::default()
                }),
                populate(RawPiece {
                    id: Some(PieceId::new("mat")),
                    layer: Some(Layer::Other),
                    asset: Some(AssetId::new("mat")),
                    ..RawPiece::default()
                }),
                populate(RawPiece {
                    id: Some(PieceId::new("plain-tile")),
                    layer: Some(Layer::Tile),
                    x: Some(600),
                    ..RawPiece::default()
                }),
            ],
        );
        let sel = select_all(&store, &["plain-tile"]);
        let f = sel.features(&store);
        assert!(!f.flip && !f.random, "a single-sided tile does neither");

        let sel = select_all(&store, &["plain-tile", "d6"]);
        let f = sel.features(&store);
        assert!(f.flip && f.random, "a six-sided die flips and randomizes");

        let sel = select_all(&store, &["mat"]);
        assert!(sel.features(&store).random, "a dicemat randomizes by feature");
    }

    #[test]
    fn z_probes_skip_selected_pieces_and_default_to_zero() {
        let mut store = TableStore::new();
        store.set_table(
            TableNo::ONE,
            vec![
                token("sel", 100, 100, 50),
                token("under-a", 100, 100, 7),
                token("under-b", 110, 100, 3),
                populate(RawPiece {
                    id: Some(PieceId::new("tile")),
                    layer: Some(Layer::Tile),
                    x: Some(100),
                    y: Some(100),
                    z: Some(5),
                    ..RawPiece::default()
                }),
            ],
        );
        let sel = select_all(&store, &["sel"]);
        let bounds = store.piece_by_id(&PieceId::new("sel"), None).unwrap().bounds();
        let max = sel.max_z_below(&store, bounds, None);
        assert_eq!(max.get(Layer::Token), 7, "the selected piece's own z=50 is ignored");
        assert_eq!(max.get(Layer::Tile), 5);
        assert_eq!(max.get(Layer::Note), 0, "untouched layers read zero");
        let min = sel.min_z_below(&store, bounds, None);
        assert_eq!(min.get(Layer::Token), 3);
    }

    #[test]
    fn z_probe_area_can_be_recentered_and_is_inset() {
        let mut store = TableStore::new();
        store.set_table(
            TableNo::ONE,
            vec![token("sel", 100, 100, 9), token("far", 400, 400, 21)],
        );
        let sel = select_all(&store, &["sel"]);
        let bounds = store.piece_by_id(&PieceId::new("sel"), None).unwrap().bounds();
        // Probing at the selection's own spot sees nothing else...
        assert_eq!(sel.max_z_below(&store, bounds, None).get(Layer::Token), 0);
        // ...recentering the probe over the drop target sees the far token.
        let max = sel.max_z_below(&store, bounds, Some(Point::new(400.0, 400.0)));
        assert_eq!(max.get(Layer::Token), 21);
        // A probe that merely shares an edge with the far token is inset
        // away from it: "far" spans 368..432, the probe ends at 368.
        let touching = Rect::new(304.0, 368.0, 368.0, 432.0);
        assert_eq!(sel.max_z_below(&store, touching, None).get(Layer::Token), 0);
    }
}
