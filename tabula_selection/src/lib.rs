// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-table selection tracking for the Tabula tabletop engine.
//!
//! A [`Selection`] remembers which piece ids the local client has selected,
//! independently for each of the nine tables. It is purely local UI state
//! layered over the shared [`TableStore`]: nothing in it is synchronized
//! across the network.
//!
//! The core invariant is that an id is only ever *reported* selected while
//! a piece with that id exists on its table. Adds silently no-op for
//! nonexistent ids (unless forced), reads filter through the store, and
//! [`Selection::prune`] garbage-collects ids left behind by sync — so a
//! piece deleted by another client simply drops out of the selection.
//!
//! Derived state lives in the [`features`](Selection::features) query: a
//! capability record over the current selection (can it rotate? clone?
//! recolor?) plus its combined pixel bounding box, and the
//! [`max_z_below`](Selection::max_z_below)/[`min_z_below`](Selection::min_z_below)
//! queries that decide what z a moved or cloned selection should adopt.

mod features;

pub use features::{SelectionBounds, SelectionFeatures, ZByLayer};

use tabula_model::{Layer, Piece, PieceId};
use tabula_store::{TABLE_COUNT, TableNo, TableStore};

/// How a click on an unselected piece changes the selection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ClickMode {
    /// Replace the whole selection with the clicked piece.
    #[default]
    Replace,
    /// Add the clicked piece, keeping the rest (shift-click style).
    Toggle,
}

/// Piece ids selected by the local client, tracked per table.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    ids: [Vec<PieceId>; TABLE_COUNT],
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, no: TableNo) -> &Vec<PieceId> {
        &self.ids[no.get() as usize - 1]
    }

    fn slot_mut(&mut self, no: TableNo) -> &mut Vec<PieceId> {
        &mut self.ids[no.get() as usize - 1]
    }

    /// Whether `id` is selected on the active table (and its piece still
    /// exists there).
    pub fn is_selected(&self, store: &TableStore, id: &PieceId) -> bool {
        self.slot(store.active()).contains(id) && store.piece_by_id(id, None).is_some()
    }

    /// Select `id` on the active table.
    ///
    /// No-ops when the id is already selected or when no such piece exists
    /// — unless `force` is set, which admits ids ahead of the piece record
    /// (e.g. a piece this client just created and is still waiting to see
    /// echoed back). Returns whether the selection changed.
    pub fn add(&mut self, store: &TableStore, id: PieceId, force: bool) -> bool {
        let no = store.active();
        if self.slot(no).contains(&id) {
            return false;
        }
        if !force && store.piece_by_id(&id, None).is_none() {
            return false;
        }
        self.slot_mut(no).push(id);
        true
    }

    /// Deselect `id` on the active table; no-op when not selected.
    pub fn remove(&mut self, store: &TableStore, id: &PieceId) -> bool {
        let slot = self.slot_mut(store.active());
        let before = slot.len();
        slot.retain(|s| s != id);
        slot.len() != before
    }

    /// Deselect every id on the active table whose piece matches the layer
    /// filter (`None` = all). Stale ids are dropped either way.
    pub fn clear(&mut self, store: &TableStore, layer: Option<Layer>) {
        let no = store.active();
        let keep: Vec<PieceId> = self
            .slot(no)
            .iter()
            .filter(|id| {
                store
                    .piece_by_id(id, None)
                    .is_some_and(|p| layer.is_some_and(|l| p.layer != l))
            })
            .cloned()
            .collect();
        *self.slot_mut(no) = keep;
    }

    /// Apply a click to the selection.
    ///
    /// Clicking empty space (`None`) clears everything; clicking a selected
    /// piece deselects it; clicking an unselected piece adds it (toggle
    /// mode) or replaces the whole selection with it (replace mode).
    pub fn on_click(&mut self, store: &TableStore, target: Option<&PieceId>, mode: ClickMode) {
        let Some(id) = target else {
            self.clear(store, None);
            return;
        };
        if self.slot(store.active()).contains(id) {
            self.remove(store, id);
            return;
        }
        if mode == ClickMode::Replace {
            self.clear(store, None);
        }
        self.add(store, id.clone(), false);
    }

    /// Drop every id, on every table, whose piece no longer exists there.
    ///
    /// Call after replacing table contents from a sync snapshot; piece
    /// removal must imply removal from the selection.
    pub fn prune(&mut self, store: &TableStore) {
        for no in TableNo::all() {
            self.ids[no.get() as usize - 1]
                .retain(|id| store.piece_by_id(id, Some(no)).is_some());
        }
    }

    /// The selected ids on the active table, in selection order, filtered
    /// to pieces that still exist.
    pub fn selected_ids<'a>(&'a self, store: &TableStore) -> Vec<&'a PieceId> {
        self.slot(store.active())
            .iter()
            .filter(|id| store.piece_by_id(id, None).is_some())
            .collect()
    }

    /// The selected pieces on the active table, optionally restricted to
    /// one layer.
    pub fn selected_pieces<'a>(
        &self,
        store: &'a TableStore,
        layer: Option<Layer>,
    ) -> Vec<&'a Piece> {
        self.slot(store.active())
            .iter()
            .filter_map(|id| store.piece_by_id(id, None))
            .filter(|p| layer.is_none_or(|l| p.layer == l))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_model::{Library, RawPiece, Room, RoomCtx, Setup, populate_defaults};

    fn piece(id: &str, layer: Layer) -> Piece {
        let setup = Setup::default();
        let room = Room::default();
        let library = Library::default();
        let ctx = RoomCtx::new(&setup, &room, &library);
        populate_defaults(
            RawPiece {
                id: Some(PieceId::new(id)),
                layer: Some(layer),
                ..RawPiece::default()
            },
            &ctx,
            0,
        )
    }

    fn store_with(ids: &[(&str, Layer)]) -> TableStore {
        let mut store = TableStore::new();
        store.set_table(
            TableNo::ONE,
            ids.iter().map(|(id, l)| piece(id, *l)).collect(),
        );
        store
    }

    #[test]
    fn add_requires_an_existing_piece_unless_forced() {
        let store = store_with(&[("a", Layer::Token)]);
        let mut sel = Selection::new();
        assert!(sel.add(&store, PieceId::new("a"), false));
        assert!(!sel.add(&store, PieceId::new("ghost"), false));
        assert!(sel.add(&store, PieceId::new("ghost"), true));
        // A forced ghost id is held but never reported selected.
        assert!(!sel.is_selected(&store, &PieceId::new("ghost")));
        assert_eq!(sel.selected_ids(&store).len(), 1);
    }

    #[test]
    fn add_is_idempotent() {
        let store = store_with(&[("a", Layer::Token)]);
        let mut sel = Selection::new();
        assert!(sel.add(&store, PieceId::new("a"), false));
        assert!(!sel.add(&store, PieceId::new("a"), false));
        assert_eq!(sel.selected_ids(&store).len(), 1);
    }

    #[test]
    fn selections_are_partitioned_per_table() {
        let mut store = TableStore::new();
        for no in TableNo::all() {
            store.set_table(no, vec![piece("a", Layer::Token)]);
        }
        for n in 1..=9_u8 {
            let mut sel = Selection::new();
            store.set_active(TableNo::new(n).unwrap());
            sel.add(&store, PieceId::new("a"), false);
            for m in 1..=9_u8 {
                if m == n {
                    continue;
                }
                store.set_active(TableNo::new(m).unwrap());
                assert!(
                    sel.selected_ids(&store).is_empty(),
                    "selection on table {n} must be invisible from table {m}"
                );
            }
        }
    }

    #[test]
    fn click_on_empty_space_clears_everything() {
        let store = store_with(&[("a", Layer::Token), ("b", Layer::Tile)]);
        let mut sel = Selection::new();
        sel.add(&store, PieceId::new("a"), false);
        sel.add(&store, PieceId::new("b"), false);
        sel.on_click(&store, None, ClickMode::Toggle);
        assert!(sel.selected_ids(&store).is_empty());
    }

    #[test]
    fn click_toggles_or_replaces_depending_on_mode() {
        let store = store_with(&[("a", Layer::Token), ("b", Layer::Tile)]);
        let mut sel = Selection::new();
        sel.on_click(&store, Some(&PieceId::new("a")), ClickMode::Toggle);
        sel.on_click(&store, Some(&PieceId::new("b")), ClickMode::Toggle);
        assert_eq!(sel.selected_ids(&store).len(), 2);
        // Clicking a selected piece deselects it, in either mode.
        sel.on_click(&store, Some(&PieceId::new("a")), ClickMode::Toggle);
        assert_eq!(sel.selected_ids(&store), [&PieceId::new("b")]);
        // Replace mode collapses the selection to the clicked piece.
        sel.on_click(&store, Some(&PieceId::new("a")), ClickMode::Replace);
        assert_eq!(sel.selected_ids(&store), [&PieceId::new("a")]);
    }

    #[test]
    fn clear_honors_the_layer_filter() {
        let store = store_with(&[("a", Layer::Token), ("b", Layer::Tile)]);
        let mut sel = Selection::new();
        sel.add(&store, PieceId::new("a"), false);
        sel.add(&store, PieceId::new("b"), false);
        sel.clear(&store, Some(Layer::Token));
        assert_eq!(sel.selected_ids(&store), [&PieceId::new("b")]);
        sel.clear(&store, None);
        assert!(sel.selected_ids(&store).is_empty());
    }

    #[test]
    fn removed_pieces_drop_out_of_the_selection() {
        let mut store = store_with(&[("a", Layer::Token)]);
        let mut sel = Selection::new();
        sel.add(&store, PieceId::new("a"), false);
        store.remove_piece(TableNo::ONE, &PieceId::new("a"));
        // Reads filter immediately, prune compacts the stored ids.
        assert!(sel.selected_ids(&store).is_empty());
        assert!(!sel.is_selected(&store, &PieceId::new("a")));
        sel.prune(&store);
        assert!(sel.slot(TableNo::ONE).is_empty());
    }

    #[test]
    fn selected_pieces_can_be_narrowed_by_layer() {
        let store = store_with(&[("a", Layer::Token), ("b", Layer::Tile)]);
        let mut sel = Selection::new();
        sel.add(&store, PieceId::new("a"), false);
        sel.add(&store, PieceId::new("b"), false);
        assert_eq!(sel.selected_pieces(&store, None).len(), 2);
        let tokens = sel.selected_pieces(&store, Some(Layer::Token));
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].id, PieceId::new("a"));
    }
}
