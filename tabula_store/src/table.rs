// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Table numbers and the store itself.

use core::fmt;

use tabula_model::{Piece, PieceId};

/// Number of tables in a room.
pub const TABLE_COUNT: usize = 9;

/// A table number, 1 through 9.
///
/// Out-of-range numbers are unrepresentable, so table indexing never
/// panics and never needs an error path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableNo(u8);

impl TableNo {
    /// The first table; every room starts here.
    pub const ONE: Self = Self(1);

    /// Create a table number, `None` unless `1 <= no <= 9`.
    pub fn new(no: u8) -> Option<Self> {
        (1..=9).contains(&no).then_some(Self(no))
    }

    /// The table number as a plain integer.
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Zero-based storage index.
    pub(crate) const fn idx(self) -> usize {
        self.0 as usize - 1
    }

    /// All table numbers, in order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=9).map(Self)
    }
}

impl Default for TableNo {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for TableNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The tables of one room, owned by one client session.
///
/// All mutation goes through the setters below; readers borrow piece slices
/// directly. Most read operations take an optional table number and default
/// to the active table.
#[derive(Clone, Debug, Default)]
pub struct TableStore {
    tables: [Vec<Piece>; TABLE_COUNT],
    active: TableNo,
}

impl TableStore {
    /// Create an empty store with table 1 active.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active table number.
    pub fn active(&self) -> TableNo {
        self.active
    }

    /// Switch the active table. A pure index change: no table content is
    /// touched.
    pub fn set_active(&mut self, no: TableNo) {
        self.active = no;
    }

    /// The pieces of a table (the active one by default), in insertion
    /// order.
    pub fn table(&self, no: Option<TableNo>) -> &[Piece] {
        &self.tables[no.unwrap_or(self.active).idx()]
    }

    /// Replace a table's contents wholesale.
    ///
    /// This is the sync entry point: a freshly populated snapshot swaps in
    /// as one assignment, so readers never see a half-replaced table.
    pub fn set_table(&mut self, no: TableNo, pieces: Vec<Piece>) {
        tracing::debug!(table = no.get(), count = pieces.len(), "table replaced");
        self.tables[no.idx()] = pieces;
    }

    /// Insert a piece, or replace the piece with the same id in place
    /// (preserving its position in the stacking tie-break order).
    pub fn put_piece(&mut self, no: TableNo, piece: Piece) {
        let table = &mut self.tables[no.idx()];
        match table.iter_mut().find(|p| p.id == piece.id) {
            Some(slot) => *slot = piece,
            None => table.push(piece),
        }
    }

    /// Remove a piece by id, returning it if it existed.
    pub fn remove_piece(&mut self, no: TableNo, id: &PieceId) -> Option<Piece> {
        let table = &mut self.tables[no.idx()];
        let idx = table.iter().position(|p| &p.id == id)?;
        Some(table.remove(idx))
    }
}
