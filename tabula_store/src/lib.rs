// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-room table store for the Tabula tabletop engine.
//!
//! A room has nine independent numbered tables, each an ordered list of
//! pieces, plus one "active" table number. [`TableStore`] owns that state
//! for a single client session and is the only sanctioned way to mutate or
//! read it — the engine never holds a second copy of a table.
//!
//! Tables are strict partitions: every lifecycle operation acts within
//! exactly one table, and switching the active table is a pure index change
//! with no cross-table side effects. [`TableStore::set_table`] replaces a
//! table's contents in a single assignment, so a reader never observes a
//! partially-replaced table; network sync simply calls it with a freshly
//! populated snapshot.
//!
//! The [query layer](TableStore#query-layer) is read-only and tolerant:
//! lookup misses return `None` or empty vectors, never errors, because "not
//! found" is an expected outcome during live editing races.

mod query;
mod table;

pub use query::{contains_inclusive, overlaps_inclusive};
pub use table::{TABLE_COUNT, TableNo, TableStore};
