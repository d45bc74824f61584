// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Piece, asset, and room data model for the Tabula tabletop engine.
//!
//! A shared tabletop is a set of **pieces** (tiles, stickers, notes, tokens)
//! placed on one of several tables, synchronized between clients through a
//! terse JSON wire format with single-letter keys. This crate owns that data
//! model and the rules that keep it consistent:
//!
//! - [`RawPiece`] is the permissive, all-optional wire record — both full
//!   piece records arriving from the backend and partial patch objects use
//!   this shape. Unknown keys are dropped silently on deserialize.
//! - [`populate_defaults`] is the only sanctioned way to turn a raw record
//!   into a [`Piece`]: it fills every omitted field with its documented
//!   default, resolves the matching [`Asset`], and computes the derived
//!   [`PieceMeta`] (pixel footprint, rotated bounding box, side counts,
//!   capability hints, absolute expiry). It is idempotent.
//! - [`sanitize_patch`] whitelists and clamps/wraps an arbitrary patch to
//!   its legal domain without ever rejecting it — a partially-correct piece
//!   beats blocking a whole table over one bad record.
//!
//! Room-wide configuration ([`Setup`], [`Room`]) and the asset [`Library`]
//! are read-only inputs provided per call via [`RoomCtx`]; the model never
//! caches them, so template edits take effect on the next operation.
//!
//! Nothing in this crate reads a clock. Operations that depend on time take
//! a caller-supplied `now_ms` (epoch milliseconds), which keeps expiry
//! handling deterministic under test.

mod asset;
mod piece;
mod populate;
mod sanitize;
mod setup;

pub use asset::{Asset, AssetId, Library, LibrarySources, Material};
pub use piece::{
    Feature, LOS_ID, Layer, POINTER_ID, ParseLayerError, Piece, PieceFlags, PieceId, PieceMeta,
    RawPiece,
};
pub use populate::{effective_sides, populate_defaults, populate_defaults_many};
pub use sanitize::sanitize_patch;
pub use setup::{GridKind, NamedColor, Room, RoomCtx, STICKY_COLORS, Setup};
