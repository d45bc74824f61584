// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Defaulting raw wire records into fully-populated pieces.
//!
//! [`populate_defaults`] is the single entry point through which piece data
//! reaches the rest of the engine. It never rejects input: missing fields
//! take their documented defaults and out-of-range values are wrapped or
//! clamped, because a partially-correct piece is preferable to blocking a
//! whole table over one bad record.

use tabula_grid::rotated_dimensions;

use crate::asset::{Asset, AssetId};
use crate::piece::{Feature, Layer, POINTER_ID, Piece, PieceFlags, PieceMeta, RawPiece};
use crate::setup::{RoomCtx, STICKY_COLORS};

/// Convert a length to `i64` for modulus math.
pub(crate) fn len_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Euclidean wrap into `[0, modulus)`, narrowed to `u16`.
fn wrap_u16(v: i64, modulus: i64) -> u16 {
    u16::try_from(v.rem_euclid(modulus.max(1))).unwrap_or(0)
}

/// Euclidean wrap into `[0, modulus)`, narrowed to `u8`.
fn wrap_u8(v: i64, modulus: i64) -> u8 {
    u8::try_from(v.rem_euclid(modulus.max(1))).unwrap_or(0)
}

/// Clamp a grid dimension to its legal 1–32 range.
fn clamp_dim(v: i64) -> u32 {
    u32::try_from(v.clamp(1, 32)).unwrap_or(1)
}

/// The effective side count of a piece, and whether an extra backside was
/// synthesized.
///
/// Single-sided tokens get one synthetic back so they can be flipped
/// face-down; an unknown asset counts as single-sided.
pub fn effective_sides(asset: Option<&Asset>, layer: Layer) -> (u16, bool) {
    let Some(asset) = asset else {
        return (1, false);
    };
    let sides = u16::try_from(asset.media.len().max(1)).unwrap_or(u16::MAX);
    if layer == Layer::Token && sides == 1 {
        (2, true)
    } else {
        (sides, false)
    }
}

/// Fill-color modulus for a layer: notes wrap within the fixed sticky
/// palette (every index is a real color), everything else within the room
/// palette plus the leading "none" slot.
pub(crate) fn fill_modulus(layer: Layer, ctx: &RoomCtx<'_>) -> i64 {
    if layer == Layer::Note {
        len_i64(STICKY_COLORS.len())
    } else {
        len_i64(ctx.setup.colors.len()) + 1
    }
}

fn normalize_colors(color: Option<&[i64]>, layer: Layer, ctx: &RoomCtx<'_>) -> [u8; 2] {
    let c0 = color.and_then(|c| c.first().copied()).unwrap_or(0);
    let c1 = color.and_then(|c| c.get(1).copied()).unwrap_or(0);
    [
        wrap_u8(c0, fill_modulus(layer, ctx)),
        wrap_u8(c1, len_i64(ctx.setup.borders.len()) + 1),
    ]
}

/// Keep at most one label entry, truncated to the layer's cap.
fn normalize_label(label: Option<Vec<String>>, layer: Layer) -> Vec<String> {
    let Some(first) = label.into_iter().flatten().next() else {
        return Vec::new();
    };
    if first.is_empty() {
        return Vec::new();
    }
    let cap = layer.label_cap();
    if first.chars().count() > cap {
        vec![first.chars().take(cap).collect()]
    } else {
        vec![first]
    }
}

fn detect_feature(asset_id: &AssetId, asset: Option<&Asset>) -> Option<Feature> {
    if asset_id.as_str() == POINTER_ID {
        return Some(Feature::Pointer);
    }
    let name = asset.map(|a| a.name.as_str())?;
    if name.starts_with("dicemat") {
        Some(Feature::Dicemat)
    } else if name.starts_with("discard") {
        Some(Feature::Discard)
    } else {
        None
    }
}

/// Absolute expiry in epoch milliseconds.
///
/// With a server-time reference the relative remaining lifetime is applied
/// to the local clock, correcting for client/server skew; without one the
/// wire value is taken as absolute epoch seconds.
fn expiry_ms(expires: i64, server_time: Option<i64>, now_ms: u64) -> u64 {
    let ms = match server_time {
        Some(st) => {
            let base = i64::try_from(now_ms).unwrap_or(i64::MAX);
            base.saturating_add(expires.saturating_sub(st).saturating_mul(1000))
        }
        None => expires.saturating_mul(1000),
    };
    u64::try_from(ms.max(0)).unwrap_or(0)
}

/// Turn a raw wire record into a fully-defaulted [`Piece`].
///
/// Every omitted field takes its documented default, the matching asset is
/// resolved from the library, and derived metadata is computed from the
/// current setup. Populating the raw projection of an already-populated
/// piece (with the same context and `now_ms`) is a no-op.
pub fn populate_defaults(raw: RawPiece, ctx: &RoomCtx<'_>, now_ms: u64) -> Piece {
    let layer = raw.layer.unwrap_or(Layer::Tile);
    let asset_id = raw.asset.unwrap_or_default();
    let asset = ctx.library.by_id(&asset_id, None);

    let w = clamp_dim(raw.w.or(asset.map(|a| i64::from(a.w))).unwrap_or(1));
    let h = clamp_dim(
        raw.h
            .or(asset.map(|a| i64::from(a.h)))
            .unwrap_or(i64::from(w)),
    );
    let rot = wrap_u16(raw.rot.unwrap_or(0), 360);
    let (sides, extra_backside) = effective_sides(asset, layer);

    let grid = ctx.setup.grid_size;
    let original_width_px = i64::from(w) * grid;
    let original_height_px = i64::from(h) * grid;
    let (width_px, height_px) = rotated_dimensions(original_width_px, original_height_px, rot);

    let meta = PieceMeta {
        original_width_px,
        original_height_px,
        width_px,
        height_px,
        offset_x: (width_px - original_width_px) / 2,
        offset_y: (height_px - original_height_px) / 2,
        sides,
        extra_backside,
        feature: detect_feature(&asset_id, asset),
        has_color: layer == Layer::Note || asset.is_some_and(|a| a.bg.is_some()),
        has_border: layer == Layer::Token,
        has_highlight: layer == Layer::Token,
        expires_at: raw
            .expires
            .map(|e| expiry_ms(e, ctx.server_time, now_ms)),
        mask: asset.and_then(|a| a.mask.clone()),
    };

    Piece {
        id: raw.id.unwrap_or_default(),
        layer,
        asset: asset_id,
        x: raw.x.unwrap_or(0).clamp(0, ctx.room.width - 1),
        y: raw.y.unwrap_or(0).clamp(0, ctx.room.height - 1),
        z: raw.z.unwrap_or(0),
        w,
        h,
        rot,
        side: wrap_u16(raw.side.unwrap_or(0), i64::from(sides)),
        color: normalize_colors(raw.color.as_deref(), layer, ctx),
        num: wrap_u8(raw.num.unwrap_or(0), 36),
        flags: PieceFlags::from_bits_truncate(
            u8::try_from(raw.flags.unwrap_or(0) & 0xFF).unwrap_or(0),
        ),
        label: normalize_label(raw.label, layer),
        badges: raw.badges.unwrap_or_default(),
        expires: raw.expires,
        meta,
    }
}

/// Populate a whole list of raw records, dropping pieces already expired at
/// `now_ms` and preserving the order of survivors.
pub fn populate_defaults_many(
    raws: Vec<RawPiece>,
    ctx: &RoomCtx<'_>,
    now_ms: u64,
) -> Vec<Piece> {
    raws.into_iter()
        .filter_map(|raw| {
            let piece = populate_defaults(raw, ctx, now_ms);
            if piece.meta.expires_at.is_some_and(|t| t < now_ms) {
                tracing::debug!(id = %piece.id, "dropping expired piece");
                None
            } else {
                Some(piece)
            }
        })
        .collect()
}
