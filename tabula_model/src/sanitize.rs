// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whitelist sanitization of piece patches.
//!
//! A patch is an arbitrary partial record headed for a piece. Sanitization
//! clamps and wraps every recognized field into its legal domain and never
//! reports an error; stricter validation is the server's job, this layer
//! only protects client-side state consistency.

use crate::piece::{Layer, Piece, RawPiece};
use crate::populate::{effective_sides, fill_modulus, len_i64};
use crate::setup::RoomCtx;

/// The side-index modulus for a patch: the referenced asset's effective
/// side count if the patch switches assets, else the existing piece's, else
/// one (unknown assets collapse every side index to zero).
fn side_modulus(patch: &RawPiece, existing: Option<&Piece>, layer: Layer, ctx: &RoomCtx<'_>) -> i64 {
    if let Some(asset_id) = &patch.asset {
        let (sides, _) = effective_sides(ctx.library.by_id(asset_id, None), layer);
        return i64::from(sides);
    }
    match existing {
        Some(piece) => i64::from(piece.meta.sides),
        None => 1,
    }
}

/// Sanitize a piece patch into its legal domain.
///
/// Returns a new record; the input is never mutated. Recognized fields are
/// clamped/wrapped per the data model; `l`, `id`, `a`, `b`, `z`, `t`, and
/// `expires` pass through untouched. (Unrecognized wire keys never reach
/// this function — deserialization into [`RawPiece`] already drops them.)
///
/// `existing` is the piece the patch targets, when known; it supplies the
/// side-count modulus and the layer for palette selection when the patch
/// itself doesn't.
pub fn sanitize_patch(
    patch: &RawPiece,
    existing: Option<&Piece>,
    ctx: &RoomCtx<'_>,
) -> RawPiece {
    let layer = patch
        .layer
        .or(existing.map(|p| p.layer))
        .unwrap_or(Layer::Tile);

    let fill_modulus = fill_modulus(layer, ctx);
    let border_modulus = len_i64(ctx.setup.borders.len()) + 1;

    RawPiece {
        // Pass-through fields.
        id: patch.id.clone(),
        layer: patch.layer,
        asset: patch.asset.clone(),
        z: patch.z,
        label: patch.label.clone(),
        badges: patch.badges.clone(),
        expires: patch.expires,
        // Clamped and wrapped fields.
        x: patch.x.map(|v| v.clamp(0, ctx.room.width - 1)),
        y: patch.y.map(|v| v.clamp(0, ctx.room.height - 1)),
        w: patch.w.map(|v| v.clamp(1, 32)),
        h: patch.h.map(|v| v.clamp(1, 32)),
        rot: patch.rot.map(|v| v.rem_euclid(360)),
        side: patch
            .side
            .map(|v| v.rem_euclid(side_modulus(patch, existing, layer, ctx).max(1))),
        num: patch.num.map(|v| v.rem_euclid(36)),
        flags: patch.flags.map(|v| v & 0xFF),
        color: patch.color.as_ref().map(|c| {
            vec![
                c.first().copied().unwrap_or(0).rem_euclid(fill_modulus.max(1)),
                c.get(1).copied().unwrap_or(0).rem_euclid(border_modulus.max(1)),
            ]
        }),
    }
}
