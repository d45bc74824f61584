// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Click-target resolution for the Tabula tabletop engine.
//!
//! Given a click point and a candidate stack of pieces whose bounding boxes
//! contain it (pre-ordered topmost first: topmost layer, then z
//! descending), [`resolve_click`] finds the first candidate that is
//! *visually solid* at that exact point:
//!
//! - Reserved marker pieces (pointer, line-of-sight) are never targets.
//! - The click point is mapped into the piece's unrotated local space
//!   (undo the center offset, undo the rotation).
//! - Tokens test against a procedural ellipse filling their footprint;
//!   other pieces consult their asset's transparency mask through an async
//!   [`MaskSource`]; pieces without a mask are solid everywhere.
//! - A mask that fails to load is **fail-open**: the piece counts as solid,
//!   so a transient image hiccup degrades to "everything clickable" rather
//!   than "nothing clickable".
//!
//! Resolution short-circuits on the first solid candidate, so masks for
//! pieces further down the stack are never loaded. The function is async
//! only because mask images may need loading; a superseded resolution is
//! cancelled by simply dropping its future.

use core::future::Future;

use kurbo::{Affine, Point};
use tabula_model::{Layer, Piece, PieceId};

/// A decoded transparency mask: one alpha byte per pixel, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
    threshold: u8,
}

impl Mask {
    /// Build a mask from raw alpha bytes; `None` unless the buffer holds
    /// exactly `width × height` entries (and both are nonzero).
    ///
    /// Any nonzero alpha counts as solid; use
    /// [`with_threshold`](Self::with_threshold) to require more opacity.
    pub fn new(width: u32, height: u32, alpha: Vec<u8>) -> Option<Self> {
        (width > 0 && height > 0 && alpha.len() == (width as usize) * (height as usize)).then_some(
            Self {
                width,
                height,
                alpha,
                threshold: 0,
            },
        )
    }

    /// The same mask with a custom opacity threshold: a pixel is solid only
    /// when its alpha is strictly greater.
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// Mask width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel at (`x`, `y`) is solid; out-of-range coordinates
    /// are not.
    pub fn solid_at(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = (y as usize) * (self.width as usize) + x as usize;
        self.alpha[idx] > self.threshold
    }
}

/// Failure to produce a mask for a piece.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MaskError {
    /// The mask image could not be fetched.
    #[error("mask image {0:?} failed to load")]
    Unavailable(String),
    /// The mask image loaded but could not be decoded.
    #[error("mask image {0:?} could not be decoded")]
    Malformed(String),
}

/// Asynchronous provider of per-asset transparency masks.
///
/// Implemented by the (excluded) asset/image layer. `Ok(None)` means the
/// image exists but carries no usable mask — such pieces are solid
/// everywhere. Implementations are expected to cache; resolution may ask
/// for the same mask on every click.
pub trait MaskSource {
    /// Load the mask image called `name`.
    fn load(&self, name: &str) -> impl Future<Output = Result<Option<Mask>, MaskError>>;
}

/// Map a screen point into a piece's unrotated local space.
///
/// Returns `None` when the point misses the piece's actual (unrotated)
/// footprint — possible even though the point is inside the rotated
/// bounding box the caller filtered by.
fn to_local(piece: &Piece, point: Point) -> Option<Point> {
    let d = point - piece.center();
    let unrot = Affine::rotate(-f64::from(piece.rot).to_radians()) * Point::new(d.x, d.y);
    let (w, h) = (
        piece.meta.original_width_px as f64,
        piece.meta.original_height_px as f64,
    );
    let local = Point::new(unrot.x + w / 2.0, unrot.y + h / 2.0);
    ((0.0..=w).contains(&local.x) && (0.0..=h).contains(&local.y)).then_some(local)
}

/// Whether a local point lands on the ellipse filling a token's footprint.
fn ellipse_contains(piece: &Piece, local: Point) -> bool {
    let rx = piece.meta.original_width_px as f64 / 2.0;
    let ry = piece.meta.original_height_px as f64 / 2.0;
    let (dx, dy) = ((local.x - rx) / rx, (local.y - ry) / ry);
    dx * dx + dy * dy <= 1.0
}

/// Sample a mask at the mask pixel corresponding to a local point.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "Local coordinates are clamped non-negative and mask indices fit in u32."
)]
fn mask_solid(piece: &Piece, mask: &Mask, local: Point) -> bool {
    let (w, h) = (
        piece.meta.original_width_px as f64,
        piece.meta.original_height_px as f64,
    );
    if w <= 0.0 || h <= 0.0 {
        return false;
    }
    let mx = ((local.x * f64::from(mask.width()) / w).floor() as u32).min(mask.width() - 1);
    let my = ((local.y * f64::from(mask.height()) / h).floor() as u32).min(mask.height() - 1);
    mask.solid_at(mx, my)
}

/// Whether `piece` is visually solid at `point` (screen space).
async fn is_solid<S: MaskSource>(piece: &Piece, point: Point, masks: &S) -> bool {
    let Some(local) = to_local(piece, point) else {
        return false;
    };
    if piece.layer == Layer::Token {
        return ellipse_contains(piece, local);
    }
    let Some(name) = piece.meta.mask.as_deref() else {
        return true;
    };
    match masks.load(name).await {
        Ok(Some(mask)) => mask_solid(piece, &mask, local),
        Ok(None) => true,
        Err(err) => {
            tracing::warn!(%err, mask = name, "mask load failed, treating piece as solid");
            true
        }
    }
}

/// Resolve the piece a click actually lands on.
///
/// `candidates` must already be filtered to pieces whose bounding boxes
/// contain `point`, ordered topmost first. Returns the id of the first
/// visually solid candidate, or `None` when the click passes through
/// everything.
pub async fn resolve_click<S: MaskSource>(
    point: Point,
    candidates: &[&Piece],
    masks: &S,
) -> Option<PieceId> {
    for piece in candidates {
        if piece.is_reserved() {
            continue;
        }
        if is_solid(piece, point, masks).await {
            return Some(piece.id.clone());
        }
    }
    None
}
