// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Piece records: wire shape, defaulted shape, flags, and derived metadata.

use core::fmt;
use core::str::FromStr;

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::asset::AssetId;

/// Reserved id of the shared pointer marker (piece and asset alike).
pub const POINTER_ID: &str = "ZZZZZZZZ";

/// Reserved id of the line-of-sight marker (piece and asset alike).
pub const LOS_ID: &str = "ZZZZZZZY";

/// Opaque piece identifier, unique per room.
///
/// Two constant ids are reserved for the shared pointer and the
/// line-of-sight marker; pieces carrying them are synthetic and are never
/// valid click targets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(String);

impl PieceId {
    /// Wrap a raw id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id of the shared pointer marker.
    pub fn pointer() -> Self {
        Self(POINTER_ID.into())
    }

    /// The id of the line-of-sight marker.
    pub fn line_of_sight() -> Self {
        Self(LOS_ID.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is one of the two reserved marker ids.
    pub fn is_reserved(&self) -> bool {
        self.0 == POINTER_ID || self.0 == LOS_ID
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A piece's category, which doubles as its z-stacking partition.
///
/// Declaration order is render order, bottom-up: tiles at the bottom,
/// `other` pieces on top. The wire format uses the lowercase names.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Map/board tiles.
    Tile,
    /// Flat stickers above tiles.
    Sticker,
    /// Sticky notes.
    Note,
    /// Playing tokens.
    Token,
    /// Everything else (dice mats, discard piles, widgets).
    Other,
}

impl Layer {
    /// Number of layers.
    pub const COUNT: usize = 5;

    /// All layers, bottom-up.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Tile,
        Self::Sticker,
        Self::Note,
        Self::Token,
        Self::Other,
    ];

    /// Stable index of this layer in [`Layer::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The wire name of this layer.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tile => "tile",
            Self::Sticker => "sticker",
            Self::Note => "note",
            Self::Token => "token",
            Self::Other => "other",
        }
    }

    /// Maximum label length for pieces on this layer, in characters.
    pub fn label_cap(self) -> usize {
        match self {
            Self::Note => 128,
            _ => 32,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown layer name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown layer name: {0:?}")]
pub struct ParseLayerError(pub String);

impl FromStr for Layer {
    type Err = ParseLayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tile" => Ok(Self::Tile),
            "sticker" => Ok(Self::Sticker),
            "note" => Ok(Self::Note),
            "token" => Ok(Self::Token),
            "other" => Ok(Self::Other),
            other => Err(ParseLayerError(other.into())),
        }
    }
}

bitflags::bitflags! {
    /// Per-piece protection and behavior flags (8-bit wire mask).
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PieceFlags: u8 {
        /// Piece cannot be moved.
        const NO_MOVE = 0b0000_0001;
        /// Piece cannot be deleted.
        const NO_DELETE = 0b0000_0010;
        /// Piece cannot be cloned.
        const NO_CLONE = 0b0000_0100;
        /// Note text aligns top-left instead of centered.
        const NOTE_TOPLEFT = 0b0000_1000;
        /// Tile renders the minor grid overlay.
        const TILE_GRID_MINOR = 0b0100_0000;
        /// Tile renders the major grid overlay.
        const TILE_GRID_MAJOR = 0b1000_0000;
    }
}

/// Special behavior tag derived from a piece's asset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    /// The shared pointer marker.
    Pointer,
    /// A dice mat; randomize scatters pieces on it.
    Dicemat,
    /// A discard pile; randomize flips pieces face-down.
    Discard,
}

/// Derived, never-persisted metadata for a piece.
///
/// Every field is a pure function of the piece's own fields, its asset
/// record, and the room setup; [`populate_defaults`](crate::populate_defaults)
/// recomputes the whole struct and nothing else writes it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PieceMeta {
    /// Unrotated width in pixels (`w` × grid size).
    pub original_width_px: i64,
    /// Unrotated height in pixels (`h` × grid size).
    pub original_height_px: i64,
    /// Width of the axis-aligned bounding box after rotation.
    pub width_px: i64,
    /// Height of the axis-aligned bounding box after rotation.
    pub height_px: i64,
    /// Horizontal top-left correction keeping the center fixed under rotation.
    pub offset_x: i64,
    /// Vertical top-left correction keeping the center fixed under rotation.
    pub offset_y: i64,
    /// Effective side count, including a synthesized backside.
    pub sides: u16,
    /// Whether a backside was synthesized for a single-sided token.
    pub extra_backside: bool,
    /// Special behavior tag, if the asset carries one.
    pub feature: Option<Feature>,
    /// Whether the piece takes a fill color.
    pub has_color: bool,
    /// Whether the piece takes a border color.
    pub has_border: bool,
    /// Whether the piece shows a selection highlight.
    pub has_highlight: bool,
    /// Absolute expiry in epoch milliseconds, clock-skew corrected.
    pub expires_at: Option<u64>,
    /// Mask image name from the asset, if configured.
    pub mask: Option<String>,
}

/// A fully-defaulted piece as stored in a table.
///
/// Construct only through [`populate_defaults`](crate::populate_defaults);
/// a `Piece` deliberately does not implement `Deserialize`, so raw wire
/// records cannot bypass defaulting. Serialization produces the minimal
/// wire form: fields holding their documented default are omitted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Piece {
    /// Unique piece id.
    pub id: PieceId,
    /// Layer this piece renders and stacks in.
    #[serde(rename = "l")]
    pub layer: Layer,
    /// Asset this piece instances.
    #[serde(rename = "a")]
    pub asset: AssetId,
    /// Center x in room pixels.
    pub x: i64,
    /// Center y in room pixels.
    pub y: i64,
    /// Layer-local stacking order.
    pub z: i64,
    /// Width in grid units (1–32).
    pub w: u32,
    /// Height in grid units (1–32).
    pub h: u32,
    /// Rotation in degrees, `[0, 360)`.
    #[serde(rename = "r", skip_serializing_if = "is_zero_u16")]
    pub rot: u16,
    /// Current side index, `[0, meta.sides)`.
    #[serde(rename = "s", skip_serializing_if = "is_zero_u16")]
    pub side: u16,
    /// `[fill, border]` color indices; 0 means none/default.
    #[serde(rename = "c", skip_serializing_if = "is_default_color")]
    pub color: [u8; 2],
    /// Token letter/number; 0 means none.
    #[serde(rename = "n", skip_serializing_if = "is_zero_u8")]
    pub num: u8,
    /// Protection and behavior flags.
    #[serde(
        rename = "f",
        serialize_with = "flag_bits",
        skip_serializing_if = "PieceFlags::is_empty"
    )]
    pub flags: PieceFlags,
    /// Label text; at most one entry.
    #[serde(rename = "t", skip_serializing_if = "Vec::is_empty")]
    pub label: Vec<String>,
    /// Badge asset ids attached to the piece.
    #[serde(rename = "b", skip_serializing_if = "Vec::is_empty")]
    pub badges: Vec<AssetId>,
    /// Expiry in epoch seconds (server clock), if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
    /// Derived metadata; never serialized.
    #[serde(skip)]
    pub meta: PieceMeta,
}

fn is_zero_u16(v: &u16) -> bool {
    *v == 0
}

fn is_zero_u8(v: &u8) -> bool {
    *v == 0
}

fn is_default_color(c: &[u8; 2]) -> bool {
    *c == [0, 0]
}

fn flag_bits<S: serde::Serializer>(f: &PieceFlags, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u8(f.bits())
}

impl Piece {
    /// The piece's center point in room pixels.
    pub fn center(&self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }

    /// The piece's axis-aligned pixel bounds, rotation included.
    ///
    /// Centered on (`x`, `y`) with the rotated footprint from
    /// [`PieceMeta`]; the result is what spatial queries intersect against.
    pub fn bounds(&self) -> Rect {
        let (w, h) = (self.meta.width_px as f64, self.meta.height_px as f64);
        let (x, y) = (self.x as f64, self.y as f64);
        Rect::new(x - w / 2.0, y - h / 2.0, x + w / 2.0, y + h / 2.0)
    }

    /// Whether this is one of the two reserved marker pieces.
    pub fn is_reserved(&self) -> bool {
        self.id.is_reserved()
    }

    /// Whether the piece may be moved by a client.
    pub fn is_movable(&self) -> bool {
        !self.flags.contains(PieceFlags::NO_MOVE)
    }
}

/// Permissive wire-shaped piece record: every field optional.
///
/// Serves both as the deserialization target for full piece records and as
/// the patch shape for partial updates. Unknown keys are ignored, garbage
/// layer names collapse to "absent", and numeric fields are deliberately
/// wide — [`populate_defaults`](crate::populate_defaults) and
/// [`sanitize_patch`](crate::sanitize_patch) bring values into range.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPiece {
    /// Piece id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PieceId>,
    /// Layer name.
    #[serde(
        default,
        rename = "l",
        deserialize_with = "lenient_layer",
        skip_serializing_if = "Option::is_none"
    )]
    pub layer: Option<Layer>,
    /// Asset id.
    #[serde(default, rename = "a", skip_serializing_if = "Option::is_none")]
    pub asset: Option<AssetId>,
    /// Center x in room pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i64>,
    /// Center y in room pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,
    /// Stacking order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<i64>,
    /// Width in grid units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<i64>,
    /// Height in grid units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<i64>,
    /// Rotation in degrees.
    #[serde(default, rename = "r", skip_serializing_if = "Option::is_none")]
    pub rot: Option<i64>,
    /// Side index.
    #[serde(default, rename = "s", skip_serializing_if = "Option::is_none")]
    pub side: Option<i64>,
    /// `[fill, border]` color indices.
    #[serde(default, rename = "c", skip_serializing_if = "Option::is_none")]
    pub color: Option<Vec<i64>>,
    /// Token letter/number.
    #[serde(default, rename = "n", skip_serializing_if = "Option::is_none")]
    pub num: Option<i64>,
    /// Flag bits.
    #[serde(default, rename = "f", skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    /// Label text.
    #[serde(default, rename = "t", skip_serializing_if = "Option::is_none")]
    pub label: Option<Vec<String>>,
    /// Badge asset ids.
    #[serde(default, rename = "b", skip_serializing_if = "Option::is_none")]
    pub badges: Option<Vec<AssetId>>,
    /// Expiry in epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
}

/// Deserialize a layer name, treating unknown names as absent rather than
/// failing the whole record.
fn lenient_layer<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Option<Layer>, D::Error> {
    let name: Option<String> = Option::deserialize(d)?;
    Ok(name.and_then(|n| n.parse().ok()))
}

impl From<&Piece> for RawPiece {
    /// Project a populated piece back onto the wire shape.
    ///
    /// Used to re-enter defaulting (which must be a no-op) and to build
    /// full-record updates.
    fn from(p: &Piece) -> Self {
        Self {
            id: Some(p.id.clone()),
            layer: Some(p.layer),
            asset: Some(p.asset.clone()),
            x: Some(p.x),
            y: Some(p.y),
            z: Some(p.z),
            w: Some(i64::from(p.w)),
            h: Some(i64::from(p.h)),
            rot: Some(i64::from(p.rot)),
            side: Some(i64::from(p.side)),
            color: Some(vec![i64::from(p.color[0]), i64::from(p.color[1])]),
            num: Some(i64::from(p.num)),
            flags: Some(u32::from(p.flags.bits())),
            label: Some(p.label.clone()),
            badges: Some(p.badges.clone()),
            expires: p.expires,
        }
    }
}
