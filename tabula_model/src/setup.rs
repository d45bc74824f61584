// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Room-wide configuration: grid template, palettes, and room geometry.
//!
//! Everything here is read-only from the engine's point of view. Template
//! edits arrive from outside between calls, which is why operations take a
//! fresh [`RoomCtx`] instead of caching any of it.

use serde::{Deserialize, Serialize};
use tabula_grid::SnapLevel;

use crate::asset::Library;

/// The grid tiling a room template uses.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridKind {
    /// Square grid; pieces rotate in 90° steps.
    #[default]
    #[serde(rename = "grid-square")]
    Square,
    /// Pointy-top hex grid; pieces rotate in 60° steps.
    #[serde(rename = "grid-hex")]
    Hex,
    /// Transposed (flat-top) hex grid; pieces rotate in 60° steps.
    #[serde(rename = "grid-hex2")]
    Hex2,
}

impl GridKind {
    /// The rotation increment for pieces on this grid, in degrees.
    pub fn rot_step(self) -> u16 {
        match self {
            Self::Square => 90,
            Self::Hex | Self::Hex2 => 60,
        }
    }
}

/// A named palette color.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedColor {
    /// Display name.
    pub name: String,
    /// CSS color value.
    pub value: String,
}

/// The fixed sticky-note palette; notes ignore the room palette.
pub const STICKY_COLORS: [(&str, &str); 5] = [
    ("yellow", "#f3dc5a"),
    ("orange", "#f1a35c"),
    ("green", "#a3d164"),
    ("blue", "#64c4d1"),
    ("pink", "#e2a9e2"),
];

/// Room template settings relevant to the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Setup {
    /// Grid tiling.
    #[serde(rename = "type", default)]
    pub grid: GridKind,
    /// Pixels per grid cell.
    #[serde(rename = "gridSize", default = "default_grid_size")]
    pub grid_size: i64,
    /// Table width in cells.
    #[serde(rename = "gridWidth", default = "default_grid_width")]
    pub grid_width: u32,
    /// Table height in cells.
    #[serde(rename = "gridHeight", default = "default_grid_height")]
    pub grid_height: u32,
    /// Fill color palette.
    #[serde(default)]
    pub colors: Vec<NamedColor>,
    /// Border color palette.
    #[serde(default)]
    pub borders: Vec<NamedColor>,
    /// Snap level-of-detail (1–4), see [`SnapLevel::from_lod`].
    #[serde(rename = "snap", default = "default_snap_lod")]
    pub snap_lod: u8,
}

fn default_grid_size() -> i64 {
    64
}

fn default_grid_width() -> u32 {
    48
}

fn default_grid_height() -> u32 {
    32
}

fn default_snap_lod() -> u8 {
    3
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            grid: GridKind::Square,
            grid_size: default_grid_size(),
            grid_width: default_grid_width(),
            grid_height: default_grid_height(),
            colors: Vec::new(),
            borders: Vec::new(),
            snap_lod: default_snap_lod(),
        }
    }
}

impl Setup {
    /// The rotation increment for pieces on this template, in degrees.
    pub fn rot_step(&self) -> u16 {
        self.grid.rot_step()
    }

    /// The configured snap level.
    pub fn snap_level(&self) -> SnapLevel {
        SnapLevel::from_lod(self.snap_lod)
    }

    /// Table dimensions in pixels.
    pub fn table_size_px(&self) -> (i64, i64) {
        (
            i64::from(self.grid_width) * self.grid_size,
            i64::from(self.grid_height) * self.grid_size,
        )
    }
}

/// Room identity and pixel bounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Room id.
    #[serde(default)]
    pub id: String,
    /// Room name.
    #[serde(default)]
    pub name: String,
    /// Room width in pixels.
    pub width: i64,
    /// Room height in pixels.
    pub height: i64,
}

impl Default for Room {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            width: 3072,
            height: 2048,
        }
    }
}

/// Borrowed bundle of the read-only room state an operation needs.
///
/// Assembled fresh per call by the composing application from its setup,
/// room, and library providers, so template edits are always visible.
/// `server_time` is the epoch-seconds reference from the latest backend
/// response headers, used to correct piece expiry for client/server clock
/// skew.
#[derive(Copy, Clone, Debug)]
pub struct RoomCtx<'a> {
    /// Template settings.
    pub setup: &'a Setup,
    /// Room geometry.
    pub room: &'a Room,
    /// Asset library.
    pub library: &'a Library,
    /// Server clock reference in epoch seconds, if known.
    pub server_time: Option<i64>,
}

impl<'a> RoomCtx<'a> {
    /// Bundle setup, room, and library without a server-time reference.
    pub fn new(setup: &'a Setup, room: &'a Room, library: &'a Library) -> Self {
        Self {
            setup,
            room,
            library,
            server_time: None,
        }
    }

    /// Attach the server clock reference from response headers.
    pub fn with_server_time(self, server_time: i64) -> Self {
        Self {
            server_time: Some(server_time),
            ..self
        }
    }
}
