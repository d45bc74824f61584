// Copyright 2025 the Tabula Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Asset records and the room-scoped asset library.

use core::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::piece::{LOS_ID, Layer, POINTER_ID};

/// Opaque asset identifier, unique per room.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Wrap a raw id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is one of the reserved marker asset ids, which never
    /// appear in any library.
    pub fn is_reserved(&self) -> bool {
        self.0 == POINTER_ID || self.0 == LOS_ID
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A library entry describing one placeable thing's media and defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique asset id.
    pub id: AssetId,
    /// Alias used for name lookups.
    #[serde(default)]
    pub name: String,
    /// Ordered side image names; one entry per side.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<String>,
    /// Optional base image rendered under every side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Optional transparency mask image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
    /// Default fill color/background.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<String>,
    /// Texture/material name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx: Option<String>,
    /// Width in grid units.
    #[serde(default = "one")]
    pub w: u32,
    /// Height in grid units.
    #[serde(default = "one")]
    pub h: u32,
}

fn one() -> u32 {
    1
}

/// A surface material available to pieces in this room.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Unique material id.
    pub id: AssetId,
    /// Material name.
    pub name: String,
}

/// The wire shape of a room library: asset lists keyed by group name.
///
/// Notes have no assets, so there is no `note` group.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LibrarySources {
    /// Tile assets.
    #[serde(default)]
    pub tile: Vec<Asset>,
    /// Sticker assets.
    #[serde(default)]
    pub sticker: Vec<Asset>,
    /// Token assets.
    #[serde(default)]
    pub token: Vec<Asset>,
    /// Assets of the `other` layer.
    #[serde(default)]
    pub other: Vec<Asset>,
    /// Badge assets (attachable to pieces, not placeable).
    #[serde(default)]
    pub badge: Vec<Asset>,
    /// Materials.
    #[serde(default)]
    pub material: Vec<Material>,
}

/// Room-scoped asset library with id and alias lookup.
///
/// Built once from [`LibrarySources`]; lookups never fail hard — an
/// unknown id or alias is an expected outcome during live editing and
/// returns `None`.
#[derive(Clone, Debug, Default)]
pub struct Library {
    tiles: Vec<Asset>,
    stickers: Vec<Asset>,
    tokens: Vec<Asset>,
    others: Vec<Asset>,
    badges: Vec<Asset>,
    materials: Vec<Material>,
    by_id: HashMap<AssetId, (Layer, usize)>,
}

impl Library {
    /// The placeable group for a layer; notes have none.
    fn group(&self, layer: Layer) -> Option<&[Asset]> {
        match layer {
            Layer::Tile => Some(&self.tiles),
            Layer::Sticker => Some(&self.stickers),
            Layer::Token => Some(&self.tokens),
            Layer::Other => Some(&self.others),
            Layer::Note => None,
        }
    }

    /// Look up an asset by id, optionally scoped to one layer.
    ///
    /// A layer hint acts as a filter: an id living on a different layer is
    /// not found.
    pub fn by_id(&self, id: &AssetId, hint: Option<Layer>) -> Option<&Asset> {
        let &(layer, idx) = self.by_id.get(id)?;
        if hint.is_some_and(|h| h != layer) {
            return None;
        }
        self.group(layer).and_then(|g| g.get(idx))
    }

    /// Look up an asset by its name/alias, optionally scoped to one layer.
    ///
    /// The first match in group order wins when aliases collide across
    /// layers.
    pub fn by_name(&self, name: &str, hint: Option<Layer>) -> Option<&Asset> {
        if let Some(layer) = hint {
            return self.group(layer)?.iter().find(|a| a.name == name);
        }
        [&self.tiles, &self.stickers, &self.tokens, &self.others]
            .into_iter()
            .flat_map(|g| g.iter())
            .find(|a| a.name == name)
    }

    /// Look up a badge asset by id.
    pub fn badge(&self, id: &AssetId) -> Option<&Asset> {
        self.badges.iter().find(|b| &b.id == id)
    }

    /// All badge assets.
    pub fn badges(&self) -> &[Asset] {
        &self.badges
    }

    /// All materials.
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }
}

impl From<LibrarySources> for Library {
    fn from(src: LibrarySources) -> Self {
        let mut lib = Self {
            tiles: src.tile,
            stickers: src.sticker,
            tokens: src.token,
            others: src.other,
            badges: src.badge,
            materials: src.material,
            by_id: HashMap::new(),
        };
        for layer in [Layer::Tile, Layer::Sticker, Layer::Token, Layer::Other] {
            let Some(group) = lib.group(layer) else {
                continue;
            };
            let entries: Vec<_> = group
                .iter()
                .enumerate()
                .map(|(idx, a)| (a.id.clone(), (layer, idx)))
                .collect();
            lib.by_id.extend(entries);
        }
        lib
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: &str, name: &str) -> Asset {
        Asset {
            id: AssetId::new(id),
            name: name.into(),
            media: vec![format!("{name}.png")],
            ..Asset::default()
        }
    }

    fn library() -> Library {
        LibrarySources {
            tile: vec![asset("t1", "dungeon-floor")],
            token: vec![asset("k1", "goblin"), asset("k2", "dicemat")],
            other: vec![asset("o1", "dicemat")],
            badge: vec![asset("b1", "poisoned")],
            ..LibrarySources::default()
        }
        .into()
    }

    #[test]
    fn id_lookup_finds_assets_in_any_group() {
        let lib = library();
        assert_eq!(lib.by_id(&AssetId::new("t1"), None).unwrap().name, "dungeon-floor");
        assert_eq!(lib.by_id(&AssetId::new("o1"), None).unwrap().name, "dicemat");
        assert!(lib.by_id(&AssetId::new("nope"), None).is_none());
    }

    #[test]
    fn layer_hint_filters_id_lookup() {
        let lib = library();
        assert!(lib.by_id(&AssetId::new("k1"), Some(Layer::Token)).is_some());
        assert!(lib.by_id(&AssetId::new("k1"), Some(Layer::Tile)).is_none());
    }

    #[test]
    fn alias_lookup_prefers_earlier_groups_and_honors_hints() {
        let lib = library();
        // Unhinted: the token "dicemat" comes before the other-layer one.
        assert_eq!(lib.by_name("dicemat", None).unwrap().id, AssetId::new("k2"));
        // Hinted to the other layer, the collision resolves differently.
        assert_eq!(
            lib.by_name("dicemat", Some(Layer::Other)).unwrap().id,
            AssetId::new("o1")
        );
        assert!(lib.by_name("dicemat", Some(Layer::Tile)).is_none());
        // Notes never have assets.
        assert!(lib.by_name("dicemat", Some(Layer::Note)).is_none());
    }

    #[test]
    fn badges_are_separate_from_placeable_groups() {
        let lib = library();
        assert!(lib.badge(&AssetId::new("b1")).is_some());
        assert!(lib.by_id(&AssetId::new("b1"), None).is_none());
    }

    #[test]
    fn library_sources_deserialize_with_missing_groups() {
        let src: LibrarySources =
            serde_json::from_str(r#"{"token":[{"id":"k9","name":"orc","w":2,"h":2}]}"#)
                .expect("missing groups default to empty");
        let lib = Library::from(src);
        let orc = lib.by_id(&AssetId::new("k9"), None).expect("orc exists");
        assert_eq!((orc.w, orc.h), (2, 2));
        assert!(orc.media.is_empty());
    }
}
