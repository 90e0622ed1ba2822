use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::sprite::SpriteSheet;

use super::TileId;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TileProps {
    #[serde(default)]
    pub solid: bool,
    #[serde(default)]
    pub name: String,
}

/// Graphics and per-tile properties for a tilemap. A tile id is its frame
/// index in `sheet`.
#[derive(Clone, Debug)]
pub struct Tileset {
    pub sheet: SpriteSheet,
    tiles: HashMap<TileId, TileProps>,
}

impl Tileset {
    pub fn new(sheet: SpriteSheet) -> Self {
        Self { sheet, tiles: HashMap::new() }
    }

    pub fn set_props(&mut self, id: TileId, props: TileProps) {
        self.tiles.insert(id, props);
    }

    /// Shorthand for marking a tile solid with a name.
    pub fn with_solid(mut self, id: TileId, name: &str) -> Self {
        self.set_props(id, TileProps { solid: true, name: name.to_string() });
        self
    }

    pub fn props(&self, id: TileId) -> Option<&TileProps> {
        self.tiles.get(&id)
    }

    /// Tiles without properties are walkable.
    pub fn is_solid(&self, id: TileId) -> bool {
        self.tiles.get(&id).is_some_and(|p| p.solid)
    }
}
