use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::serialization;

use super::{TileLayer, TileMap};

/// Marks an empty cell in serialized layer data.
pub const EMPTY_TILE: i64 = -1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileLayerData {
    pub name: String,
    #[serde(default)]
    pub z: i32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Row-major tile ids, `-1` for empty cells.
    pub tiles: Vec<i64>,
}

fn default_visible() -> bool {
    true
}

/// Document form of a [`TileMap`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileMapData {
    pub width: u32,
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    #[serde(default)]
    pub collision_layer: String,
    pub layers: Vec<TileLayerData>,
}

impl TileMapData {
    pub fn validate(&self) -> Result<()> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(Error::InvalidTileMap("tile size must be non-zero".into()));
        }
        let expected = self.width as usize * self.height as usize;
        for layer in &self.layers {
            if layer.tiles.len() != expected {
                return Err(Error::InvalidTileMap(format!(
                    "layer '{}' has {} tiles, expected {}x{} = {}",
                    layer.name,
                    layer.tiles.len(),
                    self.width,
                    self.height,
                    expected
                )));
            }
            if let Some(bad) = layer.tiles.iter().find(|&&t| t < EMPTY_TILE || t > u32::MAX as i64) {
                return Err(Error::InvalidTileMap(format!("layer '{}' has invalid tile id {bad}", layer.name)));
            }
        }
        if !self.collision_layer.is_empty() && !self.layers.iter().any(|l| l.name == self.collision_layer) {
            log::warn!("tilemap: collision layer '{}' does not exist", self.collision_layer);
        }
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data: Self = serialization::load(path)?;
        data.validate()?;
        Ok(data)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        serialization::save(path, self)
    }
}

impl TileMap {
    pub fn from_data(data: &TileMapData) -> Result<Self> {
        data.validate()?;
        let mut map = TileMap::new(data.width, data.height, data.tile_width, data.tile_height);
        map.collision_layer = data.collision_layer.clone();
        map.layers = data
            .layers
            .iter()
            .map(|l| TileLayer {
                name: l.name.clone(),
                tiles: l.tiles.iter().map(|&t| u32::try_from(t).ok()).collect(),
                visible: l.visible,
                z: l.z,
            })
            .collect();
        Ok(map)
    }

    pub fn to_data(&self) -> TileMapData {
        TileMapData {
            width: self.width,
            height: self.height,
            tile_width: self.tile_w,
            tile_height: self.tile_h,
            collision_layer: self.collision_layer.clone(),
            layers: self
                .layers
                .iter()
                .map(|l| TileLayerData {
                    name: l.name.clone(),
                    z: l.z,
                    visible: l.visible,
                    tiles: l.tiles.iter().map(|t| t.map_or(EMPTY_TILE, i64::from)).collect(),
                })
                .collect(),
        }
    }
}
