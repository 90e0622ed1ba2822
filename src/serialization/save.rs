use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tilemap::TileMapData;

/// Snapshot of one named game object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub name: String,
    pub position: Vec2,
    #[serde(default)]
    pub velocity: Vec2,
    /// Name of the animation clip that was playing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
}

/// A saved game: entity snapshots plus an optional copy of the level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    pub version: u32,
    #[serde(default)]
    pub entities: Vec<EntityState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilemap: Option<TileMapData>,
}

impl SaveState {
    pub const VERSION: u32 = 1;

    pub fn new() -> Self {
        Self { version: Self::VERSION, entities: Vec::new(), tilemap: None }
    }

    pub fn entity(&self, name: &str) -> Option<&EntityState> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        super::save(path, self)
    }

    /// Load a save, rejecting files written by a newer version.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let state: Self = super::load(path)?;
        super::check_version(path, state.version, Self::VERSION)?;
        if let Some(map) = &state.tilemap {
            map.validate()?;
        }
        Ok(state)
    }
}

impl Default for SaveState {
    fn default() -> Self {
        Self::new()
    }
}
