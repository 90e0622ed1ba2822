//! Layered grid maps: culled drawing, solidity queries, collider extraction
//! and tile raycasts.

pub mod data;
pub mod tileset;

pub use data::{TileLayerData, TileMapData};
pub use tileset::{TileProps, Tileset};

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

use glam::Vec2;

use crate::error::{Error, Result};
use crate::geometry::{Rect, walk_line};
use crate::sprite::{Sprite, SpriteBatch, TextureCache};

/// Frame index of a tile in its tileset's sheet.
pub type TileId = u32;

#[derive(Clone, Debug, PartialEq)]
pub struct TileLayer {
    pub name: String,
    /// Row-major, `width * height` entries.
    pub tiles: Vec<Option<TileId>>,
    pub visible: bool,
    /// Sprite layer used when drawing.
    pub z: i32,
}

impl TileLayer {
    /// Missing cells (a resized `tiles`) read as empty.
    fn tile_at(&self, i: usize) -> Option<TileId> {
        self.tiles.get(i).copied().flatten()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TileMap {
    width: u32,
    height: u32,
    pub tile_w: u32,
    pub tile_h: u32,
    layers: Vec<TileLayer>,
    /// Name of the layer consulted by solidity queries.
    pub collision_layer: String,
}

impl TileMap {
    pub fn new(width: u32, height: u32, tile_w: u32, tile_h: u32) -> Self {
        Self {
            width,
            height,
            tile_w: tile_w.max(1),
            tile_h: tile_h.max(1),
            layers: Vec::new(),
            collision_layer: String::new(),
        }
    }

    /// Build a single-layer map from text rows. Characters missing from
    /// `legend` become empty cells. The layer is also the collision layer.
    pub fn from_rows(
        rows: &[&str],
        legend: &HashMap<char, TileId>,
        tile_w: u32,
        tile_h: u32,
    ) -> Result<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.chars().count()) as u32;
        if width == 0 || height == 0 {
            return Err(Error::InvalidTileMap("no rows".into()));
        }
        if let Some((y, _)) = rows.iter().enumerate().find(|(_, r)| r.chars().count() as u32 != width) {
            return Err(Error::InvalidTileMap(format!("row {y} is not {width} tiles wide")));
        }

        let mut map = Self::new(width, height, tile_w, tile_h);
        let layer = map.add_layer("ground", 0);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                map.set(layer, x as i32, y as i32, legend.get(&ch).copied());
            }
        }
        map.collision_layer = "ground".into();
        Ok(map)
    }

    /// Cell coordinates of every occurrence of `marker` in text rows.
    pub fn find_markers(rows: &[&str], marker: char) -> Vec<(i32, i32)> {
        rows.iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.chars()
                    .enumerate()
                    .filter(move |(_, c)| *c == marker)
                    .map(move |(x, _)| (x as i32, y as i32))
            })
            .collect()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Map size in world pixels.
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new((self.width * self.tile_w) as f32, (self.height * self.tile_h) as f32)
    }

    // -- Layers -------------------------------------------------------------

    /// Append an empty layer and return its index.
    pub fn add_layer(&mut self, name: &str, z: i32) -> usize {
        self.layers.push(TileLayer {
            name: name.to_string(),
            tiles: vec![None; (self.width * self.height) as usize],
            visible: true,
            z,
        });
        self.layers.len() - 1
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    pub fn layer_index(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name == name)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut TileLayer> {
        self.layers.get_mut(index)
    }

    // -- Cells --------------------------------------------------------------

    fn cell(&self, tx: i32, ty: i32) -> Option<usize> {
        if tx < 0 || ty < 0 || tx as u32 >= self.width || ty as u32 >= self.height {
            return None;
        }
        Some(ty as usize * self.width as usize + tx as usize)
    }

    pub fn in_bounds(&self, tx: i32, ty: i32) -> bool {
        self.cell(tx, ty).is_some()
    }

    /// Returns false when the layer or cell does not exist.
    pub fn set(&mut self, layer: usize, tx: i32, ty: i32, tile: Option<TileId>) -> bool {
        let Some(i) = self.cell(tx, ty) else { return false };
        let Some(slot) = self.layers.get_mut(layer).and_then(|l| l.tiles.get_mut(i)) else {
            return false;
        };
        *slot = tile;
        true
    }

    pub fn get(&self, layer: usize, tx: i32, ty: i32) -> Option<TileId> {
        let i = self.cell(tx, ty)?;
        self.layers.get(layer)?.tile_at(i)
    }

    // -- Coordinates --------------------------------------------------------

    pub fn world_to_tile(&self, world: Vec2) -> (i32, i32) {
        (
            (world.x / self.tile_w as f32).floor() as i32,
            (world.y / self.tile_h as f32).floor() as i32,
        )
    }

    /// Top-left corner of a tile in world pixels.
    pub fn tile_to_world(&self, tx: i32, ty: i32) -> Vec2 {
        Vec2::new((tx * self.tile_w as i32) as f32, (ty * self.tile_h as i32) as f32)
    }

    pub fn tile_center(&self, tx: i32, ty: i32) -> Vec2 {
        self.tile_to_world(tx, ty) + Vec2::new(self.tile_w as f32, self.tile_h as f32) * 0.5
    }

    pub fn tile_rect(&self, tx: i32, ty: i32) -> Rect {
        let p = self.tile_to_world(tx, ty);
        Rect::new(p.x, p.y, self.tile_w as f32, self.tile_h as f32)
    }

    // -- Culling & drawing --------------------------------------------------

    /// Tile ranges overlapping `view`, clamped to the map. Partially
    /// visible tiles are included.
    pub fn visible_range(&self, view: Rect) -> (Range<i32>, Range<i32>) {
        let tw = self.tile_w as f32;
        let th = self.tile_h as f32;
        let x0 = ((view.x / tw).floor() as i32).max(0);
        let y0 = ((view.y / th).floor() as i32).max(0);
        let x1 = ((view.right() / tw).ceil() as i32).min(self.width as i32);
        let y1 = ((view.bottom() / th).ceil() as i32).min(self.height as i32);
        (x0..x1.max(x0), y0..y1.max(y0))
    }

    /// Queue every visible tile of every visible layer. Returns the number
    /// of sprites queued.
    pub fn draw(&self, batch: &mut SpriteBatch, tileset: &Tileset, cache: &TextureCache, view: Rect) -> usize {
        let (xs, ys) = self.visible_range(view);
        let mut drawn = 0;
        for layer in self.layers.iter().filter(|l| l.visible) {
            for ty in ys.clone() {
                for tx in xs.clone() {
                    let Some(id) = layer.tile_at(ty as usize * self.width as usize + tx as usize) else {
                        continue;
                    };
                    let Some(src) = tileset.sheet.frame_rect(id) else { continue };
                    let mut sprite = Sprite::new(tileset.sheet.texture)
                        .with_source(src)
                        .with_origin(Vec2::ZERO)
                        .with_position(self.tile_to_world(tx, ty))
                        .with_layer(layer.z);
                    sprite.scale = Vec2::new(self.tile_w as f32 / src.w, self.tile_h as f32 / src.h);
                    batch.draw(&sprite, cache);
                    drawn += 1;
                }
            }
        }
        drawn
    }

    // -- Solidity -----------------------------------------------------------

    /// Out-of-bounds cells count as solid so nothing walks off the map.
    pub fn is_solid(&self, tileset: &Tileset, tx: i32, ty: i32) -> bool {
        let Some(i) = self.cell(tx, ty) else { return true };
        let Some(layer) = self.layers.iter().find(|l| l.name == self.collision_layer) else {
            return false;
        };
        layer.tile_at(i).is_some_and(|id| tileset.is_solid(id))
    }

    /// Solid tiles merged into as few rectangles as a greedy pass finds:
    /// horizontal runs per row, then identical runs stacked across rows.
    pub fn solid_colliders(&self, tileset: &Tileset) -> Vec<Rect> {
        // (x0, x1) run → (first row, rows so far)
        let mut open: BTreeMap<(i32, i32), (i32, i32)> = BTreeMap::new();
        let mut cells: Vec<(i32, i32, i32, i32)> = Vec::new();

        for ty in 0..self.height as i32 {
            let mut runs = Vec::new();
            let mut tx = 0;
            while tx < self.width as i32 {
                if self.is_solid(tileset, tx, ty) {
                    let start = tx;
                    while tx < self.width as i32 && self.is_solid(tileset, tx, ty) {
                        tx += 1;
                    }
                    runs.push((start, tx));
                } else {
                    tx += 1;
                }
            }

            let mut next_open = BTreeMap::new();
            for run in runs {
                let (start_y, rows) = open.remove(&run).unwrap_or((ty, 0));
                next_open.insert(run, (start_y, rows + 1));
            }
            for ((x0, x1), (y0, rows)) in std::mem::replace(&mut open, next_open) {
                cells.push((x0, y0, x1 - x0, rows));
            }
        }
        for ((x0, x1), (y0, rows)) in open {
            cells.push((x0, y0, x1 - x0, rows));
        }

        cells.sort_by_key(|&(x, y, _, _)| (y, x));
        let tw = self.tile_w as f32;
        let th = self.tile_h as f32;
        cells
            .into_iter()
            .map(|(x, y, w, h)| Rect::new(x as f32 * tw, y as f32 * th, w as f32 * tw, h as f32 * th))
            .collect()
    }

    /// True if no solid tile lies strictly between the two cells.
    pub fn line_of_sight(&self, tileset: &Tileset, from: (i32, i32), to: (i32, i32)) -> bool {
        walk_line(from.0, from.1, to.0, to.1, |x, y| {
            (x, y) == from || (x, y) == to || !self.is_solid(tileset, x, y)
        })
    }

    /// First solid tile hit walking from `from` to `to` (world pixels),
    /// including the starting tile.
    pub fn raycast(&self, tileset: &Tileset, from: Vec2, to: Vec2) -> Option<(i32, i32)> {
        let (x0, y0) = self.world_to_tile(from);
        let (x1, y1) = self.world_to_tile(to);
        let mut hit = None;
        walk_line(x0, y0, x1, y1, |x, y| {
            if self.is_solid(tileset, x, y) {
                hit = Some((x, y));
                false
            } else {
                true
            }
        });
        hit
    }
}
