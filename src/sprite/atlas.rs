use std::collections::{HashMap, HashSet};
use std::path::Path;

use image::RgbaImage;

use crate::error::{Error, Result};
use crate::geometry::Rect;

use super::{TextureCache, TextureId};

// ── Shelf packing (pure, GPU-free) ───────────────────────────────────────────

/// One image's position inside the packed atlas.
#[derive(Debug, PartialEq)]
pub struct PlacedSprite {
    pub name: String,
    /// Top-left pixel coordinate inside the atlas.
    pub atlas_x: u32,
    pub atlas_y: u32,
    pub pixel_w: u32,
    pub pixel_h: u32,
}

/// Shelf-pack `(name, pixel_w, pixel_h)` items into rows of at most `max_width`.
///
/// Items are placed tallest-first. Duplicate names keep only their first
/// (tallest-sorted) occurrence and items wider than `max_width` are skipped.
///
/// Returns `(placements, atlas_pixel_width, atlas_pixel_height)`, both atlas
/// dimensions rounded up to the next power of two.
pub fn pack(items: &[(String, u32, u32)], max_width: u32) -> (Vec<PlacedSprite>, u32, u32) {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| items[b].2.cmp(&items[a].2));

    let mut placed_names: HashSet<&str> = HashSet::new();
    let mut placements: Vec<PlacedSprite> = Vec::new();
    let mut cur_x = 0u32;
    let mut cur_y = 0u32;
    let mut row_h = 0u32;

    for &i in &order {
        let (ref name, w, h) = items[i];

        if !placed_names.insert(name.as_str()) {
            continue;
        }

        if w > max_width {
            log::warn!("atlas: '{name}' is wider ({w}px) than the atlas ({max_width}px); skipping");
            continue;
        }

        if cur_x + w > max_width {
            cur_y += row_h;
            cur_x = 0;
            row_h = 0;
        }

        placements.push(PlacedSprite {
            name: name.clone(),
            atlas_x: cur_x,
            atlas_y: cur_y,
            pixel_w: w,
            pixel_h: h,
        });
        cur_x += w;
        row_h = row_h.max(h);
    }

    let used_h = cur_y + row_h;
    let atlas_h = used_h.next_power_of_two().max(1);
    let atlas_w = max_width.next_power_of_two();
    (placements, atlas_w, atlas_h)
}

// ── SpriteAtlas ──────────────────────────────────────────────────────────────

/// Many small images composited into one cached texture, addressed by name.
pub struct SpriteAtlas {
    pub texture: TextureId,
    pub width: u32,
    pub height: u32,
    regions: HashMap<String, Rect>,
}

impl SpriteAtlas {
    /// Maximum row width of the packed atlas texture in pixels.
    pub const ATLAS_WIDTH: u32 = 512;

    /// Scan `path` recursively for `.png` files and pack them under `key`.
    ///
    /// The file stem is the region name. The first file with a given stem
    /// wins. Files that fail to decode are logged and skipped.
    pub fn from_folder<P: AsRef<Path>>(cache: &mut TextureCache, path: P, key: &str) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(Error::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "sprite folder not found"),
            ));
        }

        let mut loaded: Vec<(String, RgbaImage)> = Vec::new();
        let mut seen_names: HashSet<String> = HashSet::new();

        for entry in walkdir::WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let file_path = entry.path();
            if file_path.extension().and_then(|s| s.to_str()) != Some("png") {
                continue;
            }
            let Some(name) = file_path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            if !seen_names.insert(name.to_string()) {
                log::warn!("atlas: duplicate name '{name}' from {file_path:?}; skipping");
                continue;
            }

            match image::open(file_path) {
                Ok(img) => loaded.push((name.to_string(), img.to_rgba8())),
                Err(e) => log::warn!("atlas: failed to load {file_path:?}: {e}"),
            }
        }

        Ok(Self::from_images(cache, key, loaded))
    }

    /// Pack already-decoded images under `key`.
    pub fn from_images(cache: &mut TextureCache, key: &str, images: Vec<(String, RgbaImage)>) -> Self {
        let dims: Vec<(String, u32, u32)> = images
            .iter()
            .map(|(name, img)| (name.clone(), img.width(), img.height()))
            .collect();

        let (placements, atlas_w, atlas_h) = pack(&dims, Self::ATLAS_WIDTH);
        let mut atlas_img = RgbaImage::new(atlas_w, atlas_h);
        let lookup: HashMap<&str, &RgbaImage> = images.iter().map(|(n, i)| (n.as_str(), i)).collect();

        let mut regions = HashMap::new();
        for p in &placements {
            let Some(img) = lookup.get(p.name.as_str()) else { continue };
            // Overwrite is fine: placements never overlap.
            image::imageops::replace(&mut atlas_img, *img, p.atlas_x as i64, p.atlas_y as i64);
            regions.insert(
                p.name.clone(),
                Rect::new(p.atlas_x as f32, p.atlas_y as f32, p.pixel_w as f32, p.pixel_h as f32),
            );
        }

        log::info!("atlas '{key}': packed {} images into {atlas_w}x{atlas_h}", regions.len());
        let texture = cache.insert_image(key, atlas_img);
        Self { texture, width: atlas_w, height: atlas_h, regions }
    }

    /// Pixel rectangle of region `name` inside the atlas texture.
    pub fn region(&self, name: &str) -> Option<Rect> {
        self.regions.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, w: u32, h: u32) -> (String, u32, u32) {
        (name.to_string(), w, h)
    }

    #[test]
    fn pack_empty_input_returns_no_placements() {
        let (placements, atlas_w, atlas_h) = pack(&[], 512);
        assert!(placements.is_empty());
        assert_eq!(atlas_h, 1);
        assert_eq!(atlas_w, 512);
    }

    #[test]
    fn pack_wraps_to_next_shelf_when_row_full() {
        let items = [item("a", 200, 32), item("b", 200, 32), item("c", 200, 32)];
        let (pl, _, atlas_h) = pack(&items, 512);
        assert_eq!(pl.len(), 3);
        let row1: Vec<_> = pl.iter().filter(|p| p.atlas_y > 0).collect();
        assert_eq!(row1.len(), 1, "third item wraps to row 1");
        assert_eq!(row1[0].atlas_y, 32);
        assert_eq!(atlas_h, 64);
    }

    #[test]
    fn pack_skips_duplicates_and_oversized() {
        let items = [item("a", 16, 16), item("a", 16, 32), item("huge", 600, 8)];
        let (pl, _, _) = pack(&items, 512);
        assert_eq!(pl.len(), 1);
        // Tallest-first sort means the 32px duplicate wins.
        assert_eq!(pl[0].pixel_h, 32);
    }
}
