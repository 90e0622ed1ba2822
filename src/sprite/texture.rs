use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque id of a texture registered in a [`TextureCache`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u32);

/// Decoded RGBA pixels shared between the cache and anything that borrowed them.
#[derive(Debug)]
pub struct Texture {
    pub image: RgbaImage,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn new(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self { image, width, height }
    }
}

/// Lookup counters, reset with [`TextureCache::clear`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Key → texture cache. Each file is decoded at most once while it stays cached.
pub struct TextureCache {
    by_key: HashMap<String, TextureId>,
    textures: HashMap<TextureId, Arc<Texture>>,
    next_id: u32,
    stats: CacheStats,
    /// Bumped on every insert / unload so GPU mirrors know when to resync.
    generation: u64,
    warned_missing: HashSet<String>,
}

/// Edge length of the generated placeholder texture.
const PLACEHOLDER_SIZE: u32 = 8;

impl TextureCache {
    pub fn new() -> Self {
        Self {
            by_key: HashMap::new(),
            textures: HashMap::new(),
            next_id: 0,
            stats: CacheStats::default(),
            generation: 0,
            warned_missing: HashSet::new(),
        }
    }

    /// Load an image file, decoding it only on the first request for `path`.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<TextureId> {
        let path = path.as_ref();
        let key = path.to_string_lossy().into_owned();
        if let Some(&id) = self.by_key.get(&key) {
            self.stats.hits += 1;
            return Ok(id);
        }
        self.stats.misses += 1;

        let img = image::open(path)
            .map_err(|source| match source {
                image::ImageError::IoError(e) => Error::io(path, e),
                other => Error::Image { path: path.to_path_buf(), source: other },
            })?
            .to_rgba8();
        log::debug!("texture: loaded '{}' ({}x{})", key, img.width(), img.height());
        Ok(self.register(key, img))
    }

    /// Like [`load`](Self::load), but a decode failure yields the checker
    /// placeholder instead of an error.
    pub fn load_or_placeholder<P: AsRef<Path>>(&mut self, path: P) -> TextureId {
        let path = path.as_ref();
        match self.load(path) {
            Ok(id) => id,
            Err(e) => {
                let key = path.to_string_lossy().into_owned();
                if self.warned_missing.insert(key.clone()) {
                    log::warn!("texture: {e}; using placeholder");
                }
                self.register(key, placeholder_image())
            }
        }
    }

    /// Register decoded pixels under `key`, replacing whatever was there.
    pub fn insert_image(&mut self, key: &str, image: RgbaImage) -> TextureId {
        if let Some(old) = self.by_key.remove(key) {
            self.textures.remove(&old);
        }
        self.register(key.to_string(), image)
    }

    /// Decode an in-memory encoded image (PNG etc.) under `key`.
    pub fn load_from_memory(&mut self, key: &str, bytes: &[u8]) -> Result<TextureId> {
        if let Some(&id) = self.by_key.get(key) {
            self.stats.hits += 1;
            return Ok(id);
        }
        self.stats.misses += 1;
        let img = image::load_from_memory(bytes)
            .map_err(|source| Error::Image { path: key.into(), source })?
            .to_rgba8();
        Ok(self.register(key.to_string(), img))
    }

    fn register(&mut self, key: String, image: RgbaImage) -> TextureId {
        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.textures.insert(id, Arc::new(Texture::new(image)));
        self.by_key.insert(key, id);
        self.generation += 1;
        id
    }

    pub fn get(&self, id: TextureId) -> Option<&Arc<Texture>> {
        self.textures.get(&id)
    }

    pub fn id_of(&self, key: &str) -> Option<TextureId> {
        self.by_key.get(key).copied()
    }

    /// Pixel size of a cached texture.
    pub fn size_of(&self, id: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&id).map(|t| (t.width, t.height))
    }

    /// Drop a texture. Outstanding `Arc<Texture>` clones stay valid.
    pub fn unload(&mut self, key: &str) -> bool {
        let Some(id) = self.by_key.remove(key) else { return false };
        self.textures.remove(&id);
        self.generation += 1;
        true
    }

    pub fn clear(&mut self) {
        self.by_key.clear();
        self.textures.clear();
        self.stats = CacheStats::default();
        self.generation += 1;
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextureId, &Arc<Texture>)> {
        self.textures.iter().map(|(id, t)| (*id, t))
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Magenta/black checkerboard so missing art is obvious on screen.
pub fn placeholder_image() -> RgbaImage {
    RgbaImage::from_fn(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, |x, y| {
        if (x / 4 + y / 4) % 2 == 0 {
            Rgba([0xFF, 0x00, 0xFF, 0xFF])
        } else {
            Rgba([0x00, 0x00, 0x00, 0xFF])
        }
    })
}
