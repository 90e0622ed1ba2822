pub mod atlas;
pub mod batch;
pub mod sheet;
pub mod texture;

pub use atlas::{SpriteAtlas, pack};
pub use batch::{DrawCall, SpriteBatch, SpriteVertex};
pub use sheet::SpriteSheet;
pub use texture::{CacheStats, Texture, TextureCache, TextureId};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

// ── Color ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const WHITE: Self = Self([1.0, 1.0, 1.0, 1.0]);
    pub const BLACK: Self = Self([0.0, 0.0, 0.0, 1.0]);
    pub const GRAY: Self = Self([0.6, 0.6, 0.6, 1.0]);
    pub const RED: Self = Self([1.0, 0.0, 0.0, 1.0]);
    pub const GREEN: Self = Self([0.0, 1.0, 0.0, 1.0]);
    pub const BLUE: Self = Self([0.0, 0.0, 1.0, 1.0]);
    pub const YELLOW: Self = Self([1.0, 1.0, 0.0, 1.0]);
    pub const TRANSPARENT: Self = Self([0.0, 0.0, 0.0, 0.0]);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([r, g, b, a])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

// ── Sprite ─────────────────────────────────────────────────────────────────

/// A textured quad placed in world space.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    pub texture: TextureId,
    /// Pixel sub-rectangle of the texture; `None` draws the whole texture.
    pub source: Option<Rect>,
    /// World position of the pivot.
    pub position: Vec2,
    /// Pivot inside the quad, `(0,0)` top-left to `(1,1)` bottom-right.
    pub origin: Vec2,
    pub scale: Vec2,
    /// Radians, clockwise on a y-down screen.
    pub rotation: f32,
    pub tint: Color,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Lower layers draw first.
    pub layer: i32,
    pub visible: bool,
}

impl Sprite {
    pub fn new(texture: TextureId) -> Self {
        Self {
            texture,
            source: None,
            position: Vec2::ZERO,
            origin: Vec2::splat(0.5),
            scale: Vec2::ONE,
            rotation: 0.0,
            tint: Color::WHITE,
            flip_x: false,
            flip_y: false,
            layer: 0,
            visible: true,
        }
    }

    pub fn with_source(mut self, source: Rect) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    /// Size in world pixels for a texture of `tex_w × tex_h`.
    pub fn world_size(&self, tex_w: u32, tex_h: u32) -> Vec2 {
        let src = self.source_rect(tex_w, tex_h);
        Vec2::new(src.w * self.scale.x, src.h * self.scale.y)
    }

    pub(crate) fn source_rect(&self, tex_w: u32, tex_h: u32) -> Rect {
        self.source.unwrap_or(Rect::new(0.0, 0.0, tex_w as f32, tex_h as f32))
    }
}
