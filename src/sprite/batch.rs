use std::collections::HashSet;
use std::ops::Range;

use glam::Vec2;

use super::{Sprite, TextureCache, TextureId};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

/// One GPU draw: a texture binding plus a contiguous index range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawCall {
    pub texture: TextureId,
    pub index_range: Range<u32>,
}

struct QueuedQuad {
    layer: i32,
    texture: TextureId,
    vertices: [SpriteVertex; 4],
}

/// Collects sprites for one frame and turns them into batched geometry.
///
/// Usage: `begin()`, any number of `draw()` calls, then `finish()`. After
/// `finish()` the vertex, index and draw-call slices are ready for upload.
#[derive(Default)]
pub struct SpriteBatch {
    queued: Vec<QueuedQuad>,
    vertices: Vec<SpriteVertex>,
    indices: Vec<u32>,
    draw_calls: Vec<DrawCall>,
    warned: HashSet<TextureId>,
}

impl SpriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) {
        self.queued.clear();
        self.vertices.clear();
        self.indices.clear();
        self.draw_calls.clear();
    }

    /// Queue a sprite. Invisible sprites and sprites whose texture is not in
    /// `cache` are skipped; a missing texture is logged once.
    pub fn draw(&mut self, sprite: &Sprite, cache: &TextureCache) {
        if !sprite.visible {
            return;
        }
        let Some((tex_w, tex_h)) = cache.size_of(sprite.texture) else {
            if self.warned.insert(sprite.texture) {
                log::warn!("sprite batch: texture {:?} is not cached; sprite skipped", sprite.texture);
            }
            return;
        };
        self.queued.push(QueuedQuad {
            layer: sprite.layer,
            texture: sprite.texture,
            vertices: build_quad(sprite, tex_w, tex_h),
        });
    }

    /// Sort by layer and build vertex/index buffers plus draw calls.
    pub fn finish(&mut self) {
        // Stable: equal layers keep submission order.
        self.queued.sort_by_key(|q| q.layer);

        self.vertices.reserve(self.queued.len() * 4);
        self.indices.reserve(self.queued.len() * 6);

        for q in &self.queued {
            let base = self.vertices.len() as u32;
            self.vertices.extend_from_slice(&q.vertices);
            let start = self.indices.len() as u32;
            self.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
            let end = self.indices.len() as u32;

            match self.draw_calls.last_mut() {
                Some(call) if call.texture == q.texture => call.index_range.end = end,
                _ => self.draw_calls.push(DrawCall { texture: q.texture, index_range: start..end }),
            }
        }
        self.queued.clear();
    }

    pub fn vertices(&self) -> &[SpriteVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draw_calls
    }

    /// Number of sprites queued since the last `begin()` / `finish()`.
    pub fn pending(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Corners in order top-left, top-right, bottom-right, bottom-left.
pub fn build_quad(sprite: &Sprite, tex_w: u32, tex_h: u32) -> [SpriteVertex; 4] {
    let src = sprite.source_rect(tex_w, tex_h);
    let size = Vec2::new(src.w * sprite.scale.x, src.h * sprite.scale.y);
    let pivot = sprite.origin * size;

    let (sin, cos) = sprite.rotation.sin_cos();
    let corners = [
        Vec2::new(0.0, 0.0),
        Vec2::new(size.x, 0.0),
        Vec2::new(size.x, size.y),
        Vec2::new(0.0, size.y),
    ];

    let tw = tex_w.max(1) as f32;
    let th = tex_h.max(1) as f32;
    let (mut u0, mut u1) = (src.x / tw, src.right() / tw);
    let (mut v0, mut v1) = (src.y / th, src.bottom() / th);
    if sprite.flip_x {
        std::mem::swap(&mut u0, &mut u1);
    }
    if sprite.flip_y {
        std::mem::swap(&mut v0, &mut v1);
    }
    let uvs = [[u0, v0], [u1, v0], [u1, v1], [u0, v1]];

    let color = sprite.tint.0;
    let mut out = [SpriteVertex { position: [0.0; 2], uv: [0.0; 2], color }; 4];
    for (i, corner) in corners.iter().enumerate() {
        let local = *corner - pivot;
        let rotated = Vec2::new(local.x * cos - local.y * sin, local.x * sin + local.y * cos);
        let world = rotated + sprite.position;
        out[i] = SpriteVertex { position: [world.x, world.y], uv: uvs[i], color };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn sprite() -> Sprite {
        Sprite::new(TextureId(0))
    }

    #[test]
    fn quad_centred_on_position_with_default_origin() {
        let s = sprite().with_position(Vec2::new(100.0, 50.0));
        let q = build_quad(&s, 16, 8);
        assert_eq!(q[0].position, [92.0, 46.0]);
        assert_eq!(q[2].position, [108.0, 54.0]);
    }

    #[test]
    fn quad_uses_source_rect_for_uv() {
        let s = sprite().with_source(Rect::new(16.0, 0.0, 16.0, 16.0));
        let q = build_quad(&s, 64, 16);
        assert_eq!(q[0].uv, [0.25, 0.0]);
        assert_eq!(q[2].uv, [0.5, 1.0]);
    }

    #[test]
    fn flip_x_swaps_horizontal_uv() {
        let mut s = sprite();
        s.flip_x = true;
        let q = build_quad(&s, 32, 32);
        assert_eq!(q[0].uv, [1.0, 0.0]);
        assert_eq!(q[1].uv, [0.0, 0.0]);
    }

    #[test]
    fn quarter_turn_rotates_about_pivot() {
        let mut s = sprite().with_origin(Vec2::ZERO);
        s.rotation = std::f32::consts::FRAC_PI_2;
        let q = build_quad(&s, 10, 10);
        // Top-right corner (10, 0) rotates to (0, 10).
        assert!((q[1].position[0]).abs() < 1e-5);
        assert!((q[1].position[1] - 10.0).abs() < 1e-5);
    }
}
