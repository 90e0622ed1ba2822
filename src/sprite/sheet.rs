use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Rect;

use super::TextureId;

/// A grid of equally sized frames inside one texture.
///
/// Frames are numbered row-major from the top-left, skipping `margin`
/// pixels around the border and `spacing` pixels between cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpriteSheet {
    pub texture: TextureId,
    pub texture_w: u32,
    pub texture_h: u32,
    pub frame_w: u32,
    pub frame_h: u32,
    pub margin: u32,
    pub spacing: u32,
    pub cols: u32,
    pub rows: u32,
}

impl SpriteSheet {
    pub fn from_grid(
        texture: TextureId,
        texture_w: u32,
        texture_h: u32,
        frame_w: u32,
        frame_h: u32,
        margin: u32,
        spacing: u32,
    ) -> Result<Self> {
        if frame_w == 0 || frame_h == 0 {
            return Err(Error::InvalidSheet(format!(
                "frame size {frame_w}x{frame_h} must be non-zero"
            )));
        }
        let cols = fit_count(texture_w, frame_w, margin, spacing);
        let rows = fit_count(texture_h, frame_h, margin, spacing);
        if cols == 0 || rows == 0 {
            return Err(Error::InvalidSheet(format!(
                "no {frame_w}x{frame_h} frame fits in a {texture_w}x{texture_h} texture"
            )));
        }
        Ok(Self {
            texture,
            texture_w,
            texture_h,
            frame_w,
            frame_h,
            margin,
            spacing,
            cols,
            rows,
        })
    }

    pub fn frame_count(&self) -> u32 {
        self.cols * self.rows
    }

    /// Pixel rectangle of frame `index`, or `None` past the last frame.
    pub fn frame_rect(&self, index: u32) -> Option<Rect> {
        if index >= self.frame_count() {
            return None;
        }
        let col = index % self.cols;
        let row = index / self.cols;
        let x = self.margin + col * (self.frame_w + self.spacing);
        let y = self.margin + row * (self.frame_h + self.spacing);
        Some(Rect::new(x as f32, y as f32, self.frame_w as f32, self.frame_h as f32))
    }

    /// Returns `(uv_min, uv_max)` for frame `index`.
    pub fn frame_uv(&self, index: u32) -> Option<([f32; 2], [f32; 2])> {
        let r = self.frame_rect(index)?;
        let tw = self.texture_w as f32;
        let th = self.texture_h as f32;
        Some(([r.x / tw, r.y / th], [r.right() / tw, r.bottom() / th]))
    }
}

fn fit_count(total: u32, frame: u32, margin: u32, spacing: u32) -> u32 {
    let usable = total.saturating_sub(margin * 2);
    if usable < frame {
        return 0;
    }
    // n frames need n*frame + (n-1)*spacing pixels.
    (usable + spacing) / (frame + spacing)
}
