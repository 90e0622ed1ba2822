// =============================================================================
// GEOMETRY.RS: shared 2D primitives
//
// - Rect: axis-aligned rectangle in world pixels (y grows downward)
// - Bresenham grid walking, used for tile line-of-sight and raycasts
// =============================================================================

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle. `(x, y)` is the top-left corner.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            x: center.x - half_extents.x,
            y: center.y - half_extents.y,
            w: half_extents.x * 2.0,
            h: half_extents.y * 2.0,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.w * 0.5, self.h * 0.5)
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Strict overlap. Rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = self.right().min(other.right());
        let b = self.bottom().min(other.bottom());
        Some(Rect::new(x, y, r - x, b - y))
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let r = self.right().max(other.right());
        let b = self.bottom().max(other.bottom());
        Rect::new(x, y, r - x, b - y)
    }

    /// Grow by `amount` on every side.
    pub fn expand(&self, amount: f32) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.w + amount * 2.0,
            self.h + amount * 2.0,
        )
    }
}

// =============================================================================
// BRESENHAM'S LINE ALGORITHM
// =============================================================================

/// Walk every grid cell on the line from (x1, y1) to (x2, y2), endpoints
/// included, calling `callback` for each. Stops early if it returns false.
///
/// Returns true if the walk reached the end point.
pub fn walk_line(
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    mut callback: impl FnMut(i32, i32) -> bool,
) -> bool {
    let dx = (x2 - x1).abs();
    let dy = (y2 - y1).abs();
    let sx = if x1 < x2 { 1 } else { -1 };
    let sy = if y1 < y2 { 1 } else { -1 };

    let mut x = x1;
    let mut y = y1;
    let mut err = dx - dy;

    loop {
        if !callback(x, y) {
            return false;
        }

        if x == x2 && y == y2 {
            break;
        }

        let e2 = 2 * err;

        if e2 > -dy {
            err -= dy;
            x += sx;
        }

        if e2 < dx {
            err += dx;
            y += sy;
        }
    }

    true
}

/// Collect the cells of a Bresenham line, both endpoints included.
pub fn line(x1: i32, y1: i32, x2: i32, y2: i32) -> Vec<(i32, i32)> {
    let mut points = Vec::new();
    walk_line(x1, y1, x2, y2, |x, y| {
        points.push((x, y));
        true
    });
    points
}
