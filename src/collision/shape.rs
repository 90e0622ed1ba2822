use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Collider geometry, positioned by its center.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Aabb { half_extents: Vec2 },
    Circle { radius: f32 },
}

impl Shape {
    pub fn bounds(&self, center: Vec2) -> Rect {
        match *self {
            Shape::Aabb { half_extents } => Rect::from_center(center, half_extents),
            Shape::Circle { radius } => Rect::from_center(center, Vec2::splat(radius)),
        }
    }

    pub fn contains_point(&self, center: Vec2, p: Vec2) -> bool {
        let d = p - center;
        match *self {
            Shape::Aabb { half_extents } => d.x.abs() <= half_extents.x && d.y.abs() <= half_extents.y,
            Shape::Circle { radius } => d.length_squared() <= radius * radius,
        }
    }
}

/// Overlap between two shapes. `normal` is a unit vector pointing from the
/// first shape toward the second; `depth` is the penetration along it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact {
    pub normal: Vec2,
    pub depth: f32,
}

impl Contact {
    fn flipped(self) -> Self {
        Self { normal: -self.normal, depth: self.depth }
    }
}

/// Narrow-phase test. Shapes that only touch (zero depth) do not collide.
pub fn test(a: &Shape, pa: Vec2, b: &Shape, pb: Vec2) -> Option<Contact> {
    match (*a, *b) {
        (Shape::Aabb { half_extents: ha }, Shape::Aabb { half_extents: hb }) => aabb_aabb(pa, ha, pb, hb),
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => circle_circle(pa, ra, pb, rb),
        (Shape::Aabb { half_extents }, Shape::Circle { radius }) => aabb_circle(pa, half_extents, pb, radius),
        (Shape::Circle { radius }, Shape::Aabb { half_extents }) => {
            aabb_circle(pb, half_extents, pa, radius).map(Contact::flipped)
        }
    }
}

#[inline]
fn sign(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}

fn aabb_aabb(pa: Vec2, ha: Vec2, pb: Vec2, hb: Vec2) -> Option<Contact> {
    let d = pb - pa;
    let ox = ha.x + hb.x - d.x.abs();
    let oy = ha.y + hb.y - d.y.abs();
    if ox <= 0.0 || oy <= 0.0 {
        return None;
    }
    // Separate along the axis of least penetration.
    if ox < oy {
        Some(Contact { normal: Vec2::new(sign(d.x), 0.0), depth: ox })
    } else {
        Some(Contact { normal: Vec2::new(0.0, sign(d.y)), depth: oy })
    }
}

fn circle_circle(pa: Vec2, ra: f32, pb: Vec2, rb: f32) -> Option<Contact> {
    let d = pb - pa;
    let r = ra + rb;
    let dist_sq = d.length_squared();
    if dist_sq >= r * r {
        return None;
    }
    let dist = dist_sq.sqrt();
    if dist == 0.0 {
        // Concentric: any direction works, pick +X.
        return Some(Contact { normal: Vec2::X, depth: r });
    }
    Some(Contact { normal: d / dist, depth: r - dist })
}

fn aabb_circle(pa: Vec2, h: Vec2, pc: Vec2, r: f32) -> Option<Contact> {
    let d = pc - pa;
    let closest = d.clamp(-h, h);

    if closest != d {
        let diff = d - closest;
        let dist_sq = diff.length_squared();
        if dist_sq >= r * r {
            return None;
        }
        let dist = dist_sq.sqrt();
        return Some(Contact { normal: diff / dist, depth: r - dist });
    }

    // Center inside the box: push out through the nearest face.
    let dx = h.x - d.x.abs();
    let dy = h.y - d.y.abs();
    if dx < dy {
        Some(Contact { normal: Vec2::new(sign(d.x), 0.0), depth: dx + r })
    } else {
        Some(Contact { normal: Vec2::new(0.0, sign(d.y)), depth: dy + r })
    }
}
