//! Collision detection and response.
//!
//! A frame runs in three stages: the broad phase proposes pairs whose bounds
//! overlap, layer masks filter them, and the narrow phase computes a
//! [`Contact`] for pairs that really overlap. [`CollisionWorld::step`] turns
//! the resulting contact set into enter/stay/exit events, and
//! [`resolve_contacts`] pushes attached physics bodies apart.

pub mod broadphase;
pub mod response;
pub mod shape;
pub mod world;

pub use broadphase::{BroadPhase, BroadPhaseKind, BruteForce, Proxy, SpatialHash};
pub use response::resolve_contacts;
pub use shape::{Contact, Shape};
pub use world::{CollisionEvent, CollisionWorld};

use glam::Vec2;

use crate::arena::Handle;
use crate::geometry::Rect;

/// Layer bit used by [`CollisionWorld::add_static_rects`]. Static geometry
/// does not test against itself.
pub const STATIC_LAYER: u32 = 1 << 31;

#[derive(Clone, Debug, PartialEq)]
pub struct Collider {
    pub shape: Shape,
    /// Center in world pixels.
    pub position: Vec2,
    /// Bits this collider occupies.
    pub layer: u32,
    /// Bits this collider tests against.
    pub mask: u32,
    /// Triggers report events but get no physical response.
    pub is_trigger: bool,
    /// Physics body whose position drives this collider.
    pub body: Option<Handle>,
    pub user_data: u64,
}

impl Collider {
    pub fn new(shape: Shape, position: Vec2) -> Self {
        Self {
            shape,
            position,
            layer: 1,
            mask: u32::MAX,
            is_trigger: false,
            body: None,
            user_data: 0,
        }
    }

    pub fn aabb(position: Vec2, half_extents: Vec2) -> Self {
        Self::new(Shape::Aabb { half_extents }, position)
    }

    pub fn circle(position: Vec2, radius: f32) -> Self {
        Self::new(Shape::Circle { radius }, position)
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self::aabb(rect.center(), rect.half_extents())
    }

    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    pub fn with_layer(mut self, layer: u32, mask: u32) -> Self {
        self.layer = layer;
        self.mask = mask;
        self
    }

    pub fn attached(mut self, body: Handle) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_user_data(mut self, user_data: u64) -> Self {
        self.user_data = user_data;
        self
    }

    pub fn bounds(&self) -> Rect {
        self.shape.bounds(self.position)
    }

    /// Both sides must accept each other.
    pub fn interacts(&self, other: &Collider) -> bool {
        (self.layer & other.mask) != 0 && (other.layer & self.mask) != 0
    }
}
