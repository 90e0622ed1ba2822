use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Moved by forces, gravity and collision response.
    Dynamic,
    /// Moved only by its velocity; ignores forces and is never pushed.
    Kinematic,
    /// Never moves.
    Static,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RigidBody {
    pub kind: BodyKind,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Sum of forces applied since the last step; cleared after integration.
    pub force: Vec2,
    mass: f32,
    inv_mass: f32,
    pub gravity_scale: f32,
    /// Velocity decay rate per second.
    pub linear_damping: f32,
    /// Bounciness in 0..=1.
    pub restitution: f32,
    pub friction: f32,
    /// Speed clamp in pixels/second; `None` leaves speed unbounded.
    pub max_speed: Option<f32>,
}

impl RigidBody {
    pub fn dynamic(position: Vec2, mass: f32) -> Self {
        let mut body = Self::with_kind(BodyKind::Dynamic, position);
        body.set_mass(mass);
        body
    }

    pub fn kinematic(position: Vec2) -> Self {
        Self::with_kind(BodyKind::Kinematic, position)
    }

    pub fn fixed(position: Vec2) -> Self {
        Self::with_kind(BodyKind::Static, position)
    }

    fn with_kind(kind: BodyKind, position: Vec2) -> Self {
        Self {
            kind,
            position,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            mass: 0.0,
            inv_mass: 0.0,
            gravity_scale: 1.0,
            linear_damping: 0.0,
            restitution: 0.0,
            friction: 0.5,
            max_speed: None,
        }
    }

    /// Set the mass of a dynamic body.
    ///
    /// A non-positive or non-finite mass turns the body static.
    pub fn set_mass(&mut self, mass: f32) {
        if !(mass.is_finite() && mass > 0.0) {
            log::warn!("physics: rejected mass {mass}; body made static");
            self.kind = BodyKind::Static;
            self.mass = 0.0;
            self.inv_mass = 0.0;
            self.velocity = Vec2::ZERO;
            return;
        }
        self.mass = mass;
        self.inv_mass = if self.kind == BodyKind::Dynamic { 1.0 / mass } else { 0.0 };
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Zero for static and kinematic bodies.
    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution.clamp(0.0, 1.0);
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping.max(0.0);
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction.max(0.0);
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = Some(max_speed);
        self
    }
}
