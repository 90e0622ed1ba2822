use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::arena::{Arena, Handle};
use crate::config::PhysicsConfig;

use super::{BodyKind, RigidBody};

/// First-order integration scheme used for each fixed step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integrator {
    /// `x += v·dt` using the old velocity, then `v += a·dt`.
    ExplicitEuler,
    /// `v += a·dt` first, then `x += v·dt` with the new velocity.
    #[default]
    SemiImplicitEuler,
}

/// Owns rigid bodies and advances them with a fixed timestep.
pub struct PhysicsWorld {
    bodies: Arena<RigidBody>,
    pub gravity: Vec2,
    pub integrator: Integrator,
    fixed_dt: f32,
    max_substeps: u32,
    accumulator: f32,
    /// Steps run since creation.
    steps: u64,
}

impl PhysicsWorld {
    pub fn new(config: &PhysicsConfig) -> Self {
        let fixed_dt = if config.fixed_dt.is_finite() && config.fixed_dt > 0.0 {
            config.fixed_dt
        } else {
            let fallback = PhysicsConfig::default().fixed_dt;
            log::warn!("physics: invalid fixed_dt {}; using {fallback}", config.fixed_dt);
            fallback
        };
        Self {
            bodies: Arena::new(),
            gravity: Vec2::from(config.gravity),
            integrator: config.integrator,
            fixed_dt,
            max_substeps: config.max_substeps.max(1),
            accumulator: 0.0,
            steps: 0,
        }
    }

    pub fn add_body(&mut self, body: RigidBody) -> Handle {
        self.bodies.insert(body)
    }

    pub fn remove_body(&mut self, handle: Handle) -> Option<RigidBody> {
        self.bodies.remove(handle)
    }

    pub fn body(&self, handle: Handle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: Handle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (Handle, &RigidBody)> {
        self.bodies.iter()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Accumulate a force on a dynamic body until the next step.
    pub fn apply_force(&mut self, handle: Handle, force: Vec2) {
        if let Some(body) = self.bodies.get_mut(handle) {
            if body.is_dynamic() {
                body.force += force;
            }
        }
    }

    /// Instant velocity change: `Δv = impulse · inv_mass`.
    pub fn apply_impulse(&mut self, handle: Handle, impulse: Vec2) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.velocity += impulse * body.inv_mass();
        }
    }

    /// Advance by real elapsed time, running as many fixed substeps as fit.
    ///
    /// Returns the number of substeps run. Time beyond `max_substeps` steps
    /// is dropped so a long frame cannot spiral.
    pub fn step(&mut self, elapsed: f32) -> u32 {
        if !(elapsed.is_finite() && elapsed > 0.0) {
            return 0;
        }
        self.accumulator += elapsed;

        let mut substeps = 0;
        while self.accumulator >= self.fixed_dt {
            if substeps == self.max_substeps {
                log::debug!(
                    "physics: dropping {:.4}s after {} substeps",
                    self.accumulator,
                    substeps
                );
                self.accumulator = 0.0;
                break;
            }
            self.integrate(self.fixed_dt);
            self.accumulator -= self.fixed_dt;
            substeps += 1;
        }
        substeps
    }

    /// Leftover fraction of a step, for interpolating render positions.
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.fixed_dt).clamp(0.0, 1.0)
    }

    /// Run exactly one integration step of `dt` seconds.
    pub fn integrate(&mut self, dt: f32) {
        let gravity = self.gravity;
        let integrator = self.integrator;

        for (_, body) in self.bodies.iter_mut() {
            match body.kind {
                BodyKind::Static => {}
                BodyKind::Kinematic => body.position += body.velocity * dt,
                BodyKind::Dynamic => integrate_body(body, gravity, integrator, dt),
            }
            body.force = Vec2::ZERO;
        }
        self.steps += 1;
    }
}

fn integrate_body(body: &mut RigidBody, gravity: Vec2, integrator: Integrator, dt: f32) {
    let accel = gravity * body.gravity_scale + body.force * body.inv_mass();

    match integrator {
        Integrator::ExplicitEuler => {
            body.position += body.velocity * dt;
            body.velocity += accel * dt;
        }
        Integrator::SemiImplicitEuler => {
            body.velocity += accel * dt;
            body.position += body.velocity * dt;
        }
    }

    if body.linear_damping > 0.0 {
        body.velocity *= 1.0 / (1.0 + body.linear_damping * dt);
    }
    if let Some(max) = body.max_speed {
        body.velocity = body.velocity.clamp_length_max(max);
    }
    if !(body.position.is_finite() && body.velocity.is_finite()) {
        log::warn!("physics: body diverged; velocity reset");
        body.position = if body.position.is_finite() { body.position } else { Vec2::ZERO };
        body.velocity = Vec2::ZERO;
    }
}
