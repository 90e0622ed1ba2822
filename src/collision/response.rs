use glam::Vec2;

use crate::arena::Handle;
use crate::physics::PhysicsWorld;

use super::CollisionWorld;

/// Penetration allowed before positional correction kicks in.
const SLOP: f32 = 0.01;
/// Share of the remaining penetration removed per resolve.
const PERCENT: f32 = 0.8;

struct Side {
    body: Option<Handle>,
    inv_mass: f32,
    velocity: Vec2,
    restitution: Option<f32>,
    friction: Option<f32>,
}

fn side(physics: &PhysicsWorld, body: Option<Handle>) -> Side {
    match body.and_then(|h| physics.body(h)) {
        Some(b) => Side {
            body,
            inv_mass: b.inv_mass(),
            velocity: b.velocity,
            restitution: Some(b.restitution),
            friction: Some(b.friction),
        },
        None => Side { body: None, inv_mass: 0.0, velocity: Vec2::ZERO, restitution: None, friction: None },
    }
}

/// Push overlapping bodies apart and exchange impulses for every active
/// contact. Returns the number of contacts resolved.
///
/// Triggers are ignored. A collider without a body behaves as immovable
/// geometry and uses the other side's material.
pub fn resolve_contacts(physics: &mut PhysicsWorld, collisions: &CollisionWorld) -> usize {
    let mut resolved = 0;
    for (ha, hb, contact) in collisions.contacts() {
        let (Some(ca), Some(cb)) = (collisions.get(ha), collisions.get(hb)) else { continue };
        if ca.is_trigger || cb.is_trigger {
            continue;
        }

        let a = side(physics, ca.body);
        let b = side(physics, cb.body);
        let inv_sum = a.inv_mass + b.inv_mass;
        if inv_sum <= 0.0 {
            continue;
        }
        let n = contact.normal;

        // Positional correction.
        let correction = n * ((contact.depth - SLOP).max(0.0) / inv_sum * PERCENT);
        let mut va = a.velocity;
        let mut vb = b.velocity;

        let vn = (vb - va).dot(n);
        if vn < 0.0 {
            let restitution = min_material(a.restitution, b.restitution);
            let j = -(1.0 + restitution) * vn / inv_sum;
            va -= n * (j * a.inv_mass);
            vb += n * (j * b.inv_mass);

            // Coulomb friction along the tangent.
            let rv = vb - va;
            let tangent = rv - n * rv.dot(n);
            if tangent.length_squared() > 1e-12 {
                let t = tangent.normalize();
                let mu = mix_friction(a.friction, b.friction);
                let jt = (-rv.dot(t) / inv_sum).clamp(-j * mu, j * mu);
                va -= t * (jt * a.inv_mass);
                vb += t * (jt * b.inv_mass);
            }
        }

        write_back(physics, &a, -correction * a.inv_mass, va);
        write_back(physics, &b, correction * b.inv_mass, vb);
        resolved += 1;
    }
    resolved
}

fn write_back(physics: &mut PhysicsWorld, side: &Side, shift: Vec2, velocity: Vec2) {
    if side.inv_mass <= 0.0 {
        return;
    }
    if let Some(body) = side.body.and_then(|h| physics.body_mut(h)) {
        body.position += shift;
        body.velocity = velocity;
    }
}

fn min_material(a: Option<f32>, b: Option<f32>) -> f32 {
    match (a, b) {
        (Some(a), Some(b)) => a.min(b),
        (Some(v), None) | (None, Some(v)) => v,
        (None, None) => 0.0,
    }
}

fn mix_friction(a: Option<f32>, b: Option<f32>) -> f32 {
    match (a, b) {
        (Some(a), Some(b)) => (a * b).max(0.0).sqrt(),
        (Some(v), None) | (None, Some(v)) => v.max(0.0),
        (None, None) => 0.0,
    }
}
