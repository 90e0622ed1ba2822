//! Rigid-body integration with a fixed timestep.
//!
//! Bodies live in a [`PhysicsWorld`] and are referenced by [`Handle`]s.
//! Collision response is applied separately by
//! [`crate::collision::resolve_contacts`].

pub mod body;
pub mod world;

pub use body::{BodyKind, RigidBody};
pub use world::{Integrator, PhysicsWorld};

pub use crate::arena::Handle;
