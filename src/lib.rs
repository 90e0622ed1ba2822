//! Small 2D game kit: sprite batching on wgpu, fixed-step rigid-body
//! physics, collision with enter/stay/exit events, frame animation,
//! tilemaps, kira audio and JSON/YAML documents.

pub mod animation;
pub mod app;
pub mod arena;
pub mod audio;
pub mod camera;
pub mod collision;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod physics;
pub mod renderer;
pub mod serialization;
pub mod sprite;
pub mod tilemap;

pub use error::{Error, Result};
