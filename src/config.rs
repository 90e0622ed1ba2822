use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collision::BroadPhaseKind;
use crate::error::Result;
use crate::physics::Integrator;
use crate::serialization;
use crate::sprite::Color;

// ── WindowMode ────────────────────────────────────────────────────────────────

/// Controls how the OS window is presented.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// Standard decorated window at the configured resolution.
    Windowed,
    /// Borderless window sized to the monitor's native resolution.
    Borderless,
}

// ── Sections ──────────────────────────────────────────────────────────────────

/// Window settings.
///
/// `width × height` is the logical game resolution. The physical window may
/// differ (HiDPI, borderless); the renderer letterboxes to keep the aspect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub mode: WindowMode,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "jkit".into(),
            width: 1280,
            height: 720,
            mode: WindowMode::Windowed,
            vsync: true,
        }
    }
}

impl WindowConfig {
    /// `width / height`, or `0.0` when the height is zero.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f32 / self.height as f32
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Pixels per second squared, y-down.
    pub gravity: [f32; 2],
    /// Seconds per substep.
    pub fixed_dt: f32,
    pub max_substeps: u32,
    pub integrator: Integrator,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, 980.0],
            fixed_dt: 1.0 / 60.0,
            max_substeps: 8,
            integrator: Integrator::SemiImplicitEuler,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub broad_phase: BroadPhaseKind,
    /// Spatial hash cell edge in pixels.
    pub cell_size: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self { broad_phase: BroadPhaseKind::SpatialHash, cell_size: 64.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub master_volume: f32,
    pub music_volume: f32,
    pub sfx_volume: f32,
    /// Beyond this distance spatial sounds are inaudible.
    pub spatial_max_distance: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            music_volume: 0.8,
            sfx_volume: 1.0,
            spatial_max_distance: 480.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub clear_color: Color,
    /// Nearest-neighbour sampling for crisp pixel art.
    pub pixel_art: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { clear_color: Color::rgba(0.05, 0.05, 0.08, 1.0), pixel_art: true }
    }
}

// ── KitConfig ─────────────────────────────────────────────────────────────────

/// Top-level configuration document. Every section may be omitted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitConfig {
    pub window: WindowConfig,
    pub physics: PhysicsConfig,
    pub collision: CollisionConfig,
    pub audio: AudioConfig,
    pub render: RenderConfig,
}

impl KitConfig {
    /// Read a JSON or YAML config (picked by extension) and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config: Self = serialization::load(path)?;
        config.validate();
        Ok(config)
    }

    /// Like [`load`](Self::load) but any failure falls back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                log::info!("config: loaded {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("config: {e}; using defaults");
                Self::default()
            }
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        serialization::save(path, self)
    }

    /// Clamp out-of-range values back to something usable. Returns the
    /// number of fields that were changed.
    pub fn validate(&mut self) -> usize {
        let defaults = Self::default();
        let mut fixed = 0;

        let mut check = |ok: bool, name: &str| {
            if !ok {
                log::warn!("config: invalid {name}; using default");
                fixed += 1;
            }
            !ok
        };

        if check(self.window.width > 0 && self.window.height > 0, "window size") {
            self.window.width = defaults.window.width;
            self.window.height = defaults.window.height;
        }
        let p = &mut self.physics;
        if check(p.fixed_dt.is_finite() && p.fixed_dt > 0.0 && p.fixed_dt <= 0.25, "physics.fixed_dt") {
            p.fixed_dt = defaults.physics.fixed_dt;
        }
        if check(p.max_substeps > 0, "physics.max_substeps") {
            p.max_substeps = defaults.physics.max_substeps;
        }
        if check(p.gravity.iter().all(|g| g.is_finite()), "physics.gravity") {
            p.gravity = defaults.physics.gravity;
        }
        let c = &mut self.collision;
        if check(c.cell_size.is_finite() && c.cell_size > 0.0, "collision.cell_size") {
            c.cell_size = defaults.collision.cell_size;
        }
        let a = &mut self.audio;
        for (name, v) in [
            ("audio.master_volume", &mut a.master_volume),
            ("audio.music_volume", &mut a.music_volume),
            ("audio.sfx_volume", &mut a.sfx_volume),
        ] {
            if check(v.is_finite() && (0.0..=2.0).contains(&*v), name) {
                *v = if v.is_finite() { (*v).clamp(0.0, 2.0) } else { 1.0 };
            }
        }
        if check(a.spatial_max_distance.is_finite() && a.spatial_max_distance > 0.0, "audio.spatial_max_distance") {
            a.spatial_max_distance = defaults.audio.spatial_max_distance;
        }
        fixed
    }
}
