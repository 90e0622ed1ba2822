use std::collections::HashMap;
use std::hash::Hash;

use glam::Vec2;

/// Short "juice" effects. These offset where a sprite is drawn without
/// touching its logical position.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectKind {
    /// Sinusoidal lunge: the sprite snaps `magnitude` pixels in `direction`
    /// and returns, following `sin(t * π)` over the duration.
    Bash {
        /// Normalised direction vector (e.g. `[1.0, 0.0]` for right).
        direction: [f32; 2],
        /// Peak displacement in pixels.
        magnitude: f32,
    },
    /// Rapid high-frequency jitter with a smooth bell-shaped envelope.
    Shiver {
        /// Peak jitter radius in pixels.
        magnitude: f32,
    },
}

impl EffectKind {
    /// Default playback duration in seconds for each effect.
    pub fn duration(&self) -> f32 {
        match self {
            EffectKind::Bash { .. } => 0.18,
            EffectKind::Shiver { .. } => 0.45,
        }
    }
}

/// Pixel offset `[dx, dy]` of an effect `elapsed` seconds in.
pub fn compute_offset(kind: &EffectKind, elapsed: f32, duration: f32) -> [f32; 2] {
    use std::f32::consts::{PI, TAU};
    let progress = (elapsed / duration).clamp(0.0, 1.0);
    match kind {
        EffectKind::Bash { direction, magnitude } => {
            let t = (progress * PI).sin();
            [direction[0] * magnitude * t, direction[1] * magnitude * t]
        }
        EffectKind::Shiver { magnitude } => {
            let envelope = (progress * PI).sin();
            let jitter_x = (elapsed * 42.0 * TAU).sin();
            let jitter_y = (elapsed * 37.0 * TAU + 1.3).sin();
            [magnitude * envelope * jitter_x, magnitude * envelope * jitter_y]
        }
    }
}

struct ActiveEffect {
    kind: EffectKind,
    elapsed: f32,
    duration: f32,
}

/// Fire-and-forget effects keyed by whatever identifies a sprite. One
/// effect runs per key; starting another replaces it.
pub struct EffectTracker<K> {
    active: HashMap<K, ActiveEffect>,
}

impl<K: Hash + Eq + Copy> EffectTracker<K> {
    pub fn new() -> Self {
        Self { active: HashMap::new() }
    }

    pub fn play(&mut self, key: K, kind: EffectKind) {
        let duration = kind.duration();
        self.active.insert(key, ActiveEffect { kind, elapsed: 0.0, duration });
    }

    /// Advance every effect and drop the ones that ran out.
    pub fn tick(&mut self, dt: f32) {
        for effect in self.active.values_mut() {
            effect.elapsed += dt;
        }
        self.active.retain(|_, e| e.elapsed < e.duration);
    }

    /// Current offset for `key`; zero when nothing is playing.
    pub fn offset(&self, key: K) -> Vec2 {
        self.active
            .get(&key)
            .map(|e| Vec2::from(compute_offset(&e.kind, e.elapsed, e.duration)))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn is_active(&self, key: K) -> bool {
        self.active.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl<K: Hash + Eq + Copy> Default for EffectTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}
