use serde::{Deserialize, Serialize};

use crate::config::AudioConfig;

/// Volume bus a sound plays on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCategory {
    Music,
    #[default]
    Sfx,
}

/// Upper bound for any amplitude handed to the backend.
pub const MAX_AMPLITUDE: f32 = 2.0;

/// Master and per-category volumes. Pure bookkeeping, no device needed.
#[derive(Clone, Debug, PartialEq)]
pub struct Mixer {
    master: f32,
    music: f32,
    sfx: f32,
    muted: bool,
}

impl Mixer {
    pub fn new(master: f32, music: f32, sfx: f32) -> Self {
        Self {
            master: sanitize(master),
            music: sanitize(music),
            sfx: sanitize(sfx),
            muted: false,
        }
    }

    pub fn from_config(config: &AudioConfig) -> Self {
        Self::new(config.master_volume, config.music_volume, config.sfx_volume)
    }

    pub fn master(&self) -> f32 {
        self.master
    }

    pub fn set_master(&mut self, volume: f32) {
        self.master = sanitize(volume);
    }

    pub fn volume(&self, category: SoundCategory) -> f32 {
        match category {
            SoundCategory::Music => self.music,
            SoundCategory::Sfx => self.sfx,
        }
    }

    pub fn set_volume(&mut self, category: SoundCategory, volume: f32) {
        let v = sanitize(volume);
        match category {
            SoundCategory::Music => self.music = v,
            SoundCategory::Sfx => self.sfx = v,
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Final amplitude for a sound of `base` volume on `category`.
    pub fn effective(&self, category: SoundCategory, base: f32) -> f32 {
        if self.muted {
            return 0.0;
        }
        sanitize(base * self.master * self.volume(category))
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::from_config(&AudioConfig::default())
    }
}

fn sanitize(v: f32) -> f32 {
    if v.is_finite() { v.clamp(0.0, MAX_AMPLITUDE) } else { 0.0 }
}

/// Distance attenuation and stereo pan for a sound `dx, dy` away from the
/// listener. `None` when out of range. Pan runs from -1 (left) to 1 (right).
pub fn spatial_params(dx: f32, dy: f32, max_dist: f32) -> Option<(f32, f32)> {
    if max_dist.is_nan() || max_dist <= 0.0 {
        return None;
    }
    let dist = (dx * dx + dy * dy).sqrt();
    if dist > max_dist {
        return None;
    }
    let volume = (1.0 - dist / max_dist).clamp(0.0, 1.0);
    let pan = (dx / max_dist).clamp(-1.0, 1.0);
    Some((volume, pan))
}

/// kira pans from 0 (left) through 0.5 (center) to 1 (right).
pub fn backend_panning(pan: f32) -> f64 {
    ((pan.clamp(-1.0, 1.0) + 1.0) * 0.5) as f64
}

/// Small deterministic generator for pitch and volume jitter.
#[derive(Clone, Debug, Default)]
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Next value in `0.0..1.0`.
    pub fn next_f32(&mut self) -> f32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 40) as f32 / (1u64 << 24) as f32
    }

    /// `base` shifted by up to `±variation`.
    pub fn vary(&mut self, base: f32, variation: f32) -> f32 {
        if variation == 0.0 {
            return base;
        }
        base + (self.next_f32() - 0.5) * 2.0 * variation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcg_stays_in_unit_range() {
        let mut rng = Lcg::new(7);
        for _ in 0..1000 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn panning_maps_to_backend_range() {
        assert_eq!(backend_panning(-1.0), 0.0);
        assert_eq!(backend_panning(0.0), 0.5);
        assert_eq!(backend_panning(3.0), 1.0);
    }
}
