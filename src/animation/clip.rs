use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::serialization;

/// One step of a clip: which sheet frame to show and for how long.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Frame index in the sprite sheet.
    pub index: u32,
    /// Seconds.
    pub duration: f32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    /// Play through once and hold the last frame.
    Once,
    #[default]
    Loop,
    /// Forward then backward, repeating.
    PingPong,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub frames: Vec<Frame>,
    #[serde(default)]
    pub mode: PlayMode,
}

impl AnimationClip {
    pub fn new(name: &str, frames: Vec<Frame>, mode: PlayMode) -> Result<Self> {
        let clip = Self { name: name.to_string(), frames, mode };
        clip.validate()?;
        Ok(clip)
    }

    /// A clip where every frame lasts `1 / fps` seconds.
    pub fn uniform(name: &str, indices: &[u32], fps: f32, mode: PlayMode) -> Result<Self> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(Error::InvalidClip(format!("'{name}': fps must be positive, got {fps}")));
        }
        let duration = 1.0 / fps;
        let frames = indices.iter().map(|&index| Frame { index, duration }).collect();
        Self::new(name, frames, mode)
    }

    pub fn validate(&self) -> Result<()> {
        if self.frames.is_empty() {
            return Err(Error::InvalidClip(format!("'{}' has no frames", self.name)));
        }
        if let Some(f) = self.frames.iter().find(|f| !(f.duration.is_finite() && f.duration > 0.0)) {
            return Err(Error::InvalidClip(format!(
                "'{}' frame {} has non-positive duration {}",
                self.name, f.index, f.duration
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn total_duration(&self) -> f32 {
        self.frames.iter().map(|f| f.duration).sum()
    }
}

/// Named clip library, usually loaded from a data file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationSet {
    pub clips: Vec<AnimationClip>,
}

impl AnimationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a clip by name.
    pub fn insert(&mut self, clip: AnimationClip) {
        match self.clips.iter_mut().find(|c| c.name == clip.name) {
            Some(existing) => *existing = clip,
            None => self.clips.push(clip),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.iter().find(|c| c.name == name)
    }

    pub fn validate(&self) -> Result<()> {
        self.clips.iter().try_for_each(AnimationClip::validate)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let set: Self = serialization::load(path)?;
        set.validate()?;
        Ok(set)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        serialization::save(path, self)
    }
}
