use crate::error::{Error, Result};
use crate::sprite::{Sprite, SpriteSheet};

use super::{AnimationEvent, AnimationPlayer, AnimationSet};

/// A clip library plus a player, driving one sprite's source rectangle.
#[derive(Clone, Debug)]
pub struct Animator {
    set: AnimationSet,
    player: AnimationPlayer,
}

impl Animator {
    pub fn new(set: AnimationSet) -> Self {
        Self { set, player: AnimationPlayer::new() }
    }

    /// Switch to the clip called `name`. Re-selecting the current clip keeps
    /// its progress. A clip that fails validation is `InvalidClip`.
    pub fn set_state(&mut self, name: &str) -> Result<()> {
        let clip = self.set.get(name).ok_or_else(|| Error::UnknownClip(name.to_string()))?;
        self.player.play(clip)
    }

    pub fn state(&self) -> Option<&str> {
        self.player.clip_name()
    }

    pub fn player(&self) -> &AnimationPlayer {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut AnimationPlayer {
        &mut self.player
    }

    /// Advance and write the current frame into `sprite.source`.
    pub fn update(&mut self, dt: f32, sprite: &mut Sprite, sheet: &SpriteSheet) -> Vec<AnimationEvent> {
        let events = self.player.advance(dt);
        self.apply(sprite, sheet);
        events
    }

    /// Write the current frame into `sprite` without advancing time.
    pub fn apply(&self, sprite: &mut Sprite, sheet: &SpriteSheet) {
        let Some(index) = self.player.current_frame() else { return };
        match sheet.frame_rect(index) {
            Some(rect) => {
                sprite.texture = sheet.texture;
                sprite.source = Some(rect);
            }
            None => log::warn!(
                "animator: frame {index} of '{}' is outside the sheet ({} frames)",
                self.state().unwrap_or("?"),
                sheet.frame_count()
            ),
        }
    }
}
