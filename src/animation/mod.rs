pub mod animator;
pub mod clip;
pub mod effects;
pub mod player;

pub use animator::Animator;
pub use clip::{AnimationClip, AnimationSet, Frame, PlayMode};
pub use effects::{EffectKind, EffectTracker, compute_offset};
pub use player::{AnimationEvent, AnimationPlayer};
