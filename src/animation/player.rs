use crate::error::Result;

use super::{AnimationClip, PlayMode};

/// Backstop on frame steps per `advance`; whole cycles are skipped before stepping.
const MAX_STEPS: usize = 4096;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AnimationEvent {
    /// The displayed sheet frame changed to this index.
    FrameChanged(u32),
    /// A `Loop` or `PingPong` clip wrapped around.
    Looped,
    /// A `Once` clip reached its end. Reported once.
    Finished,
}

/// Frame clock for a single clip.
#[derive(Clone, Debug)]
pub struct AnimationPlayer {
    clip: Option<AnimationClip>,
    cursor: usize,
    /// Time spent on the current frame.
    elapsed: f32,
    /// Playback rate multiplier; negative values are treated as zero.
    pub speed: f32,
    paused: bool,
    finished: bool,
    forward: bool,
}

impl AnimationPlayer {
    pub fn new() -> Self {
        Self {
            clip: None,
            cursor: 0,
            elapsed: 0.0,
            speed: 1.0,
            paused: false,
            finished: false,
            forward: true,
        }
    }

    /// Switch to `clip`. Playing the clip that is already active is a no-op,
    /// so this can be called every frame. Invalid clips are rejected and the
    /// current clip keeps playing.
    pub fn play(&mut self, clip: &AnimationClip) -> Result<()> {
        if self.clip.as_ref().is_some_and(|c| c.name == clip.name) {
            return Ok(());
        }
        clip.validate()?;
        self.clip = Some(clip.clone());
        self.restart();
        Ok(())
    }

    pub fn restart(&mut self) {
        self.cursor = 0;
        self.elapsed = 0.0;
        self.finished = false;
        self.forward = true;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn clip_name(&self) -> Option<&str> {
        self.clip.as_ref().map(|c| c.name.as_str())
    }

    /// Sheet frame index to display, or `None` with no clip.
    pub fn current_frame(&self) -> Option<u32> {
        let clip = self.clip.as_ref()?;
        clip.frames.get(self.cursor).map(|f| f.index)
    }

    /// Position of the cursor inside the clip's frame list.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Advance the clock by `dt` seconds, possibly crossing several frames.
    pub fn advance(&mut self, dt: f32) -> Vec<AnimationEvent> {
        let mut events = Vec::new();
        if self.paused || self.finished || !(dt.is_finite() && dt > 0.0) {
            return events;
        }
        let Some(clip) = self.clip.as_ref() else { return events };
        if clip.frames.is_empty() {
            return events;
        }

        self.elapsed += dt * self.speed.max(0.0);
        if !self.elapsed.is_finite() {
            log::debug!("animation '{}': elapsed overflowed; rewinding frame time", clip.name);
            self.elapsed = 0.0;
            return events;
        }

        // Whole cycles bring the cursor back to where it is. Skip all but the
        // last one, which is stepped so its frame events are still reported.
        let period = cycle_duration(clip);
        if period.is_finite() && period > 0.0 && self.elapsed >= 2.0 * period {
            self.elapsed = self.elapsed % period + period;
            events.push(AnimationEvent::Looped);
        }

        for _ in 0..MAX_STEPS {
            let duration = clip.frames[self.cursor].duration;
            if !(duration > 0.0 && self.elapsed >= duration) {
                break;
            }
            self.elapsed -= duration;

            let prev = self.cursor;
            match next_cursor(clip, self.cursor, &mut self.forward) {
                Step::To(next) => self.cursor = next,
                Step::Wrap(next) => {
                    self.cursor = next;
                    events.push(AnimationEvent::Looped);
                }
                Step::End => {
                    self.finished = true;
                    self.elapsed = 0.0;
                    events.push(AnimationEvent::Finished);
                    break;
                }
            }
            if self.cursor != prev {
                events.push(AnimationEvent::FrameChanged(clip.frames[self.cursor].index));
            }
        }
        events
    }
}

impl Default for AnimationPlayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Time for a `Loop` or `PingPong` clip to return to the same cursor and
/// direction. `Once` clips have no cycle.
fn cycle_duration(clip: &AnimationClip) -> f32 {
    let total = clip.total_duration();
    match clip.mode {
        PlayMode::Once => f32::INFINITY,
        PlayMode::Loop => total,
        PlayMode::PingPong if clip.frames.len() <= 2 => total,
        PlayMode::PingPong => {
            let last = clip.frames.len() - 1;
            total + clip.frames[1..last].iter().map(|f| f.duration).sum::<f32>()
        }
    }
}

enum Step {
    To(usize),
    Wrap(usize),
    End,
}

fn next_cursor(clip: &AnimationClip, cursor: usize, forward: &mut bool) -> Step {
    let last = clip.frames.len() - 1;
    match clip.mode {
        PlayMode::Once if cursor < last => Step::To(cursor + 1),
        PlayMode::Once => Step::End,
        PlayMode::Loop if cursor < last => Step::To(cursor + 1),
        PlayMode::Loop => Step::Wrap(0),
        PlayMode::PingPong if last == 0 => Step::Wrap(0),
        PlayMode::PingPong => {
            if *forward {
                if cursor < last {
                    Step::To(cursor + 1)
                } else {
                    let next = cursor - 1;
                    if next == 0 {
                        Step::Wrap(0)
                    } else {
                        *forward = false;
                        Step::To(next)
                    }
                }
            } else if cursor > 0 {
                let next = cursor - 1;
                if next == 0 {
                    *forward = true;
                    Step::Wrap(0)
                } else {
                    Step::To(next)
                }
            } else {
                *forward = true;
                Step::To(1)
            }
        }
    }
}
