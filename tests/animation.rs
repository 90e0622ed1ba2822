/// Animation tests: clip validation, the frame clock in every play mode,
/// the state-driven animator and offset effects.
///
/// Frame durations are powers of two so accumulated time stays exact.
use jkit::Error;
use jkit::animation::{
    AnimationClip, AnimationEvent, AnimationPlayer, AnimationSet, Animator, EffectKind, EffectTracker, Frame,
    PlayMode, compute_offset,
};
use jkit::geometry::Rect;
use jkit::sprite::{Sprite, SpriteSheet, TextureId};

use AnimationEvent::{FrameChanged, Finished, Looped};

const QUARTER: f32 = 0.25;

fn clip(name: &str, frames: &[u32], mode: PlayMode) -> AnimationClip {
    AnimationClip::uniform(name, frames, 1.0 / QUARTER, mode).unwrap()
}

fn playing(c: &AnimationClip) -> AnimationPlayer {
    let mut p = AnimationPlayer::new();
    p.play(c).unwrap();
    p
}

// ── Clips ────────────────────────────────────────────────────────────────────

#[test]
fn clip_without_frames_is_rejected() {
    let err = AnimationClip::new("empty", vec![], PlayMode::Loop).unwrap_err();
    assert!(matches!(err, Error::InvalidClip(_)));
}

#[test]
fn clip_with_zero_duration_frame_is_rejected() {
    let frames = vec![Frame { index: 0, duration: 0.1 }, Frame { index: 1, duration: 0.0 }];
    assert!(AnimationClip::new("bad", frames, PlayMode::Once).is_err());
    assert!(AnimationClip::uniform("bad", &[0, 1], 0.0, PlayMode::Once).is_err());
    assert!(AnimationClip::uniform("bad", &[0, 1], f32::NAN, PlayMode::Once).is_err());
}

#[test]
fn uniform_clip_total_duration() {
    let c = clip("walk", &[0, 1, 2, 3], PlayMode::Loop);
    assert_eq!(c.len(), 4);
    assert!((c.total_duration() - 1.0).abs() < 1e-6, "got {}", c.total_duration());
}

#[test]
fn set_insert_replaces_by_name() {
    let mut set = AnimationSet::new();
    set.insert(clip("idle", &[0], PlayMode::Loop));
    set.insert(clip("idle", &[4, 5], PlayMode::Loop));
    assert_eq!(set.clips.len(), 1);
    assert_eq!(set.get("idle").map(AnimationClip::len), Some(2));
    assert!(set.get("run").is_none());
}

// ── Player ───────────────────────────────────────────────────────────────────

#[test]
fn empty_player_shows_nothing() {
    let mut p = AnimationPlayer::new();
    assert_eq!(p.current_frame(), None);
    assert!(p.advance(1.0).is_empty());
}

#[test]
fn loop_wraps_and_reports() {
    let c = clip("walk", &[10, 11, 12], PlayMode::Loop);
    let mut p = playing(&c);
    assert_eq!(p.current_frame(), Some(10));

    assert_eq!(p.advance(QUARTER), vec![FrameChanged(11)]);
    assert_eq!(p.advance(QUARTER * 2.0), vec![FrameChanged(12), Looped, FrameChanged(10)]);
    assert!(!p.is_finished());
}

#[test]
fn small_steps_accumulate() {
    let c = clip("walk", &[0, 1], PlayMode::Loop);
    let mut p = playing(&c);
    assert!(p.advance(0.125).is_empty());
    assert_eq!(p.advance(0.125), vec![FrameChanged(1)]);
}

#[test]
fn once_holds_last_frame_and_finishes_once() {
    let c = clip("die", &[0, 1], PlayMode::Once);
    let mut p = playing(&c);
    assert_eq!(p.advance(1.0), vec![FrameChanged(1), Finished]);
    assert!(p.is_finished());
    assert_eq!(p.current_frame(), Some(1));
    assert!(p.advance(1.0).is_empty(), "Finished must only be reported once");
}

#[test]
fn ping_pong_bounces() {
    let c = clip("bob", &[0, 1, 2], PlayMode::PingPong);
    let mut p = playing(&c);
    let mut shown = Vec::new();
    let mut loops = 0;
    for _ in 0..6 {
        for event in p.advance(QUARTER) {
            match event {
                FrameChanged(i) => shown.push(i),
                Looped => loops += 1,
                Finished => panic!("ping-pong never finishes"),
            }
        }
    }
    assert_eq!(shown, vec![1, 2, 1, 0, 1, 2]);
    assert_eq!(loops, 1);
}

#[test]
fn single_frame_ping_pong_just_loops() {
    let c = clip("still", &[7], PlayMode::PingPong);
    let mut p = playing(&c);
    assert_eq!(p.advance(QUARTER), vec![Looped]);
    assert_eq!(p.current_frame(), Some(7));
}

#[test]
fn two_frame_ping_pong_reports_each_loop() {
    let c = clip("blink", &[0, 1], PlayMode::PingPong);
    let mut p = playing(&c);
    let mut shown = Vec::new();
    let mut loops = 0;
    for _ in 0..8 {
        for event in p.advance(QUARTER) {
            match event {
                FrameChanged(i) => shown.push(i),
                Looped => loops += 1,
                Finished => panic!("ping-pong never finishes"),
            }
        }
    }
    assert_eq!(shown, vec![1, 0, 1, 0, 1, 0, 1, 0]);
    assert_eq!(loops, 4);
}

#[test]
fn long_steps_skip_whole_cycles() {
    let c = clip("walk", &[0, 1], PlayMode::Loop);
    let mut p = playing(&c);
    // 2.5 cycles: one skipped, one stepped, then half a cycle.
    assert_eq!(p.advance(1.25), vec![Looped, FrameChanged(1), Looped, FrameChanged(0), FrameChanged(1)]);
    assert_eq!(p.current_frame(), Some(1));
}

#[test]
fn huge_speed_still_returns() {
    let c = AnimationClip::uniform("spin", &[0, 1, 2, 3], 60.0, PlayMode::Loop).unwrap();
    let mut p = playing(&c);
    p.speed = 1e6;
    let events = p.advance(1.0);
    assert!(events.contains(&Looped));
    assert!(events.len() < 32, "got {} events", events.len());
    assert!(p.current_frame().is_some());

    p.speed = f32::MAX;
    p.advance(1.0);
    p.advance(1.0);
    assert!(p.current_frame().is_some());
}

#[test]
fn play_rejects_invalid_clips() {
    let good = clip("walk", &[0, 1], PlayMode::Loop);
    let mut p = playing(&good);
    let bad = AnimationClip {
        name: "broken".into(),
        frames: vec![Frame { index: 3, duration: f32::NAN }],
        mode: PlayMode::Loop,
    };
    assert!(matches!(p.play(&bad), Err(Error::InvalidClip(_))));
    assert_eq!(p.clip_name(), Some("walk"));

    let empty = AnimationClip { name: "empty".into(), frames: vec![], mode: PlayMode::Once };
    assert!(p.play(&empty).is_err());
    assert_eq!(p.advance(QUARTER), vec![FrameChanged(1)]);
}

#[test]
fn paused_player_does_not_advance() {
    let c = clip("walk", &[0, 1], PlayMode::Loop);
    let mut p = playing(&c);
    p.pause();
    assert!(p.advance(1.0).is_empty());
    p.resume();
    assert_eq!(p.advance(QUARTER), vec![FrameChanged(1)]);
}

#[test]
fn speed_scales_time() {
    let c = clip("walk", &[0, 1, 2], PlayMode::Loop);
    let mut p = playing(&c);
    p.speed = 2.0;
    assert_eq!(p.advance(0.125), vec![FrameChanged(1)]);
    p.speed = -1.0;
    assert!(p.advance(1.0).is_empty(), "negative speed is clamped to zero");
}

#[test]
fn invalid_dt_is_ignored() {
    let c = clip("walk", &[0, 1], PlayMode::Loop);
    let mut p = playing(&c);
    assert!(p.advance(-1.0).is_empty());
    assert!(p.advance(f32::INFINITY).is_empty());
    assert_eq!(p.cursor(), 0);
}

#[test]
fn replaying_the_active_clip_keeps_progress() {
    let c = clip("walk", &[0, 1, 2], PlayMode::Loop);
    let mut p = playing(&c);
    p.advance(QUARTER);
    p.play(&c).unwrap();
    assert_eq!(p.current_frame(), Some(1));

    let other = clip("run", &[5, 6], PlayMode::Loop);
    p.play(&other).unwrap();
    assert_eq!(p.current_frame(), Some(5));
    assert_eq!(p.clip_name(), Some("run"));
}

// ── Animator ─────────────────────────────────────────────────────────────────

fn animator() -> Animator {
    let mut set = AnimationSet::new();
    set.insert(clip("idle", &[0], PlayMode::Loop));
    set.insert(clip("run", &[1, 2, 3], PlayMode::Loop));
    Animator::new(set)
}

#[test]
fn unknown_state_is_an_error() {
    let mut a = animator();
    let err = a.set_state("fly").unwrap_err();
    assert!(matches!(err, Error::UnknownClip(ref name) if name == "fly"));
    assert_eq!(a.state(), None);
}

#[test]
fn animator_writes_sheet_frame_into_sprite() {
    let sheet = SpriteSheet::from_grid(TextureId(3), 64, 16, 16, 16, 0, 0).unwrap();
    let mut sprite = Sprite::new(TextureId(0));
    let mut a = animator();
    a.set_state("run").unwrap();

    a.update(0.0, &mut sprite, &sheet);
    assert_eq!(sprite.texture, TextureId(3));
    assert_eq!(sprite.source, Some(Rect::new(16.0, 0.0, 16.0, 16.0)));

    let events = a.update(QUARTER, &mut sprite, &sheet);
    assert_eq!(events, vec![FrameChanged(2)]);
    assert_eq!(sprite.source, Some(Rect::new(32.0, 0.0, 16.0, 16.0)));
}

#[test]
fn switching_state_restarts_from_first_frame() {
    let mut a = animator();
    a.set_state("run").unwrap();
    a.player_mut().advance(QUARTER);
    a.set_state("idle").unwrap();
    a.set_state("run").unwrap();
    assert_eq!(a.player().current_frame(), Some(1));
}

// ── Effects ──────────────────────────────────────────────────────────────────

#[test]
fn bash_peaks_halfway_and_returns() {
    let kind = EffectKind::Bash { direction: [1.0, 0.0], magnitude: 6.0 };
    let d = kind.duration();
    let start = compute_offset(&kind, 0.0, d);
    let mid = compute_offset(&kind, d * 0.5, d);
    let end = compute_offset(&kind, d, d);
    assert!(start[0].abs() < 1e-6, "start x = {}", start[0]);
    assert!((mid[0] - 6.0).abs() < 1e-4, "mid x = {}", mid[0]);
    assert!(mid[1].abs() < 1e-6);
    assert!(end[0].abs() < 1e-4, "end x = {}", end[0]);
}

#[test]
fn bash_past_end_stays_clamped() {
    let kind = EffectKind::Bash { direction: [0.0, 1.0], magnitude: 5.0 };
    let off = compute_offset(&kind, 10.0, kind.duration());
    assert!(off[1].abs() < 1e-4);
}

#[test]
fn shiver_stays_inside_its_envelope() {
    let kind = EffectKind::Shiver { magnitude: 4.0 };
    let d = kind.duration();
    let start = compute_offset(&kind, 0.0, d);
    assert!(start[0].abs() < 1e-5 && start[1].abs() < 1e-5);
    for i in 0..=45 {
        let off = compute_offset(&kind, i as f32 * 0.01, d);
        assert!(off[0].abs() <= 4.0 + 1e-4 && off[1].abs() <= 4.0 + 1e-4, "step {i}: {off:?}");
    }
}

#[test]
fn tracker_expires_effects() {
    let mut fx: EffectTracker<u32> = EffectTracker::new();
    let kind = EffectKind::Bash { direction: [1.0, 0.0], magnitude: 6.0 };
    let d = kind.duration();
    fx.play(1, kind);
    assert!(fx.is_active(1));
    assert_eq!(fx.offset(2).to_array(), [0.0, 0.0]);

    fx.tick(d * 0.5);
    assert!((fx.offset(1).x - 6.0).abs() < 1e-3, "x = {}", fx.offset(1).x);

    fx.tick(d);
    assert!(!fx.is_active(1));
    assert!(fx.is_empty());
    assert_eq!(fx.offset(1).to_array(), [0.0, 0.0]);
}

#[test]
fn tracker_restarts_effect_on_same_key() {
    let mut fx = EffectTracker::new();
    let shiver = EffectKind::Shiver { magnitude: 2.0 };
    fx.play("hero", shiver.clone());
    fx.tick(0.3);
    fx.play("hero", shiver);
    fx.tick(0.3);
    assert!(fx.is_active("hero"), "second play restarts the clock");
    assert_eq!(fx.len(), 1);
}
