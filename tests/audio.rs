/// Audio tests. Everything here runs without an output device: the mixer
/// and spatial maths are pure, and a disabled context still decodes sounds.
use glam::Vec2;
use jkit::Error;
use jkit::audio::{AudioContext, Lcg, MAX_AMPLITUDE, Mixer, SoundCategory, SoundConfig, spatial_params};
use jkit::config::AudioConfig;

/// Mono 16-bit PCM WAV of `samples` silent frames.
fn silent_wav(samples: u32) -> Vec<u8> {
    let rate = 22_050u32;
    let data_len = samples * 2;
    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&rate.to_le_bytes());
    out.extend_from_slice(&(rate * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.resize(44 + data_len as usize, 0);
    out
}

// ── Mixer ────────────────────────────────────────────────────────────────────

#[test]
fn effective_volume_multiplies_master_and_category() {
    let mixer = Mixer::new(0.5, 0.8, 1.0);
    assert!((mixer.effective(SoundCategory::Music, 1.0) - 0.4).abs() < 1e-6);
    assert!((mixer.effective(SoundCategory::Sfx, 0.5) - 0.25).abs() < 1e-6);
}

#[test]
fn mute_silences_everything_but_keeps_levels() {
    let mut mixer = Mixer::default();
    mixer.set_muted(true);
    assert_eq!(mixer.effective(SoundCategory::Sfx, 1.0), 0.0);
    mixer.set_muted(false);
    assert_eq!(mixer.effective(SoundCategory::Sfx, 1.0), 1.0);
}

#[test]
fn volumes_are_clamped_and_sanitised() {
    let mut mixer = Mixer::default();
    mixer.set_master(10.0);
    assert_eq!(mixer.master(), MAX_AMPLITUDE);
    mixer.set_volume(SoundCategory::Music, -1.0);
    assert_eq!(mixer.volume(SoundCategory::Music), 0.0);
    mixer.set_volume(SoundCategory::Sfx, f32::NAN);
    assert_eq!(mixer.volume(SoundCategory::Sfx), 0.0);

    mixer.set_volume(SoundCategory::Sfx, 2.0);
    assert_eq!(mixer.effective(SoundCategory::Sfx, 2.0), MAX_AMPLITUDE, "product is clamped too");
}

#[test]
fn mixer_follows_config() {
    let config = AudioConfig { master_volume: 0.25, music_volume: 0.5, ..Default::default() };
    let mixer = Mixer::from_config(&config);
    assert_eq!(mixer.master(), 0.25);
    assert_eq!(mixer.volume(SoundCategory::Music), 0.5);
}

// ── Spatial ──────────────────────────────────────────────────────────────────

#[test]
fn spatial_attenuates_linearly() {
    let (vol, pan) = spatial_params(0.0, 0.0, 100.0).unwrap();
    assert_eq!((vol, pan), (1.0, 0.0));
    let (vol, pan) = spatial_params(50.0, 0.0, 100.0).unwrap();
    assert!((vol - 0.5).abs() < 1e-6 && (pan - 0.5).abs() < 1e-6, "vol {vol}, pan {pan}");
    let (vol, pan) = spatial_params(-30.0, 40.0, 100.0).unwrap();
    assert!((vol - 0.5).abs() < 1e-6, "distance is euclidean, vol {vol}");
    assert!((pan + 0.3).abs() < 1e-6);
}

#[test]
fn spatial_cuts_off_beyond_range() {
    assert!(spatial_params(101.0, 0.0, 100.0).is_none());
    let (vol, _) = spatial_params(100.0, 0.0, 100.0).unwrap();
    assert_eq!(vol, 0.0);
}

#[test]
fn spatial_rejects_bad_range() {
    assert!(spatial_params(0.0, 0.0, 0.0).is_none());
    assert!(spatial_params(0.0, 0.0, -5.0).is_none());
    assert!(spatial_params(0.0, 0.0, f32::NAN).is_none());
}

// ── Variation ────────────────────────────────────────────────────────────────

#[test]
fn lcg_is_deterministic_per_seed() {
    let draw = |seed| {
        let mut rng = Lcg::new(seed);
        (0..8).map(|_| rng.next_f32()).collect::<Vec<f32>>()
    };
    assert_eq!(draw(42), draw(42));
    assert_ne!(draw(42), draw(43));
}

#[test]
fn vary_stays_within_bounds() {
    let mut rng = Lcg::new(1);
    assert_eq!(rng.vary(1.0, 0.0), 1.0);
    for _ in 0..500 {
        let v = rng.vary(1.0, 0.1);
        assert!((0.9..=1.1).contains(&v), "out of range: {v}");
    }
}

#[test]
fn vary_spreads_over_the_range() {
    let mut rng = Lcg::new(9);
    let values: Vec<f32> = (0..500).map(|_| rng.vary(0.0, 1.0)).collect();
    assert!(values.iter().any(|&v| v < -0.5));
    assert!(values.iter().any(|&v| v > 0.5));
}

// ── Context ──────────────────────────────────────────────────────────────────

#[test]
fn disabled_context_decodes_and_ignores_playback() {
    let mut audio = AudioContext::disabled(&AudioConfig::default());
    assert!(!audio.is_available());
    audio.load_sound_from_bytes("blip", silent_wav(441)).unwrap();
    assert!(audio.has_sound("blip"));

    audio.play("blip", SoundConfig::default().with_variation(0.1, 0.1));
    audio.play("missing", SoundConfig::default());
    audio.play_music("blip", 1.0);
    audio.play_spatial("blip", Vec2::new(10.0, 0.0), Vec2::ZERO, 100.0);
    audio.stop_music(0.5);
}

#[test]
fn bad_sound_data_is_an_audio_error() {
    let mut audio = AudioContext::disabled(&AudioConfig::default());
    let err = audio.load_sound_from_bytes("junk", b"not a sound".to_vec()).unwrap_err();
    assert!(matches!(err, Error::Audio(_)), "got {err:?}");
    assert!(!audio.has_sound("junk"));
}

#[test]
fn missing_sound_file_is_an_audio_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut audio = AudioContext::disabled(&AudioConfig::default());
    let err = audio.load_sound("nope", dir.path().join("nope.ogg")).unwrap_err();
    assert!(matches!(err, Error::Audio(_)));
}

#[test]
fn context_volume_changes_reach_the_mixer() {
    let mut audio = AudioContext::disabled(&AudioConfig::default());
    audio.set_master_volume(0.5);
    audio.set_volume(SoundCategory::Music, 0.25);
    audio.set_muted(true);
    assert_eq!(audio.mixer().master(), 0.5);
    assert_eq!(audio.mixer().volume(SoundCategory::Music), 0.25);
    assert!(audio.mixer().is_muted());
}
