//! Sound effects and music on top of kira. Without an audio device every
//! call becomes a no-op, so games run unchanged in headless environments.

pub mod mixer;

pub use mixer::{Lcg, MAX_AMPLITUDE, Mixer, SoundCategory, backend_panning, spatial_params};

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use glam::Vec2;
use kira::{
    Volume,
    manager::{AudioManager, AudioManagerSettings, backend::DefaultBackend},
    sound::{
        PlaybackRate,
        static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
    },
    tween::Tween,
};

use crate::config::AudioConfig;
use crate::error::{Error, Result};

/// Crossfade applied to the outgoing track when music changes.
const MUSIC_FADE_OUT: f32 = 0.5;

/// Configuration for playing a sound with variation.
#[derive(Debug, Clone, Copy)]
pub struct SoundConfig {
    pub volume: f32,
    pub pitch: f32,
    /// Random pitch variation range (e.g. 0.1 = +/- 10%)
    pub pitch_variation: f32,
    /// Random volume variation range
    pub volume_variation: f32,
    pub category: SoundCategory,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pitch: 1.0,
            pitch_variation: 0.0,
            volume_variation: 0.0,
            category: SoundCategory::Sfx,
        }
    }
}

impl SoundConfig {
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_variation(mut self, pitch: f32, volume: f32) -> Self {
        self.pitch_variation = pitch;
        self.volume_variation = volume;
        self
    }
}

fn tween(secs: f32) -> Tween {
    Tween {
        duration: fade_duration(secs),
        ..Default::default()
    }
}

/// Negative, NaN and unrepresentable fades are instant.
fn fade_duration(secs: f32) -> Duration {
    Duration::try_from_secs_f32(secs.max(0.0)).unwrap_or(Duration::ZERO)
}

pub struct AudioContext {
    /// `None` when audio hardware is unavailable (headless / CI / no audio device).
    manager: Option<AudioManager>,
    sounds: HashMap<String, StaticSoundData>,
    active_music: Option<StaticSoundHandle>,
    mixer: Mixer,
    rng: Lcg,
}

impl AudioContext {
    pub fn new(config: &AudioConfig) -> Self {
        let manager = match AudioManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
            Ok(m) => Some(m),
            Err(e) => {
                log::warn!("audio: failed to initialize audio manager: {e}; audio disabled");
                None
            }
        };
        Self::with_manager(manager, config)
    }

    /// A context that never touches the audio device.
    pub fn disabled(config: &AudioConfig) -> Self {
        Self::with_manager(None, config)
    }

    fn with_manager(manager: Option<AudioManager>, config: &AudioConfig) -> Self {
        Self {
            manager,
            sounds: HashMap::new(),
            active_music: None,
            mixer: Mixer::from_config(config),
            rng: Lcg::default(),
        }
    }

    /// Returns true if audio hardware is available.
    pub fn is_available(&self) -> bool {
        self.manager.is_some()
    }

    /// Decode a sound file (OGG, WAV) into memory under `name`.
    pub fn load_sound<P: AsRef<Path>>(&mut self, name: &str, path: P) -> Result<()> {
        let path = path.as_ref();
        let sound = StaticSoundData::from_file(path)
            .map_err(|e| Error::Audio(format!("failed to load '{name}' from '{}': {e}", path.display())))?;
        self.sounds.insert(name.to_string(), sound);
        Ok(())
    }

    /// Decode an in-memory OGG or WAV file.
    pub fn load_sound_from_bytes(&mut self, name: &str, bytes: Vec<u8>) -> Result<()> {
        let sound = StaticSoundData::from_cursor(Cursor::new(bytes))
            .map_err(|e| Error::Audio(format!("failed to decode '{name}': {e}")))?;
        self.sounds.insert(name.to_string(), sound);
        Ok(())
    }

    pub fn has_sound(&self, name: &str) -> bool {
        self.sounds.contains_key(name)
    }

    fn sound(&self, name: &str) -> Option<&StaticSoundData> {
        let sound = self.sounds.get(name);
        if sound.is_none() {
            log::warn!("audio: unknown sound '{name}'");
        }
        sound
    }

    /// Play a sound once with optional config.
    pub fn play(&mut self, name: &str, config: SoundConfig) {
        if self.manager.is_none() {
            return;
        }
        let Some(data) = self.sound(name).cloned() else { return };

        let pitch = self.rng.vary(config.pitch, config.pitch_variation).max(0.01);
        let volume = self.rng.vary(config.volume, config.volume_variation);

        let mut settings = StaticSoundSettings::new();
        settings.playback_rate = PlaybackRate::Factor(pitch as f64).into();
        settings.volume = Volume::Amplitude(self.mixer.effective(config.category, volume) as f64).into();

        if let Some(manager) = self.manager.as_mut() {
            if let Err(e) = manager.play(data.with_settings(settings)) {
                log::warn!("audio: failed to play '{name}': {e}");
            }
        }
    }

    /// Play background music that loops indefinitely, fading out whatever
    /// was playing before.
    pub fn play_music(&mut self, name: &str, fade_in_secs: f32) {
        if self.manager.is_none() {
            return;
        }
        let Some(data) = self.sound(name).cloned() else { return };

        self.stop_music(MUSIC_FADE_OUT);

        let mut settings = StaticSoundSettings::new().loop_region(0.0..);
        settings.volume = Volume::Amplitude(0.0).into();

        let target = self.mixer.effective(SoundCategory::Music, 1.0) as f64;
        let Some(manager) = self.manager.as_mut() else { return };
        match manager.play(data.with_settings(settings)) {
            Ok(mut handle) => {
                handle.set_volume(Volume::Amplitude(target), tween(fade_in_secs));
                self.active_music = Some(handle);
            }
            Err(e) => log::warn!("audio: failed to play music '{name}': {e}"),
        }
    }

    pub fn stop_music(&mut self, fade_out_secs: f32) {
        if let Some(mut handle) = self.active_music.take() {
            handle.stop(tween(fade_out_secs));
        }
    }

    /// Play a sound with 2D spatial panning and distance-based volume.
    /// `listener` is usually the camera position.
    pub fn play_spatial(&mut self, name: &str, source: Vec2, listener: Vec2, max_dist: f32) {
        if self.manager.is_none() {
            return;
        }
        let Some(data) = self.sound(name).cloned() else { return };
        let delta = source - listener;
        let Some((volume, pan)) = spatial_params(delta.x, delta.y, max_dist) else { return };

        let mut settings = StaticSoundSettings::new();
        settings.volume = Volume::Amplitude(self.mixer.effective(SoundCategory::Sfx, volume) as f64).into();
        settings.panning = backend_panning(pan).into();

        if let Some(manager) = self.manager.as_mut() {
            if let Err(e) = manager.play(data.with_settings(settings)) {
                log::warn!("audio: failed to play '{name}': {e}");
            }
        }
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn set_volume(&mut self, category: SoundCategory, volume: f32) {
        self.mixer.set_volume(category, volume);
        if category == SoundCategory::Music {
            self.refresh_music();
        }
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.mixer.set_master(volume);
        self.refresh_music();
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.mixer.set_muted(muted);
        self.refresh_music();
    }

    /// Sound effects already playing keep their volume; looping music
    /// follows mixer changes.
    fn refresh_music(&mut self) {
        let target = self.mixer.effective(SoundCategory::Music, 1.0) as f64;
        if let Some(handle) = self.active_music.as_mut() {
            handle.set_volume(Volume::Amplitude(target), tween(0.05));
        }
    }
}

impl Default for AudioContext {
    fn default() -> Self {
        Self::new(&AudioConfig::default())
    }
}
