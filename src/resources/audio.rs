//! Audio registry.
//!
//! [`AudioManager`] owns every registered [`Music`] and [`Sound`], keyed by
//! name, and forwards play/stop requests to them. Call
//! [`AudioManager::update_music`] once per frame so streams keep refilling.
//!
//! Like the texture registry, registering under an existing name replaces
//! the old entry only after the new file loaded successfully.

use std::path::{Path, PathBuf};

use log::{error, warn};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::backend::{AudioBackend, BackendError};
use crate::resources::music::Music;
use crate::resources::sound::{DEFAULT_MAX_CHANNELS, Sound};

/// File extensions accepted for sounds and music.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["wav", "mp3", "ogg"];

/// Errors raised while opening a [`Sound`] or [`Music`].
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("unsupported audio format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("failed to create sample for '{}': {source}", .path.display())]
    SampleCreation {
        path: PathBuf,
        #[source]
        source: BackendError,
    },

    #[error("failed to open stream for '{}': {source}", .path.display())]
    StreamCreation {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// Fail unless `path` ends in one of [`SUPPORTED_EXTENSIONS`] (any case).
pub fn check_extension(path: &Path) -> Result<(), AudioError> {
    let supported = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| ext.eq_ignore_ascii_case(s))
        });
    if supported {
        Ok(())
    } else {
        Err(AudioError::UnsupportedFormat(path.to_path_buf()))
    }
}

pub struct AudioManager<A: AudioBackend> {
    backend: A,
    sound_channels: usize,
    musics: FxHashMap<String, Music<A>>,
    sounds: FxHashMap<String, Sound<A>>,
}

impl<A: AudioBackend + Clone> AudioManager<A> {
    pub fn new(backend: A) -> Self {
        Self::with_sound_channels(backend, DEFAULT_MAX_CHANNELS)
    }

    /// Use `channels` voices for sounds registered without an explicit count.
    pub fn with_sound_channels(backend: A, channels: usize) -> Self {
        Self {
            backend,
            sound_channels: channels.max(1),
            musics: FxHashMap::default(),
            sounds: FxHashMap::default(),
        }
    }

    pub fn backend(&self) -> &A {
        &self.backend
    }

    // Music

    /// Open `path` as a stream and store it under `name`.
    ///
    /// Returns false (and logs) when the track cannot be opened.
    pub fn register_music(
        &mut self,
        name: &str,
        path: impl AsRef<Path>,
        looping: bool,
        volume: f32,
    ) -> bool {
        match Music::new(self.backend.clone(), path, looping, volume) {
            Ok(music) => {
                if let Some(mut old) = self.musics.insert(name.to_string(), music) {
                    if let Err(e) = old.dispose() {
                        error!("Failed to unload replaced music '{}': {}", name, e);
                    }
                }
                true
            }
            Err(e) => {
                error!("Failed to register music '{}': {}", name, e);
                false
            }
        }
    }

    pub fn get_music(&self, name: &str) -> Option<&Music<A>> {
        let music = self.musics.get(name);
        if music.is_none() {
            warn!("Music not found: {}", name);
        }
        music
    }

    pub fn get_music_mut(&mut self, name: &str) -> Option<&mut Music<A>> {
        let music = self.musics.get_mut(name);
        if music.is_none() {
            warn!("Music not found: {}", name);
        }
        music
    }

    pub fn play_music(&mut self, name: &str) {
        if let Some(music) = self.get_music_mut(name) {
            music.play();
        }
    }

    pub fn stop_music(&mut self, name: &str) {
        if let Some(music) = self.get_music_mut(name) {
            music.stop();
        }
    }

    pub fn stop_all_music(&mut self) {
        for music in self.musics.values_mut() {
            music.stop();
        }
    }

    /// Refill every playing stream. Call once per frame.
    pub fn update_music(&mut self) {
        for music in self.musics.values_mut() {
            music.update();
        }
    }

    pub fn unregister_music(&mut self, name: &str) {
        if let Some(mut music) = self.musics.remove(name) {
            if let Err(e) = music.dispose() {
                error!("Failed to unload music '{}': {}", name, e);
            }
        }
    }

    // Sounds

    /// Load `path` as a sound effect with the default channel count.
    pub fn register_sound(&mut self, name: &str, path: impl AsRef<Path>, volume: f32) -> bool {
        self.register_sound_with_channels(name, path, volume, self.sound_channels)
    }

    /// Load `path` as a sound effect that can overlap itself `channels` times.
    pub fn register_sound_with_channels(
        &mut self,
        name: &str,
        path: impl AsRef<Path>,
        volume: f32,
        channels: usize,
    ) -> bool {
        match Sound::new(self.backend.clone(), path, volume, channels) {
            Ok(sound) => {
                if let Some(mut old) = self.sounds.insert(name.to_string(), sound) {
                    if let Err(e) = old.dispose() {
                        error!("Failed to unload replaced sound '{}': {}", name, e);
                    }
                }
                true
            }
            Err(e) => {
                error!("Failed to register sound '{}': {}", name, e);
                false
            }
        }
    }

    pub fn get_sound(&self, name: &str) -> Option<&Sound<A>> {
        let sound = self.sounds.get(name);
        if sound.is_none() {
            warn!("Sound not found: {}", name);
        }
        sound
    }

    pub fn get_sound_mut(&mut self, name: &str) -> Option<&mut Sound<A>> {
        let sound = self.sounds.get_mut(name);
        if sound.is_none() {
            warn!("Sound not found: {}", name);
        }
        sound
    }

    pub fn play_sound(&mut self, name: &str) {
        if let Some(sound) = self.get_sound_mut(name) {
            sound.play();
        }
    }

    pub fn stop_sound(&mut self, name: &str) {
        if let Some(sound) = self.get_sound_mut(name) {
            sound.stop();
        }
    }

    pub fn unregister_sound(&mut self, name: &str) {
        if let Some(mut sound) = self.sounds.remove(name) {
            if let Err(e) = sound.dispose() {
                error!("Failed to unload sound '{}': {}", name, e);
            }
        }
    }

    pub fn music_count(&self) -> usize {
        self.musics.len()
    }

    pub fn sound_count(&self) -> usize {
        self.sounds.len()
    }

    /// Dispose every music and sound, then forget them.
    ///
    /// A backend failure on one entry is logged and does not stop the rest.
    pub fn unload_all(&mut self) {
        for (name, mut music) in self.musics.drain() {
            if let Err(e) = music.dispose() {
                error!("Failed to unload music '{}': {}", name, e);
            }
        }
        for (name, mut sound) in self.sounds.drain() {
            if let Err(e) = sound.dispose() {
                error!("Failed to unload sound '{}': {}", name, e);
            }
        }
    }
}
