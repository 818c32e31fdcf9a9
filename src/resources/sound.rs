//! Non-streamed sound effect with a fixed pool of playback voices.
//!
//! A [`Sound`] decodes its file once into a sample and pre-allocates
//! `max_channels` voices on it, so the same effect can overlap itself up to
//! that many times. Playing while every voice is busy is a silent no-op.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::backend::{AudioBackend, BackendError};
use crate::resources::audio::{AudioError, check_extension};

/// Voices allocated when no channel count is given.
pub const DEFAULT_MAX_CHANNELS: usize = 8;

pub struct Sound<A: AudioBackend> {
    backend: A,
    sample: Option<A::Sample>,
    voices: Vec<A::Voice>,
    file_name: PathBuf,
    volume: f32,
    pitch: f32,
    pan: f32,
}

impl<A: AudioBackend> Sound<A> {
    /// Load `path` and allocate `max_channels` voices (at least one).
    pub fn new(
        mut backend: A,
        path: impl AsRef<Path>,
        volume: f32,
        max_channels: usize,
    ) -> Result<Self, AudioError> {
        let path = path.as_ref();
        check_extension(path)?;

        let sample = backend
            .load_sample(path)
            .map_err(|source| AudioError::SampleCreation {
                path: path.to_path_buf(),
                source,
            })?;

        let count = max_channels.max(1);
        let mut voices = Vec::with_capacity(count);
        for _ in 0..count {
            match backend.create_voice(&sample) {
                Ok(voice) => voices.push(voice),
                Err(source) => {
                    for voice in voices.drain(..) {
                        let _ = backend.unload_voice(voice);
                    }
                    let _ = backend.unload_sample(sample);
                    return Err(AudioError::SampleCreation {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            }
        }

        let volume = volume.clamp(0.0, 1.0);
        for voice in &voices {
            backend.set_voice_volume(voice, volume);
        }
        debug!("Loaded sound {:?} with {} voices", path, count);

        Ok(Self {
            backend,
            sample: Some(sample),
            voices,
            file_name: path.to_path_buf(),
            volume,
            pitch: 1.0,
            pan: 0.0,
        })
    }

    /// Start the effect on the first idle voice.
    pub fn play(&mut self) {
        if self.sample.is_none() {
            return;
        }
        let idle = self
            .voices
            .iter()
            .position(|v| !self.backend.is_voice_playing(v));
        match idle {
            Some(i) => {
                let voice = &self.voices[i];
                self.backend.set_voice_volume(voice, self.volume);
                self.backend.play_voice(voice);
            }
            None => debug!("All voices busy for {:?}", self.file_name),
        }
    }

    /// Stop every voice.
    pub fn stop(&mut self) {
        for voice in &self.voices {
            self.backend.stop_voice(voice);
        }
    }

    /// True while any voice is playing.
    pub fn is_playing(&self) -> bool {
        self.voices.iter().any(|v| self.backend.is_voice_playing(v))
    }

    /// Clamped to 0..1. Applies to voices already playing and to future plays.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        for voice in &self.voices {
            self.backend.set_voice_volume(voice, self.volume);
        }
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch;
        for voice in &self.voices {
            self.backend.set_voice_pitch(voice, pitch);
        }
    }

    /// Clamped to -1..1, 0 being centered.
    pub fn set_pan(&mut self, pan: f32) {
        self.pan = pan.clamp(-1.0, 1.0);
        for voice in &self.voices {
            self.backend.set_voice_pan(voice, self.pan);
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn pan(&self) -> f32 {
        self.pan
    }

    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    pub fn is_loaded(&self) -> bool {
        self.sample.is_some()
    }

    /// Number of voices, i.e. how many plays can overlap.
    pub fn channel_count(&self) -> usize {
        self.voices.len()
    }

    /// Free every voice and the sample. Calling it again does nothing.
    ///
    /// Everything is released even when the backend reports failures; the
    /// last failure is returned.
    pub fn dispose(&mut self) -> Result<(), BackendError> {
        let Some(sample) = self.sample.take() else {
            return Ok(());
        };
        let mut result = Ok(());
        for voice in self.voices.drain(..) {
            self.backend.stop_voice(&voice);
            if let Err(e) = self.backend.unload_voice(voice) {
                warn!("Failed to free voice of {:?}: {}", self.file_name, e);
                result = Err(e);
            }
        }
        if let Err(e) = self.backend.unload_sample(sample) {
            warn!("Failed to free sample {:?}: {}", self.file_name, e);
            result = Err(e);
        }
        result
    }
}

impl<A: AudioBackend> Drop for Sound<A> {
    fn drop(&mut self) {
        let _ = self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::HeadlessAudio;
    use std::fs;

    fn wav(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"wav").unwrap();
        path
    }

    #[test]
    fn test_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = wav(dir.path(), "hit.flac");
        let result = Sound::new(HeadlessAudio::new(), &path, 1.0, 4);
        assert!(matches!(result, Err(AudioError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_extension_check_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = wav(dir.path(), "HIT.OGG");
        let sound = Sound::new(HeadlessAudio::new(), &path, 1.0, 4).unwrap();
        assert!(sound.is_loaded());
    }

    #[test]
    fn test_missing_file_fails_sample_creation() {
        let dir = tempfile::tempdir().unwrap();
        let result = Sound::new(HeadlessAudio::new(), dir.path().join("no.wav"), 1.0, 4);
        assert!(matches!(result, Err(AudioError::SampleCreation { .. })));
    }

    #[test]
    fn test_channel_count_has_floor_of_one() {
        let dir = tempfile::tempdir().unwrap();
        let audio = HeadlessAudio::new();
        let sound = Sound::new(audio.clone(), wav(dir.path(), "a.wav"), 1.0, 0).unwrap();
        assert_eq!(sound.channel_count(), 1);
        assert_eq!(audio.voice_count(), 1);
    }

    #[test]
    fn test_full_voice_pool_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let audio = HeadlessAudio::new();
        let mut sound = Sound::new(audio.clone(), wav(dir.path(), "a.wav"), 1.0, 2).unwrap();

        sound.play();
        sound.play();
        assert_eq!(audio.active_voices(), 2);
        sound.play();
        assert_eq!(audio.active_voices(), 2);

        audio.finish_voices();
        assert!(!sound.is_playing());
        sound.play();
        assert_eq!(audio.active_voices(), 1);
    }

    #[test]
    fn test_volume_is_clamped_and_applied() {
        let dir = tempfile::tempdir().unwrap();
        let audio = HeadlessAudio::new();
        let mut sound = Sound::new(audio.clone(), wav(dir.path(), "a.wav"), 0.5, 2).unwrap();

        sound.play();
        assert_eq!(audio.playing_volumes(), vec![0.5]);
        sound.set_volume(3.0);
        assert_eq!(sound.volume(), 1.0);
        assert_eq!(audio.playing_volumes(), vec![1.0]);
        sound.set_volume(-1.0);
        sound.play();
        assert_eq!(audio.playing_volumes(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_pitch_and_pan_apply_to_every_voice() {
        let dir = tempfile::tempdir().unwrap();
        let audio = HeadlessAudio::new();
        let mut sound = Sound::new(audio.clone(), wav(dir.path(), "a.wav"), 1.0, 3).unwrap();

        sound.set_pitch(1.5);
        sound.set_pan(-4.0);
        assert_eq!(sound.pan(), -1.0);

        let sample_id = audio.loaded_samples()[0];
        let settings = audio.voice_settings(sample_id);
        assert_eq!(settings.len(), 3);
        assert!(settings.iter().all(|&(pitch, pan)| pitch == 1.5 && pan == -1.0));
    }

    #[test]
    fn test_stop_silences_every_voice() {
        let dir = tempfile::tempdir().unwrap();
        let audio = HeadlessAudio::new();
        let mut sound = Sound::new(audio.clone(), wav(dir.path(), "a.wav"), 1.0, 3).unwrap();
        sound.play();
        sound.play();
        sound.stop();
        assert_eq!(audio.active_voices(), 0);
    }

    #[test]
    fn test_dispose_frees_once_and_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let audio = HeadlessAudio::new();
        let mut sound = Sound::new(audio.clone(), wav(dir.path(), "a.wav"), 1.0, 2).unwrap();

        audio.fail_unloads(true);
        assert!(sound.dispose().is_err());
        assert!(sound.dispose().is_ok());
        assert!(!sound.is_loaded());
        assert_eq!(audio.voice_count(), 0);
        assert_eq!(audio.freed_samples().len(), 1);

        sound.play();
        assert_eq!(audio.active_voices(), 0);
        drop(sound);
        assert_eq!(audio.freed_samples().len(), 1);
    }

    #[test]
    fn test_drop_frees_sample() {
        let dir = tempfile::tempdir().unwrap();
        let audio = HeadlessAudio::new();
        let sound = Sound::new(audio.clone(), wav(dir.path(), "a.wav"), 1.0, 2).unwrap();
        drop(sound);
        assert_eq!(audio.freed_samples().len(), 1);
        assert_eq!(audio.voice_count(), 0);
    }
}
