//! Streamed music track.
//!
//! Unlike a [`Sound`](crate::resources::sound::Sound), music is decoded
//! incrementally, so [`Music::update`] must run every frame while it plays.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::backend::{AudioBackend, BackendError};
use crate::resources::audio::{AudioError, check_extension};

pub struct Music<A: AudioBackend> {
    backend: A,
    stream: Option<A::Stream>,
    file_name: PathBuf,
    looping: bool,
    volume: f32,
    playing: bool,
    paused: bool,
}

impl<A: AudioBackend> Music<A> {
    pub fn new(
        mut backend: A,
        path: impl AsRef<Path>,
        looping: bool,
        volume: f32,
    ) -> Result<Self, AudioError> {
        let path = path.as_ref();
        check_extension(path)?;

        let mut stream =
            backend
                .load_stream(path, looping)
                .map_err(|source| AudioError::StreamCreation {
                    path: path.to_path_buf(),
                    source,
                })?;
        let volume = volume.clamp(0.0, 1.0);
        backend.set_stream_volume(&mut stream, volume);
        debug!("Opened music stream {:?} (loop={})", path, looping);

        Ok(Self {
            backend,
            stream: Some(stream),
            file_name: path.to_path_buf(),
            looping,
            volume,
            playing: false,
            paused: false,
        })
    }

    /// Play from the beginning.
    pub fn play(&mut self) {
        if let Some(stream) = self.stream.as_mut() {
            self.backend.set_stream_volume(stream, self.volume);
            self.backend.play_stream(stream);
            self.playing = true;
            self.paused = false;
        }
    }

    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.as_mut() {
            self.backend.stop_stream(stream);
        }
        self.playing = false;
        self.paused = false;
    }

    pub fn pause(&mut self) {
        if !self.playing {
            return;
        }
        if let Some(stream) = self.stream.as_mut() {
            self.backend.pause_stream(stream);
            self.playing = false;
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        if let Some(stream) = self.stream.as_mut() {
            self.backend.resume_stream(stream);
            self.playing = true;
            self.paused = false;
        }
    }

    /// Refill the stream. A non-looping track that ran out stops playing.
    pub fn update(&mut self) {
        if !self.playing {
            return;
        }
        if let Some(stream) = self.stream.as_mut() {
            self.backend.update_stream(stream);
            if !self.backend.is_stream_playing(stream) {
                self.playing = false;
            }
        }
    }

    /// Clamped to 0..1.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(stream) = self.stream.as_mut() {
            self.backend.set_stream_volume(stream, self.volume);
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn is_loaded(&self) -> bool {
        self.stream.is_some()
    }

    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    /// Backend stream handle, if still loaded.
    pub fn stream(&self) -> Option<&A::Stream> {
        self.stream.as_ref()
    }

    /// Stop and close the stream. Calling it again does nothing.
    pub fn dispose(&mut self) -> Result<(), BackendError> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };
        self.backend.stop_stream(&mut stream);
        self.playing = false;
        self.paused = false;
        self.backend.unload_stream(stream).inspect_err(|e| {
            warn!("Failed to close music stream {:?}: {}", self.file_name, e);
        })
    }
}

impl<A: AudioBackend> Drop for Music<A> {
    fn drop(&mut self) {
        let _ = self.dispose();
    }
}
