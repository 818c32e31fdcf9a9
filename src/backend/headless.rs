//! In-memory backends that never touch a GPU, audio device or window.
//!
//! They behave like the real thing as far as the framework can observe:
//! loading fails when the file does not exist (or was marked as failing),
//! handles release themselves on drop, voices report whether they are
//! playing. Every call is recorded so tests can assert on it.
//!
//! Both backends share their state through `Rc<RefCell<_>>`, so a clone
//! is another view of the same device.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use ::raylib::prelude::Color;
use rustc_hash::{FxHashMap, FxHashSet};

use super::{
    AudioBackend, BackendError, DrawCommand, GraphicsBackend, RenderFilter, WindowBackend,
};

/// Something the headless graphics backend was asked to draw.
#[derive(Clone, Debug)]
pub enum DrawCall {
    Texture { id: u32, cmd: DrawCommand },
    Surface { id: u32, cmd: DrawCommand },
    Clear(Color),
    BeginSurface(u32),
    EndSurface,
}

#[derive(Debug)]
struct GraphicsState {
    next_id: u32,
    texture_size: (f32, f32),
    screen: (i32, i32),
    resized: bool,
    failing: FxHashSet<PathBuf>,
    calls: Vec<DrawCall>,
    filters: FxHashMap<u32, RenderFilter>,
    released: Vec<u32>,
}

/// Texture handle of the headless graphics backend.
#[derive(Debug)]
pub struct HeadlessTexture {
    id: u32,
    width: f32,
    height: f32,
    path: PathBuf,
    state: Rc<RefCell<GraphicsState>>,
}

impl HeadlessTexture {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for HeadlessTexture {
    fn drop(&mut self) {
        self.state.borrow_mut().released.push(self.id);
    }
}

/// Surface handle of the headless graphics backend.
#[derive(Debug)]
pub struct HeadlessSurface {
    id: u32,
    width: u32,
    height: u32,
    state: Rc<RefCell<GraphicsState>>,
}

impl HeadlessSurface {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for HeadlessSurface {
    fn drop(&mut self) {
        self.state.borrow_mut().released.push(self.id);
    }
}

/// Graphics and window backend recording into memory.
#[derive(Clone, Debug)]
pub struct HeadlessGraphics {
    state: Rc<RefCell<GraphicsState>>,
}

impl Default for HeadlessGraphics {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl HeadlessGraphics {
    /// Create a backend whose window is `width` x `height` pixels.
    ///
    /// Loaded textures report a size of 64x64 unless changed with
    /// [`set_texture_size`](Self::set_texture_size).
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            state: Rc::new(RefCell::new(GraphicsState {
                next_id: 1,
                texture_size: (64.0, 64.0),
                screen: (width, height),
                resized: false,
                failing: FxHashSet::default(),
                calls: Vec::new(),
                filters: FxHashMap::default(),
                released: Vec::new(),
            })),
        }
    }

    /// Size reported by textures loaded from now on.
    pub fn set_texture_size(&self, width: f32, height: f32) {
        self.state.borrow_mut().texture_size = (width, height);
    }

    /// Make every future load of `path` fail even if the file exists.
    pub fn fail_on(&self, path: impl Into<PathBuf>) {
        self.state.borrow_mut().failing.insert(path.into());
    }

    /// Simulate the user dragging the window to a new size.
    ///
    /// [`WindowBackend::is_window_resized`] reports true until the next
    /// [`clear_resize`](Self::clear_resize) or [`WindowBackend::set_window_size`].
    pub fn simulate_resize(&self, width: i32, height: i32) {
        let mut state = self.state.borrow_mut();
        state.screen = (width, height);
        state.resized = true;
    }

    pub fn clear_resize(&self) {
        self.state.borrow_mut().resized = false;
    }

    /// Every draw call issued so far, in order.
    pub fn calls(&self) -> Vec<DrawCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Ids of every texture and surface released so far, in order.
    pub fn released(&self) -> Vec<u32> {
        self.state.borrow().released.clone()
    }

    /// Last filter applied to the texture or surface with `id`.
    pub fn filter_of(&self, id: u32) -> Option<RenderFilter> {
        self.state.borrow().filters.get(&id).copied()
    }

    fn next_id(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        id
    }

    fn record(&self, call: DrawCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl GraphicsBackend for HeadlessGraphics {
    type Texture = HeadlessTexture;
    type Surface = HeadlessSurface;

    fn load_texture(&mut self, path: &Path) -> Result<HeadlessTexture, BackendError> {
        if self.state.borrow().failing.contains(path) {
            return Err(BackendError::Load {
                path: path.to_path_buf(),
                reason: "decode failed".to_string(),
            });
        }
        if !path.is_file() {
            return Err(BackendError::Load {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }
        let (width, height) = self.state.borrow().texture_size;
        Ok(HeadlessTexture {
            id: self.next_id(),
            width,
            height,
            path: path.to_path_buf(),
            state: Rc::clone(&self.state),
        })
    }

    fn texture_size(&self, texture: &HeadlessTexture) -> (f32, f32) {
        (texture.width, texture.height)
    }

    fn set_texture_filter(&mut self, texture: &mut HeadlessTexture, filter: RenderFilter) {
        self.state.borrow_mut().filters.insert(texture.id, filter);
    }

    fn draw_texture(&mut self, texture: &HeadlessTexture, cmd: &DrawCommand) {
        self.record(DrawCall::Texture {
            id: texture.id,
            cmd: *cmd,
        });
    }

    fn create_surface(&mut self, width: u32, height: u32) -> Result<HeadlessSurface, BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::Surface {
                width,
                height,
                reason: "zero-sized surface".to_string(),
            });
        }
        Ok(HeadlessSurface {
            id: self.next_id(),
            width,
            height,
            state: Rc::clone(&self.state),
        })
    }

    fn set_surface_filter(&mut self, surface: &mut HeadlessSurface, filter: RenderFilter) {
        self.state.borrow_mut().filters.insert(surface.id, filter);
    }

    fn begin_surface(&mut self, surface: &mut HeadlessSurface) {
        self.record(DrawCall::BeginSurface(surface.id));
    }

    fn end_surface(&mut self) {
        self.record(DrawCall::EndSurface);
    }

    fn clear(&mut self, color: Color) {
        self.record(DrawCall::Clear(color));
    }

    fn draw_surface(&mut self, surface: &HeadlessSurface, cmd: &DrawCommand) {
        self.record(DrawCall::Surface {
            id: surface.id,
            cmd: *cmd,
        });
    }

    fn screen_size(&self) -> (i32, i32) {
        self.state.borrow().screen
    }
}

impl WindowBackend for HeadlessGraphics {
    fn window_size(&self) -> (i32, i32) {
        self.state.borrow().screen
    }

    fn is_window_resized(&self) -> bool {
        self.state.borrow().resized
    }

    fn set_window_size(&mut self, width: i32, height: i32) {
        let mut state = self.state.borrow_mut();
        state.screen = (width, height);
        state.resized = false;
    }
}

#[derive(Debug, Default)]
struct VoiceState {
    sample: u32,
    playing: bool,
    volume: f32,
    pitch: f32,
    pan: f32,
}

#[derive(Debug, Default)]
struct StreamState {
    path: PathBuf,
    looping: bool,
    playing: bool,
    paused: bool,
    volume: f32,
    updates: u32,
}

#[derive(Debug, Default)]
struct AudioState {
    next_id: u32,
    failing: FxHashSet<PathBuf>,
    failing_unloads: bool,
    samples: FxHashSet<u32>,
    voices: FxHashMap<u32, VoiceState>,
    streams: FxHashMap<u32, StreamState>,
    freed_samples: Vec<u32>,
    freed_streams: Vec<u32>,
}

/// Audio backend recording into memory.
///
/// Voices keep playing until [`finish_voices`](Self::finish_voices) is
/// called; streams until [`finish_stream`](Self::finish_stream).
#[derive(Clone, Debug, Default)]
pub struct HeadlessAudio {
    state: Rc<RefCell<AudioState>>,
}

/// Sample handle of the headless audio backend.
#[derive(Debug)]
pub struct HeadlessSample(u32);

/// Voice handle of the headless audio backend.
#[derive(Debug)]
pub struct HeadlessVoice(u32);

/// Stream handle of the headless audio backend.
#[derive(Debug)]
pub struct HeadlessStream(u32);

impl HeadlessSample {
    pub fn id(&self) -> u32 {
        self.0
    }
}

impl HeadlessVoice {
    pub fn id(&self) -> u32 {
        self.0
    }
}

impl HeadlessStream {
    pub fn id(&self) -> u32 {
        self.0
    }
}

impl HeadlessAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future load of `path` fail even if the file exists.
    pub fn fail_on(&self, path: impl Into<PathBuf>) {
        self.state.borrow_mut().failing.insert(path.into());
    }

    /// Make every unload report an error (the resource is still released).
    pub fn fail_unloads(&self, fail: bool) {
        self.state.borrow_mut().failing_unloads = fail;
    }

    /// Number of voices currently playing across every sample.
    pub fn active_voices(&self) -> usize {
        self.state
            .borrow()
            .voices
            .values()
            .filter(|v| v.playing)
            .count()
    }

    /// Number of voices alive (allocated and not unloaded).
    pub fn voice_count(&self) -> usize {
        self.state.borrow().voices.len()
    }

    /// Volumes of every playing voice.
    pub fn playing_volumes(&self) -> Vec<f32> {
        self.state
            .borrow()
            .voices
            .values()
            .filter(|v| v.playing)
            .map(|v| v.volume)
            .collect()
    }

    /// Pitch and pan of every voice bound to the sample with `sample` id.
    pub fn voice_settings(&self, sample: u32) -> Vec<(f32, f32)> {
        self.state
            .borrow()
            .voices
            .values()
            .filter(|v| v.sample == sample)
            .map(|v| (v.pitch, v.pan))
            .collect()
    }

    /// Ids of every sample currently loaded.
    pub fn loaded_samples(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.state.borrow().samples.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Mark every playing voice as finished.
    pub fn finish_voices(&self) {
        for voice in self.state.borrow_mut().voices.values_mut() {
            voice.playing = false;
        }
    }

    /// Simulate the stream with `id` reaching its end.
    ///
    /// Looping streams rewind and keep playing, like a real device would.
    pub fn finish_stream(&self, id: u32) {
        let mut state = self.state.borrow_mut();
        if let Some(stream) = state.streams.get_mut(&id) {
            if !stream.looping {
                stream.playing = false;
            }
        }
    }

    pub fn is_stream_paused(&self, id: u32) -> bool {
        self.state
            .borrow()
            .streams
            .get(&id)
            .map(|s| s.paused)
            .unwrap_or(false)
    }

    pub fn stream_volume(&self, id: u32) -> Option<f32> {
        self.state.borrow().streams.get(&id).map(|s| s.volume)
    }

    /// How many times the stream with `id` was refilled.
    pub fn stream_updates(&self, id: u32) -> u32 {
        self.state
            .borrow()
            .streams
            .get(&id)
            .map(|s| s.updates)
            .unwrap_or(0)
    }

    /// Path the stream with `id` was opened from.
    pub fn stream_path(&self, id: u32) -> Option<PathBuf> {
        self.state.borrow().streams.get(&id).map(|s| s.path.clone())
    }

    pub fn freed_samples(&self) -> Vec<u32> {
        self.state.borrow().freed_samples.clone()
    }

    pub fn freed_streams(&self) -> Vec<u32> {
        self.state.borrow().freed_streams.clone()
    }

    fn check_load(&self, path: &Path) -> Result<u32, BackendError> {
        let mut state = self.state.borrow_mut();
        if state.failing.contains(path) {
            return Err(BackendError::Load {
                path: path.to_path_buf(),
                reason: "decode failed".to_string(),
            });
        }
        if !path.is_file() {
            return Err(BackendError::Load {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }
        state.next_id += 1;
        Ok(state.next_id)
    }

    fn unload_result(&self) -> Result<(), BackendError> {
        if self.state.borrow().failing_unloads {
            Err(BackendError::Unload("device rejected unload".to_string()))
        } else {
            Ok(())
        }
    }

    fn with_voice(&self, voice: &HeadlessVoice, f: impl FnOnce(&mut VoiceState)) {
        if let Some(state) = self.state.borrow_mut().voices.get_mut(&voice.0) {
            f(state);
        }
    }

    fn with_stream(&self, stream: &HeadlessStream, f: impl FnOnce(&mut StreamState)) {
        if let Some(state) = self.state.borrow_mut().streams.get_mut(&stream.0) {
            f(state);
        }
    }
}

impl AudioBackend for HeadlessAudio {
    type Sample = HeadlessSample;
    type Voice = HeadlessVoice;
    type Stream = HeadlessStream;

    fn load_sample(&mut self, path: &Path) -> Result<HeadlessSample, BackendError> {
        let id = self.check_load(path)?;
        self.state.borrow_mut().samples.insert(id);
        Ok(HeadlessSample(id))
    }

    fn create_voice(&mut self, sample: &HeadlessSample) -> Result<HeadlessVoice, BackendError> {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state.voices.insert(
            id,
            VoiceState {
                sample: sample.0,
                volume: 1.0,
                pitch: 1.0,
                ..VoiceState::default()
            },
        );
        Ok(HeadlessVoice(id))
    }

    fn play_voice(&mut self, voice: &HeadlessVoice) {
        self.with_voice(voice, |v| v.playing = true);
    }

    fn stop_voice(&mut self, voice: &HeadlessVoice) {
        self.with_voice(voice, |v| v.playing = false);
    }

    fn is_voice_playing(&self, voice: &HeadlessVoice) -> bool {
        self.state
            .borrow()
            .voices
            .get(&voice.0)
            .map(|v| v.playing)
            .unwrap_or(false)
    }

    fn set_voice_volume(&mut self, voice: &HeadlessVoice, volume: f32) {
        self.with_voice(voice, |v| v.volume = volume);
    }

    fn set_voice_pitch(&mut self, voice: &HeadlessVoice, pitch: f32) {
        self.with_voice(voice, |v| v.pitch = pitch);
    }

    fn set_voice_pan(&mut self, voice: &HeadlessVoice, pan: f32) {
        self.with_voice(voice, |v| v.pan = pan);
    }

    fn unload_voice(&mut self, voice: HeadlessVoice) -> Result<(), BackendError> {
        self.state.borrow_mut().voices.remove(&voice.0);
        self.unload_result()
    }

    fn unload_sample(&mut self, sample: HeadlessSample) -> Result<(), BackendError> {
        {
            let mut state = self.state.borrow_mut();
            state.samples.remove(&sample.0);
            state.freed_samples.push(sample.0);
        }
        self.unload_result()
    }

    fn load_stream(&mut self, path: &Path, looping: bool) -> Result<HeadlessStream, BackendError> {
        let id = self.check_load(path)?;
        self.state.borrow_mut().streams.insert(
            id,
            StreamState {
                path: path.to_path_buf(),
                looping,
                volume: 1.0,
                ..StreamState::default()
            },
        );
        Ok(HeadlessStream(id))
    }

    fn play_stream(&mut self, stream: &mut HeadlessStream) {
        self.with_stream(stream, |s| {
            s.playing = true;
            s.paused = false;
        });
    }

    fn stop_stream(&mut self, stream: &mut HeadlessStream) {
        self.with_stream(stream, |s| {
            s.playing = false;
            s.paused = false;
        });
    }

    fn pause_stream(&mut self, stream: &mut HeadlessStream) {
        self.with_stream(stream, |s| {
            if s.playing {
                s.playing = false;
                s.paused = true;
            }
        });
    }

    fn resume_stream(&mut self, stream: &mut HeadlessStream) {
        self.with_stream(stream, |s| {
            if s.paused {
                s.playing = true;
                s.paused = false;
            }
        });
    }

    fn update_stream(&mut self, stream: &mut HeadlessStream) {
        self.with_stream(stream, |s| s.updates += 1);
    }

    fn is_stream_playing(&self, stream: &HeadlessStream) -> bool {
        self.state
            .borrow()
            .streams
            .get(&stream.0)
            .map(|s| s.playing)
            .unwrap_or(false)
    }

    fn set_stream_volume(&mut self, stream: &mut HeadlessStream, volume: f32) {
        self.with_stream(stream, |s| s.volume = volume);
    }

    fn unload_stream(&mut self, stream: HeadlessStream) -> Result<(), BackendError> {
        {
            let mut state = self.state.borrow_mut();
            state.streams.remove(&stream.0);
            state.freed_streams.push(stream.0);
        }
        self.unload_result()
    }
}
