//! Raylib implementation of the backend contracts.
//!
//! [`RaylibBackend`] owns the window handle and implements both
//! [`GraphicsBackend`] and [`WindowBackend`]. Loading goes through the safe
//! raylib API (handles unload themselves on drop); the per-draw passthroughs
//! call `raylib::ffi` directly so they can run between
//! [`begin_frame`](RaylibBackend::begin_frame) and
//! [`end_frame`](RaylibBackend::end_frame) without borrowing a draw handle.
//!
//! [`RaylibAudioBackend`] keeps the audio device alive for as long as any
//! clone of it exists. Voices are raylib sound aliases sharing the sample
//! data of their source sound.
//!
//! Both are NonSend: raylib must be driven from the thread that opened the
//! window.

use std::ffi::CString;
use std::path::Path;
use std::rc::Rc;

use ::raylib::core::audio::RaylibAudio;
use ::raylib::ffi::{self, BlendMode as RlBlendMode, TextureFilter};
use ::raylib::prelude::{Color, RaylibHandle, RaylibThread, RenderTexture2D, Texture2D};
use log::info;

use super::{
    AudioBackend, BackendError, BlendMode, DrawCommand, GraphicsBackend, RenderFilter,
    WindowBackend,
};

fn to_cstring(path: &Path) -> Result<CString, BackendError> {
    let s = path
        .to_str()
        .ok_or_else(|| BackendError::InvalidPath(path.to_path_buf()))?;
    CString::new(s).map_err(|_| BackendError::InvalidPath(path.to_path_buf()))
}

fn filter_value(filter: RenderFilter) -> i32 {
    match filter {
        RenderFilter::Nearest => TextureFilter::TEXTURE_FILTER_POINT as i32,
        RenderFilter::Bilinear => TextureFilter::TEXTURE_FILTER_BILINEAR as i32,
    }
}

fn blend_value(blend: BlendMode) -> i32 {
    match blend {
        BlendMode::Alpha => RlBlendMode::BLEND_ALPHA as i32,
        BlendMode::Additive => RlBlendMode::BLEND_ADDITIVE as i32,
        BlendMode::Multiplied => RlBlendMode::BLEND_MULTIPLIED as i32,
        BlendMode::AddColors => RlBlendMode::BLEND_ADD_COLORS as i32,
        BlendMode::SubtractColors => RlBlendMode::BLEND_SUBTRACT_COLORS as i32,
        BlendMode::AlphaPremultiply => RlBlendMode::BLEND_ALPHA_PREMULTIPLY as i32,
    }
}

/// Window, renderer and texture loader backed by raylib.
pub struct RaylibBackend {
    rl: RaylibHandle,
    thread: RaylibThread,
}

impl RaylibBackend {
    /// Wrap an already opened raylib window.
    pub fn new(rl: RaylibHandle, thread: RaylibThread) -> Self {
        Self { rl, thread }
    }

    pub fn handle(&self) -> &RaylibHandle {
        &self.rl
    }

    pub fn handle_mut(&mut self) -> &mut RaylibHandle {
        &mut self.rl
    }

    pub fn thread(&self) -> &RaylibThread {
        &self.thread
    }

    pub fn window_should_close(&self) -> bool {
        self.rl.window_should_close()
    }

    /// Seconds elapsed during the last frame.
    pub fn frame_time(&self) -> f32 {
        self.rl.get_frame_time()
    }

    /// Start drawing a frame on the window.
    pub fn begin_frame(&mut self) {
        unsafe {
            ffi::BeginDrawing();
        }
    }

    /// Present the frame started with [`begin_frame`](Self::begin_frame).
    pub fn end_frame(&mut self) {
        unsafe {
            ffi::EndDrawing();
        }
    }

    /// Toggle vertical sync through the window state flags.
    pub fn set_vsync(&mut self, enabled: bool) {
        unsafe {
            if enabled {
                ffi::SetWindowState(ffi::ConfigFlags::FLAG_VSYNC_HINT as u32);
            } else {
                ffi::ClearWindowState(ffi::ConfigFlags::FLAG_VSYNC_HINT as u32);
            }
        }
    }
}

impl GraphicsBackend for RaylibBackend {
    type Texture = Texture2D;
    type Surface = RenderTexture2D;

    fn load_texture(&mut self, path: &Path) -> Result<Texture2D, BackendError> {
        let file = path
            .to_str()
            .ok_or_else(|| BackendError::InvalidPath(path.to_path_buf()))?;
        self.rl
            .load_texture(&self.thread, file)
            .map_err(|e| BackendError::Load {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn texture_size(&self, texture: &Texture2D) -> (f32, f32) {
        (texture.width as f32, texture.height as f32)
    }

    fn set_texture_filter(&mut self, texture: &mut Texture2D, filter: RenderFilter) {
        unsafe {
            ffi::SetTextureFilter(**texture, filter_value(filter));
        }
    }

    fn draw_texture(&mut self, texture: &Texture2D, cmd: &DrawCommand) {
        unsafe {
            ffi::BeginBlendMode(blend_value(cmd.blend));
            ffi::DrawTexturePro(
                **texture,
                cmd.source.into(),
                cmd.dest.into(),
                cmd.origin.into(),
                cmd.rotation,
                cmd.tint.into(),
            );
            ffi::EndBlendMode();
        }
    }

    fn create_surface(&mut self, width: u32, height: u32) -> Result<RenderTexture2D, BackendError> {
        self.rl
            .load_render_texture(&self.thread, width, height)
            .map_err(|e| BackendError::Surface {
                width,
                height,
                reason: e.to_string(),
            })
    }

    fn set_surface_filter(&mut self, surface: &mut RenderTexture2D, filter: RenderFilter) {
        unsafe {
            ffi::SetTextureFilter(surface.texture, filter_value(filter));
        }
    }

    fn begin_surface(&mut self, surface: &mut RenderTexture2D) {
        unsafe {
            ffi::BeginTextureMode(**surface);
        }
    }

    fn end_surface(&mut self) {
        unsafe {
            ffi::EndTextureMode();
        }
    }

    fn clear(&mut self, color: Color) {
        unsafe {
            ffi::ClearBackground(color.into());
        }
    }

    fn draw_surface(&mut self, surface: &RenderTexture2D, cmd: &DrawCommand) {
        unsafe {
            ffi::DrawTexturePro(
                surface.texture,
                cmd.source.into(),
                cmd.dest.into(),
                cmd.origin.into(),
                cmd.rotation,
                cmd.tint.into(),
            );
        }
    }

    fn screen_size(&self) -> (i32, i32) {
        (self.rl.get_screen_width(), self.rl.get_screen_height())
    }
}

impl WindowBackend for RaylibBackend {
    fn window_size(&self) -> (i32, i32) {
        (self.rl.get_screen_width(), self.rl.get_screen_height())
    }

    fn is_window_resized(&self) -> bool {
        self.rl.is_window_resized()
    }

    fn set_window_size(&mut self, width: i32, height: i32) {
        self.rl.set_window_size(width, height);
    }
}

/// Music stream handle: the raw raylib stream.
pub struct RaylibStream(ffi::Music);

/// Audio backend backed by the raylib audio device.
#[derive(Clone)]
pub struct RaylibAudioBackend {
    _device: Rc<RaylibAudio>,
}

impl RaylibAudioBackend {
    /// Open the default audio device.
    pub fn init() -> Result<Self, BackendError> {
        let device =
            RaylibAudio::init_audio_device().map_err(|e| BackendError::Device(e.to_string()))?;
        info!("audio device initialized");
        Ok(Self {
            _device: Rc::new(device),
        })
    }
}

impl AudioBackend for RaylibAudioBackend {
    type Sample = ffi::Sound;
    type Voice = ffi::Sound;
    type Stream = RaylibStream;

    fn load_sample(&mut self, path: &Path) -> Result<ffi::Sound, BackendError> {
        let c_path = to_cstring(path)?;
        let sound = unsafe { ffi::LoadSound(c_path.as_ptr()) };
        if sound.stream.buffer.is_null() {
            return Err(BackendError::Load {
                path: path.to_path_buf(),
                reason: "raylib could not decode the sample".to_string(),
            });
        }
        Ok(sound)
    }

    fn create_voice(&mut self, sample: &ffi::Sound) -> Result<ffi::Sound, BackendError> {
        let alias = unsafe { ffi::LoadSoundAlias(*sample) };
        if alias.stream.buffer.is_null() {
            return Err(BackendError::Device(
                "raylib could not allocate a sound alias".to_string(),
            ));
        }
        Ok(alias)
    }

    fn play_voice(&mut self, voice: &ffi::Sound) {
        unsafe { ffi::PlaySound(*voice) }
    }

    fn stop_voice(&mut self, voice: &ffi::Sound) {
        unsafe { ffi::StopSound(*voice) }
    }

    fn is_voice_playing(&self, voice: &ffi::Sound) -> bool {
        unsafe { ffi::IsSoundPlaying(*voice) }
    }

    fn set_voice_volume(&mut self, voice: &ffi::Sound, volume: f32) {
        unsafe { ffi::SetSoundVolume(*voice, volume) }
    }

    fn set_voice_pitch(&mut self, voice: &ffi::Sound, pitch: f32) {
        unsafe { ffi::SetSoundPitch(*voice, pitch) }
    }

    fn set_voice_pan(&mut self, voice: &ffi::Sound, pan: f32) {
        // raylib pans over 0..1 with 0.5 centered
        unsafe { ffi::SetSoundPan(*voice, (pan + 1.0) * 0.5) }
    }

    fn unload_voice(&mut self, voice: ffi::Sound) -> Result<(), BackendError> {
        unsafe { ffi::UnloadSoundAlias(voice) };
        Ok(())
    }

    fn unload_sample(&mut self, sample: ffi::Sound) -> Result<(), BackendError> {
        unsafe { ffi::UnloadSound(sample) };
        Ok(())
    }

    fn load_stream(&mut self, path: &Path, looping: bool) -> Result<RaylibStream, BackendError> {
        let c_path = to_cstring(path)?;
        let mut music = unsafe { ffi::LoadMusicStream(c_path.as_ptr()) };
        if music.stream.buffer.is_null() {
            return Err(BackendError::Load {
                path: path.to_path_buf(),
                reason: "raylib could not open the music stream".to_string(),
            });
        }
        music.looping = looping;
        Ok(RaylibStream(music))
    }

    fn play_stream(&mut self, stream: &mut RaylibStream) {
        unsafe {
            ffi::SeekMusicStream(stream.0, 0.0);
            ffi::PlayMusicStream(stream.0);
        }
    }

    fn stop_stream(&mut self, stream: &mut RaylibStream) {
        unsafe { ffi::StopMusicStream(stream.0) }
    }

    fn pause_stream(&mut self, stream: &mut RaylibStream) {
        unsafe { ffi::PauseMusicStream(stream.0) }
    }

    fn resume_stream(&mut self, stream: &mut RaylibStream) {
        unsafe { ffi::ResumeMusicStream(stream.0) }
    }

    fn update_stream(&mut self, stream: &mut RaylibStream) {
        unsafe { ffi::UpdateMusicStream(stream.0) }
    }

    fn is_stream_playing(&self, stream: &RaylibStream) -> bool {
        unsafe { ffi::IsMusicStreamPlaying(stream.0) }
    }

    fn set_stream_volume(&mut self, stream: &mut RaylibStream, volume: f32) {
        unsafe { ffi::SetMusicVolume(stream.0, volume) }
    }

    fn unload_stream(&mut self, stream: RaylibStream) -> Result<(), BackendError> {
        unsafe { ffi::UnloadMusicStream(stream.0) };
        Ok(())
    }
}
