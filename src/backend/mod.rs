//! Backend contracts consumed by the framework.
//!
//! Every component in this crate is a thin state-holder; the actual decode,
//! blit, mix and window work is forwarded to a backend. The traits here name
//! exactly the operations the components rely on:
//!
//! - [`GraphicsBackend`] – load/draw/unload textures and offscreen surfaces
//! - [`AudioBackend`] – samples with playback voices, and streamed music
//! - [`WindowBackend`] – query and resize the OS window
//!
//! Two implementations ship with the crate:
//! - [`raylib`] – the real thing, driving a raylib window and audio device
//! - [`headless`] – records every call in memory, used by tests and tools
//!
//! Handles are associated types. Backends are expected to release a handle
//! when it is dropped, so owners get single-release semantics for free.

pub mod headless;
pub mod raylib;

use std::path::{Path, PathBuf};

use ::raylib::prelude::{Color, Rectangle, Vector2};
use thiserror::Error;

/// Errors reported by a backend while acquiring or releasing a resource.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to load '{}': {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    #[error("path is not valid UTF-8 or contains NUL: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("failed to create {width}x{height} render surface: {reason}")]
    Surface {
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("audio device unavailable: {0}")]
    Device(String),

    #[error("failed to release resource: {0}")]
    Unload(String),
}

/// Color blending applied while a texture is drawn.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum BlendMode {
    /// Regular alpha blending.
    #[default]
    Alpha,
    Additive,
    Multiplied,
    AddColors,
    SubtractColors,
    AlphaPremultiply,
}

/// Texture filtering mode used when a texture is scaled.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum RenderFilter {
    /// Point/nearest-neighbor filtering - sharp pixels, no blur.
    #[default]
    Nearest,
    /// Bilinear filtering - smooth scaling with interpolation.
    Bilinear,
}

/// A fully resolved textured quad, ready to hand to the backend.
///
/// A negative source width or height mirrors the image along that axis.
/// `origin` is in destination space (already multiplied by the scale).
#[derive(Clone, Copy, Debug)]
pub struct DrawCommand {
    pub source: Rectangle,
    pub dest: Rectangle,
    pub origin: Vector2,
    /// Rotation in degrees around `origin`.
    pub rotation: f32,
    pub tint: Color,
    pub blend: BlendMode,
}

/// Image decode and blit operations.
pub trait GraphicsBackend {
    /// Decoded image living on the GPU. Released on drop.
    type Texture;
    /// Offscreen render target. Released on drop.
    type Surface;

    fn load_texture(&mut self, path: &Path) -> Result<Self::Texture, BackendError>;

    /// Width and height of a texture in pixels.
    fn texture_size(&self, texture: &Self::Texture) -> (f32, f32);

    fn set_texture_filter(&mut self, texture: &mut Self::Texture, filter: RenderFilter);

    fn draw_texture(&mut self, texture: &Self::Texture, cmd: &DrawCommand);

    fn create_surface(&mut self, width: u32, height: u32) -> Result<Self::Surface, BackendError>;

    fn set_surface_filter(&mut self, surface: &mut Self::Surface, filter: RenderFilter);

    /// Redirect subsequent draw calls into `surface` until [`end_surface`](Self::end_surface).
    fn begin_surface(&mut self, surface: &mut Self::Surface);

    fn end_surface(&mut self);

    /// Fill the current render target with a solid color.
    fn clear(&mut self, color: Color);

    /// Draw the color attachment of `surface` onto the current target.
    fn draw_surface(&mut self, surface: &Self::Surface, cmd: &DrawCommand);

    /// Live size of the window framebuffer in pixels.
    fn screen_size(&self) -> (i32, i32);
}

/// Sample/voice and stream operations.
///
/// A *sample* is a decoded clip. A *voice* is one playback slot bound to a
/// sample; several voices on the same sample let the clip overlap itself.
/// A *stream* is music decoded incrementally and refilled every frame.
///
/// Pan values are in `-1.0..=1.0`, `0.0` being centered.
pub trait AudioBackend {
    type Sample;
    type Voice;
    type Stream;

    fn load_sample(&mut self, path: &Path) -> Result<Self::Sample, BackendError>;
    fn create_voice(&mut self, sample: &Self::Sample) -> Result<Self::Voice, BackendError>;
    fn play_voice(&mut self, voice: &Self::Voice);
    fn stop_voice(&mut self, voice: &Self::Voice);
    fn is_voice_playing(&self, voice: &Self::Voice) -> bool;
    fn set_voice_volume(&mut self, voice: &Self::Voice, volume: f32);
    fn set_voice_pitch(&mut self, voice: &Self::Voice, pitch: f32);
    fn set_voice_pan(&mut self, voice: &Self::Voice, pan: f32);
    fn unload_voice(&mut self, voice: Self::Voice) -> Result<(), BackendError>;
    fn unload_sample(&mut self, sample: Self::Sample) -> Result<(), BackendError>;

    fn load_stream(&mut self, path: &Path, looping: bool) -> Result<Self::Stream, BackendError>;
    /// Start the stream from the beginning.
    fn play_stream(&mut self, stream: &mut Self::Stream);
    fn stop_stream(&mut self, stream: &mut Self::Stream);
    fn pause_stream(&mut self, stream: &mut Self::Stream);
    fn resume_stream(&mut self, stream: &mut Self::Stream);
    /// Refill the stream buffers. Must be called regularly while playing.
    fn update_stream(&mut self, stream: &mut Self::Stream);
    fn is_stream_playing(&self, stream: &Self::Stream) -> bool;
    fn set_stream_volume(&mut self, stream: &mut Self::Stream, volume: f32);
    fn unload_stream(&mut self, stream: Self::Stream) -> Result<(), BackendError>;
}

/// OS window queries needed by [`WindowController`](crate::resources::windowcontroller::WindowController).
pub trait WindowBackend {
    fn window_size(&self) -> (i32, i32);
    /// True only on the frame the user resized the window.
    fn is_window_resized(&self) -> bool;
    fn set_window_size(&mut self, width: i32, height: i32);
}

/// Build an opaque white tint carrying `opacity` (clamped to 0..1) as alpha.
pub fn opacity_tint(opacity: f32) -> Color {
    let a = (255.0 * opacity.clamp(0.0, 1.0)) as u8;
    Color::new(255, 255, 255, a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opacity_tint_clamps() {
        assert_eq!(opacity_tint(1.0).a, 255);
        assert_eq!(opacity_tint(2.5).a, 255);
        assert_eq!(opacity_tint(-1.0).a, 0);
        assert_eq!(opacity_tint(0.5).a, 127);
        assert_eq!(opacity_tint(0.5).r, 255);
    }

    #[test]
    fn test_error_messages_name_the_path() {
        let err = BackendError::Load {
            path: PathBuf::from("assets/missing.png"),
            reason: "not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to load 'assets/missing.png': not found"
        );
    }
}
