//! Frame-based animation.
//!
//! An [`Animation`] is an ordered list of [`Texture`] frames advanced on a
//! fixed frame interval. It is loaded from a folder laid out as:
//!
//! ```text
//! walk/
//!   anim.json   optional: {"Loop": false, "FPS": 12}
//!   0.png
//!   1.png
//!   ...
//! ```
//!
//! Frames are read from `0.png` upward and loading stops at the first
//! missing index. `Loop` defaults to true and `FPS` to 60.
//!
//! The owner drives it: call [`Animation::update`] with the frame delta and
//! [`Animation::draw`] to render the current frame.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::{BackendError, GraphicsBackend, opacity_tint};
use crate::resources::texture::{DrawOptions, Texture};

/// Name of the optional settings file inside an animation folder.
pub const CONFIG_FILE: &str = "anim.json";

/// Fraction of a frame interval that still counts as a whole one.
const STEP_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Error)]
pub enum AnimationError {
    #[error("no frames found in {}", .0.display())]
    NoFrames(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("animation FPS must be greater than zero")]
    InvalidFps,

    #[error("failed to load frame {index}: {source}")]
    Frame {
        index: usize,
        #[source]
        source: BackendError,
    },
}

/// Contents of `anim.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(rename = "Loop", default = "default_loop")]
    pub looping: bool,
    #[serde(rename = "FPS", default = "default_fps")]
    pub fps: u32,
}

fn default_loop() -> bool {
    true
}

fn default_fps() -> u32 {
    60
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            looping: default_loop(),
            fps: default_fps(),
        }
    }
}

impl AnimationConfig {
    /// Read `anim.json` from `folder`, or the defaults when it is absent.
    pub fn load(folder: &Path) -> Result<Self, AnimationError> {
        let path = folder.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path).map_err(|source| AnimationError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| AnimationError::ConfigParse { path, source })
    }
}

pub struct Animation<G: GraphicsBackend> {
    frames: Vec<Texture<G>>,
    looping: bool,
    frame_time: f32,
    current_frame: usize,
    timer: f32,
    playing: bool,
    opacity: f32,
}

impl<G: GraphicsBackend> Animation<G> {
    /// Load every numbered frame of `folder` along with its `anim.json`.
    pub fn load(gfx: &mut G, folder: impl AsRef<Path>) -> Result<Self, AnimationError> {
        let folder = folder.as_ref();
        let config = AnimationConfig::load(folder)?;
        if config.fps == 0 {
            return Err(AnimationError::InvalidFps);
        }

        let mut frames: Vec<Texture<G>> = Vec::new();
        loop {
            let path = folder.join(format!("{}.png", frames.len()));
            if !path.is_file() {
                break;
            }
            let texture = Texture::load(gfx, &path).map_err(|source| AnimationError::Frame {
                index: frames.len(),
                source,
            })?;
            frames.push(texture);
        }
        if frames.is_empty() {
            return Err(AnimationError::NoFrames(folder.to_path_buf()));
        }

        debug!(
            "Loaded animation {:?}: {} frames at {} fps (loop={})",
            folder,
            frames.len(),
            config.fps,
            config.looping
        );
        Self::from_frames(frames, config)
    }

    /// Build from textures that are already loaded.
    pub fn from_frames(
        frames: Vec<Texture<G>>,
        config: AnimationConfig,
    ) -> Result<Self, AnimationError> {
        if frames.is_empty() {
            return Err(AnimationError::NoFrames(PathBuf::new()));
        }
        if config.fps == 0 {
            return Err(AnimationError::InvalidFps);
        }
        Ok(Self {
            frames,
            looping: config.looping,
            frame_time: 1.0 / config.fps as f32,
            current_frame: 0,
            timer: 0.0,
            playing: true,
            opacity: 1.0,
        })
    }

    /// Advance the playhead by `dt` seconds.
    ///
    /// Whole intervals are counted in one division, so advancing by exactly
    /// `k` frame times lands on frame `k` with an empty timer whatever the FPS.
    pub fn update(&mut self, dt: f32) {
        if !self.playing || self.frames.is_empty() || !dt.is_finite() {
            return;
        }
        self.timer += dt;

        let frame_time = f64::from(self.frame_time);
        let timer = f64::from(self.timer);
        let steps = (timer / frame_time + STEP_TOLERANCE).floor();
        if steps < 1.0 {
            return;
        }
        let remainder = (timer - steps * frame_time).max(0.0);
        self.timer = if remainder < frame_time * STEP_TOLERANCE {
            0.0
        } else {
            remainder as f32
        };

        let steps = steps as usize;
        let len = self.frames.len();
        if self.looping {
            self.current_frame = (self.current_frame + steps % len) % len;
        } else if self.current_frame.saturating_add(steps) >= len {
            self.current_frame = len - 1;
            self.playing = false;
            self.timer = 0.0;
        } else {
            self.current_frame += steps;
        }
    }

    /// Draw the current frame. Without an explicit tint the frame is drawn
    /// white with the animation's opacity.
    pub fn draw(&self, gfx: &mut G, x: f32, y: f32, opts: &DrawOptions) {
        let Some(frame) = self.frames.get(self.current_frame) else {
            return;
        };
        let mut opts = *opts;
        if opts.tint.is_none() {
            opts.tint = Some(opacity_tint(self.opacity));
        }
        frame.draw(gfx, x, y, &opts);
    }

    /// Back to frame 0 and playing.
    pub fn reset(&mut self) {
        self.current_frame = 0;
        self.timer = 0.0;
        self.playing = true;
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Release every frame.
    pub fn dispose(&mut self) {
        for frame in &mut self.frames {
            frame.dispose();
        }
        self.frames.clear();
        self.current_frame = 0;
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Seconds each frame stays on screen.
    pub fn frame_time(&self) -> f32 {
        self.frame_time
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }

    /// Texture of the frame currently shown.
    pub fn current_texture(&self) -> Option<&Texture<G>> {
        self.frames.get(self.current_frame)
    }
}
