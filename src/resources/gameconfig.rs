//! Game configuration.
//!
//! Settings loaded from an INI configuration file. Provides defaults for
//! safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [render]
//! width = 1920
//! height = 1080
//!
//! [window]
//! width = 1280
//! height = 720
//! target_fps = 60
//! vsync = true
//! aspect_lock = true
//! title = Potesara
//!
//! [audio]
//! sound_channels = 8
//! ```

use std::path::PathBuf;

use configparser::ini::Ini;
use log::info;
use thiserror::Error;

use crate::resources::sound::DEFAULT_MAX_CHANNELS;
use crate::scene::manager::{VIRTUAL_HEIGHT, VIRTUAL_WIDTH};

/// Default safe values for startup
const DEFAULT_WINDOW_WIDTH: u32 = 1280;
const DEFAULT_WINDOW_HEIGHT: u32 = 720;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_VSYNC: bool = true;
const DEFAULT_ASPECT_LOCK: bool = true;
const DEFAULT_TITLE: &str = "Potesara";
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    #[error("failed to write config file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value for [{section}] {key}: {reason}")]
    Value {
        section: &'static str,
        key: &'static str,
        reason: String,
    },
}

/// Render resolution, window settings and audio defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Virtual render width in pixels.
    pub render_width: u32,
    /// Virtual render height in pixels.
    pub render_height: u32,
    /// Window width in pixels.
    pub window_width: u32,
    /// Window height in pixels.
    pub window_height: u32,
    /// Target frames per second.
    pub target_fps: u32,
    /// Enable vertical sync.
    pub vsync: bool,
    /// Restore the render aspect ratio after the window is resized.
    pub aspect_lock: bool,
    pub title: String,
    /// Voices per sound registered without an explicit count.
    pub sound_channels: u32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            render_width: VIRTUAL_WIDTH,
            render_height: VIRTUAL_HEIGHT,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            vsync: DEFAULT_VSYNC,
            aspect_lock: DEFAULT_ASPECT_LOCK,
            title: DEFAULT_TITLE.to_string(),
            sound_channels: DEFAULT_MAX_CHANNELS as u32,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values. A missing file leaves
    /// everything at defaults; an unreadable file or a malformed value is an
    /// error.
    pub fn load_from_file(&mut self) -> Result<(), ConfigError> {
        if !self.config_path.exists() {
            info!(
                "No config file at {:?}, using defaults",
                self.config_path
            );
            return Ok(());
        }

        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|reason| ConfigError::Read {
                path: self.config_path.clone(),
                reason,
            })?;

        // [render] section
        if let Some(width) = get_uint(&config, "render", "width")? {
            self.render_width = width;
        }
        if let Some(height) = get_uint(&config, "render", "height")? {
            self.render_height = height;
        }

        // [window] section
        if let Some(width) = get_uint(&config, "window", "width")? {
            self.window_width = width;
        }
        if let Some(height) = get_uint(&config, "window", "height")? {
            self.window_height = height;
        }
        if let Some(fps) = get_uint(&config, "window", "target_fps")? {
            self.target_fps = fps;
        }
        if let Some(vsync) = get_bool(&config, "window", "vsync")? {
            self.vsync = vsync;
        }
        if let Some(lock) = get_bool(&config, "window", "aspect_lock")? {
            self.aspect_lock = lock;
        }
        if let Some(title) = config.get("window", "title") {
            self.title = title;
        }

        // [audio] section
        if let Some(channels) = get_uint(&config, "audio", "sound_channels")? {
            self.sound_channels = channels.max(1);
        }

        info!(
            "Loaded config: {}x{} render, {}x{} window, fps={}, vsync={}, aspect_lock={}",
            self.render_width,
            self.render_height,
            self.window_width,
            self.window_height,
            self.target_fps,
            self.vsync,
            self.aspect_lock
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), ConfigError> {
        let mut config = Ini::new();

        // [render] section
        config.set("render", "width", Some(self.render_width.to_string()));
        config.set("render", "height", Some(self.render_height.to_string()));

        // [window] section
        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "target_fps", Some(self.target_fps.to_string()));
        config.set("window", "vsync", Some(self.vsync.to_string()));
        config.set("window", "aspect_lock", Some(self.aspect_lock.to_string()));
        config.set("window", "title", Some(self.title.clone()));

        // [audio] section
        config.set(
            "audio",
            "sound_channels",
            Some(self.sound_channels.to_string()),
        );

        config
            .write(&self.config_path)
            .map_err(|source| ConfigError::Write {
                path: self.config_path.clone(),
                source,
            })?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Get the window size.
    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    /// Get the render size.
    pub fn render_size(&self) -> (u32, u32) {
        (self.render_width, self.render_height)
    }
}

fn get_uint(
    config: &Ini,
    section: &'static str,
    key: &'static str,
) -> Result<Option<u32>, ConfigError> {
    let value = config
        .getuint(section, key)
        .map_err(|reason| ConfigError::Value {
            section,
            key,
            reason,
        })?;
    value
        .map(u32::try_from)
        .transpose()
        .map_err(|e| ConfigError::Value {
            section,
            key,
            reason: e.to_string(),
        })
}

fn get_bool(
    config: &Ini,
    section: &'static str,
    key: &'static str,
) -> Result<Option<bool>, ConfigError> {
    config
        .getbool(section, key)
        .map_err(|reason| ConfigError::Value {
            section,
            key,
            reason,
        })
}
