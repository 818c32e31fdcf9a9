//! Long-lived resources shared by scenes.
//!
//! This module groups the handles and registries a game creates once at
//! startup and passes by reference to the code that needs them. Each
//! submodule documents the semantics and intended usage of its resource(s).
//!
//! Overview
//! - `audio` – music and sound registry, plus the audio error type
//! - `gameconfig` – INI configuration for window, render and audio settings
//! - `music` – streamed music track
//! - `rendertarget` – offscreen surface at the virtual resolution
//! - `sound` – sound effect with a pool of playback voices
//! - `texture` – drawable image with persistent draw state
//! - `texturestore` – loaded textures keyed by string IDs
//! - `windowcontroller` – keeps the window at a fixed aspect ratio
pub mod audio;
pub mod gameconfig;
pub mod music;
pub mod rendertarget;
pub mod sound;
pub mod texture;
pub mod texturestore;
pub mod windowcontroller;
