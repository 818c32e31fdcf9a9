//! Potesara library.
//!
//! A small presentation layer for 2D games: scenes, textures, frame
//! animations, audio and window aspect locking, on top of pluggable
//! graphics, audio and window backends.

pub mod backend;
pub mod components;
pub mod resources;
pub mod scene;
