//! Components owned and driven by scenes.
//!
//! Submodules overview:
//! - [`animation`] – frame sequence loaded from a folder, advanced on a fixed frame interval

pub mod animation;
