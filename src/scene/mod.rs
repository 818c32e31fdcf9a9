//! Scenes and their lifecycle.
//!
//! A scene is anything implementing [`Scene`]: it gets enable/disable
//! notifications from the [`SceneManager`](manager::SceneManager), is ticked
//! while it is the current scene, and draws itself into the virtual screen.
//!
//! Scenes are owned by an arena ([`tree::SceneTree`]) and referred to by
//! [`SceneId`]. Parent/child links are ids too, so removing a subtree
//! also unlinks it from its parent.
//!
//! Submodules overview:
//! - [`tree`] – generational arena of scene nodes with parent/child links
//! - [`manager`] – registry, current scene and virtual-screen rendering

pub mod manager;
pub mod tree;

pub use manager::SceneManager;
pub use tree::SceneId;

use crate::backend::GraphicsBackend;

/// Lifecycle hooks of a scene. Every hook defaults to doing nothing.
pub trait Scene<G: GraphicsBackend> {
    /// Called when the scene becomes the current one.
    fn enable(&mut self) {}

    /// Called when the scene stops being current or is removed.
    fn disable(&mut self) {}

    /// Advance the scene by `dt` seconds.
    fn update(&mut self, _dt: f32) {}

    /// Draw into the virtual screen, which is already cleared to black.
    fn draw(&mut self, _gfx: &mut G) {}
}
