//! Scene manager.
//!
//! Owns the scene arena, a registry of known top-level scenes and at most
//! one current scene. Only the current scene is ticked and drawn. Drawing
//! goes through a fixed-size virtual screen that is stretched over the live
//! window.

use log::{debug, warn};
use raylib::prelude::Color;
use rustc_hash::FxHashSet;

use crate::backend::{BackendError, GraphicsBackend, RenderFilter};
use crate::resources::rendertarget::RenderTarget;
use crate::scene::Scene;
use crate::scene::tree::{SceneId, SceneTree};

/// Virtual screen width in pixels.
pub const VIRTUAL_WIDTH: u32 = 1920;
/// Virtual screen height in pixels.
pub const VIRTUAL_HEIGHT: u32 = 1080;

pub struct SceneManager<G: GraphicsBackend> {
    tree: SceneTree<G>,
    scenes: Vec<SceneId>,
    current: Option<SceneId>,
    target: RenderTarget<G>,
}

impl<G: GraphicsBackend> SceneManager<G> {
    /// Create a manager rendering into a 1920x1080 virtual screen.
    pub fn new(gfx: &mut G) -> Result<Self, BackendError> {
        Self::with_resolution(gfx, VIRTUAL_WIDTH, VIRTUAL_HEIGHT)
    }

    pub fn with_resolution(gfx: &mut G, width: u32, height: u32) -> Result<Self, BackendError> {
        let target = RenderTarget::new(gfx, width, height, RenderFilter::Bilinear)?;
        Ok(Self {
            tree: SceneTree::new(),
            scenes: Vec::new(),
            current: None,
            target,
        })
    }

    // Arena

    /// Hand a scene over to the manager. It is neither registered nor enabled.
    pub fn spawn(&mut self, scene: impl Scene<G> + 'static) -> SceneId {
        self.tree.insert(Box::new(scene))
    }

    /// Spawn `scene` as the last child of `parent`.
    pub fn spawn_child(
        &mut self,
        parent: SceneId,
        scene: impl Scene<G> + 'static,
    ) -> Option<SceneId> {
        self.tree.insert_child(parent, Box::new(scene))
    }

    /// Move `child` under `parent`. False if either is unknown or if it would
    /// create a cycle.
    pub fn attach_child(&mut self, parent: SceneId, child: SceneId) -> bool {
        self.tree.attach(parent, child)
    }

    pub fn detach(&mut self, child: SceneId) {
        self.tree.detach(child);
    }

    /// Disable and drop `id` with all its descendants, children first.
    ///
    /// Dropped scenes leave the registry, and the current pointer is cleared
    /// if it was among them.
    pub fn despawn(&mut self, id: SceneId) {
        let removed = self.tree.post_order(id);
        for scene in &removed {
            self.disable(*scene);
        }
        self.tree.remove_subtree(id);
        self.scenes.retain(|s| !removed.contains(s));
        if self.current.is_some_and(|c| removed.contains(&c)) {
            self.current = None;
        }
    }

    pub fn parent(&self, id: SceneId) -> Option<SceneId> {
        self.tree.parent(id)
    }

    pub fn children(&self, id: SceneId) -> &[SceneId] {
        self.tree.children(id)
    }

    pub fn scene(&self, id: SceneId) -> Option<&dyn Scene<G>> {
        self.tree.get(id)
    }

    pub fn scene_mut(&mut self, id: SceneId) -> Option<&mut (dyn Scene<G> + 'static)> {
        self.tree.get_mut(id)
    }

    pub fn contains(&self, id: SceneId) -> bool {
        self.tree.contains(id)
    }

    // Lifecycle

    /// Make `id` the current scene.
    ///
    /// The previous current scene is disabled unless it is `id` itself. A
    /// scene that was never registered with [`add_scene`](Self::add_scene)
    /// is disabled once more right before being enabled.
    pub fn change_scene(&mut self, id: SceneId) {
        if !self.tree.contains(id) {
            warn!("change_scene: unknown scene {:?}", id);
            return;
        }
        if let Some(previous) = self.current {
            if previous != id {
                self.disable(previous);
            }
        }
        self.current = Some(id);
        if !self.scenes.contains(&id) {
            self.disable(id);
        }
        self.enable(id);
        debug!("Current scene is now {:?}", id);
    }

    /// Register `id`. Does not enable it.
    pub fn add_scene(&mut self, id: SceneId) {
        if !self.tree.contains(id) {
            warn!("add_scene: unknown scene {:?}", id);
            return;
        }
        if !self.scenes.contains(&id) {
            self.scenes.push(id);
        }
    }

    /// Unregister and disable `id`. Clears the current scene if it was `id`.
    pub fn remove_scene(&mut self, id: SceneId) {
        let Some(index) = self.scenes.iter().position(|s| *s == id) else {
            return;
        };
        if self.current == Some(id) {
            self.current = None;
        }
        self.disable(id);
        self.scenes.remove(index);
    }

    /// Disable the current scene, then every registered scene and its
    /// descendants (children first), each exactly once. The registered
    /// subtrees are then dropped and the registry is emptied.
    pub fn delete_all_scenes(&mut self) {
        let mut disabled = FxHashSet::default();
        if let Some(current) = self.current.take() {
            self.disable(current);
            disabled.insert(current);
        }

        let roots = std::mem::take(&mut self.scenes);
        for root in &roots {
            for id in self.tree.post_order(*root) {
                if disabled.insert(id) {
                    self.disable(id);
                }
            }
        }
        for root in roots {
            if self.tree.contains(root) {
                self.tree.remove_subtree(root);
            }
        }
        debug!("Deleted all scenes ({} disabled)", disabled.len());
    }

    // Frame

    /// Tick the current scene.
    pub fn update(&mut self, dt: f32) {
        if let Some(scene) = self.current.and_then(|id| self.tree.get_mut(id)) {
            scene.update(dt);
        }
    }

    /// Render the current scene into the virtual screen and stretch it over
    /// the window. Does nothing without a current scene.
    pub fn draw(&mut self, gfx: &mut G) {
        let Some(current) = self.current else {
            return;
        };
        gfx.begin_surface(&mut self.target.surface);
        gfx.clear(Color::BLACK);
        if let Some(scene) = self.tree.get_mut(current) {
            scene.draw(gfx);
        }
        gfx.end_surface();

        let (width, height) = gfx.screen_size();
        let cmd = self.target.blit_command(width, height);
        gfx.draw_surface(&self.target.surface, &cmd);
    }

    /// Registered scenes in registration order.
    pub fn scenes(&self) -> &[SceneId] {
        &self.scenes
    }

    pub fn current_scene_id(&self) -> Option<SceneId> {
        self.current
    }

    pub fn current_scene(&self) -> Option<&dyn Scene<G>> {
        self.current.and_then(|id| self.tree.get(id))
    }

    pub fn current_scene_mut(&mut self) -> Option<&mut (dyn Scene<G> + 'static)> {
        self.current.and_then(|id| self.tree.get_mut(id))
    }

    pub fn render_target(&self) -> &RenderTarget<G> {
        &self.target
    }

    /// Number of scenes alive in the arena.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    fn enable(&mut self, id: SceneId) {
        if let Some(scene) = self.tree.get_mut(id) {
            scene.enable();
        }
    }

    fn disable(&mut self, id: SceneId) {
        if let Some(scene) = self.tree.get_mut(id) {
            scene.disable();
        }
    }
}
