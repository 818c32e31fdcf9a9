//! Scene arena.
//!
//! Nodes are stored in a [`SlotMap`], so a [`SceneId`] of a removed scene
//! never aliases a newer one. Each node knows its parent and its ordered
//! children.

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::backend::GraphicsBackend;
use crate::scene::Scene;

new_key_type! {
    /// Handle to a scene stored in a [`SceneTree`].
    pub struct SceneId;
}

struct SceneNode<G: GraphicsBackend> {
    scene: Box<dyn Scene<G>>,
    parent: Option<SceneId>,
    children: SmallVec<[SceneId; 4]>,
}

pub struct SceneTree<G: GraphicsBackend> {
    nodes: SlotMap<SceneId, SceneNode<G>>,
}

impl<G: GraphicsBackend> Default for SceneTree<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GraphicsBackend> SceneTree<G> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    /// Store a scene with no parent.
    pub fn insert(&mut self, scene: Box<dyn Scene<G>>) -> SceneId {
        self.nodes.insert(SceneNode {
            scene,
            parent: None,
            children: SmallVec::new(),
        })
    }

    /// Store a scene as the last child of `parent`. `None` if `parent` is gone.
    pub fn insert_child(&mut self, parent: SceneId, scene: Box<dyn Scene<G>>) -> Option<SceneId> {
        if !self.nodes.contains_key(parent) {
            return None;
        }
        let id = self.insert(scene);
        self.link(parent, id);
        Some(id)
    }

    /// Move `child` (and its subtree) under `parent`.
    ///
    /// Fails when either id is unknown or when `child` is `parent` or one of
    /// its ancestors.
    pub fn attach(&mut self, parent: SceneId, child: SceneId) -> bool {
        if !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            return false;
        }
        if self.is_ancestor_or_self(child, parent) {
            return false;
        }
        self.detach(child);
        self.link(parent, child);
        true
    }

    /// Unlink `child` from its parent, keeping it in the arena.
    pub fn detach(&mut self, child: SceneId) {
        let Some(parent) = self.nodes.get_mut(child).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|c| *c != child);
        }
    }

    /// Detach `id` and drop it with every descendant.
    ///
    /// Returns the removed ids, children before their parent.
    pub fn remove_subtree(&mut self, id: SceneId) -> Vec<SceneId> {
        let order = self.post_order(id);
        self.detach(id);
        for removed in &order {
            self.nodes.remove(*removed);
        }
        order
    }

    /// `id` and all of its descendants, children before their parent.
    pub fn post_order(&self, id: SceneId) -> Vec<SceneId> {
        let mut out = Vec::new();
        if self.nodes.contains_key(id) {
            self.collect_post_order(id, &mut out);
        }
        out
    }

    fn collect_post_order(&self, id: SceneId, out: &mut Vec<SceneId>) {
        if let Some(node) = self.nodes.get(id) {
            for child in &node.children {
                self.collect_post_order(*child, out);
            }
            out.push(id);
        }
    }

    fn link(&mut self, parent: SceneId, child: SceneId) {
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
    }

    fn is_ancestor_or_self(&self, candidate: SceneId, mut id: SceneId) -> bool {
        loop {
            if id == candidate {
                return true;
            }
            match self.parent(id) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    pub fn contains(&self, id: SceneId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn parent(&self, id: SceneId) -> Option<SceneId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Children of `id` in insertion order; empty for unknown ids.
    pub fn children(&self, id: SceneId) -> &[SceneId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn get(&self, id: SceneId) -> Option<&dyn Scene<G>> {
        self.nodes.get(id).map(|n| n.scene.as_ref())
    }

    pub fn get_mut(&mut self, id: SceneId) -> Option<&mut (dyn Scene<G> + 'static)> {
        self.nodes.get_mut(id).map(|n| n.scene.as_mut())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
