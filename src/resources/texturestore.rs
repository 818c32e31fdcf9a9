//! Name-keyed texture registry.
//!
//! Registering under an existing key replaces the old texture only once the
//! new one loaded; a failed load leaves the registry untouched.

use std::path::Path;

use log::{error, warn};
use rustc_hash::FxHashMap;

use crate::backend::{GraphicsBackend, RenderFilter};
use crate::resources::texture::Texture;

/// Owns every registered [`Texture`], keyed by name.
pub struct TextureManager<G: GraphicsBackend> {
    map: FxHashMap<String, Texture<G>>,
}

impl<G: GraphicsBackend> Default for TextureManager<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: GraphicsBackend> TextureManager<G> {
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
        }
    }

    /// Load `path` and store it under `key` with bilinear filtering.
    ///
    /// Returns false (and logs) when the image cannot be loaded.
    pub fn register(&mut self, gfx: &mut G, key: &str, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match Texture::load(gfx, path) {
            Ok(mut texture) => {
                texture.set_filter(gfx, RenderFilter::Bilinear);
                if let Some(mut old) = self.map.insert(key.to_string(), texture) {
                    old.dispose();
                }
                true
            }
            Err(e) => {
                error!("Failed to load texture '{}': {}", key, e);
                false
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Texture<G>> {
        let texture = self.map.get(key);
        if texture.is_none() {
            warn!("Texture not found: {}", key);
        }
        texture
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Texture<G>> {
        let texture = self.map.get_mut(key);
        if texture.is_none() {
            warn!("Texture not found: {}", key);
        }
        texture
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Dispose and forget the texture under `key`, if any.
    pub fn unregister(&mut self, key: &str) {
        if let Some(mut texture) = self.map.remove(key) {
            texture.dispose();
        }
    }

    pub fn unregister_all(&mut self) {
        for (_, mut texture) in self.map.drain() {
            texture.dispose();
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
