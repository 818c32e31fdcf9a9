//! Render target for fixed-resolution rendering.
//!
//! Provides an offscreen surface at the virtual resolution. Scenes draw into
//! it, then it is stretched over the whole window, scaling X and Y
//! independently.

use raylib::prelude::{Color, Rectangle, Vector2};

use crate::backend::{BackendError, BlendMode, DrawCommand, GraphicsBackend, RenderFilter};

/// Offscreen surface at the game's virtual resolution.
pub struct RenderTarget<G: GraphicsBackend> {
    /// The underlying backend surface.
    pub surface: G::Surface,
    /// Virtual width in pixels.
    pub game_width: u32,
    /// Virtual height in pixels.
    pub game_height: u32,
    /// Current texture filtering mode.
    pub filter: RenderFilter,
}

impl<G: GraphicsBackend> RenderTarget<G> {
    /// Create a new render target at the given virtual resolution.
    pub fn new(
        gfx: &mut G,
        width: u32,
        height: u32,
        filter: RenderFilter,
    ) -> Result<Self, BackendError> {
        let mut surface = gfx.create_surface(width, height)?;
        gfx.set_surface_filter(&mut surface, filter);
        Ok(Self {
            surface,
            game_width: width,
            game_height: height,
            filter,
        })
    }

    /// Set the texture filtering mode.
    pub fn set_filter(&mut self, gfx: &mut G, filter: RenderFilter) {
        self.filter = filter;
        gfx.set_surface_filter(&mut self.surface, filter);
    }

    /// Aspect ratio of the virtual resolution.
    pub fn aspect_ratio(&self) -> f32 {
        self.game_width as f32 / self.game_height as f32
    }

    /// Source rectangle covering the whole surface.
    ///
    /// The height is negative to flip the Y axis, compensating for OpenGL's
    /// inverted texture coordinates.
    pub fn source_rect(&self) -> Rectangle {
        Rectangle {
            x: 0.0,
            y: 0.0,
            width: self.game_width as f32,
            height: -(self.game_height as f32),
        }
    }

    /// Command stretching the surface over a `screen_w` x `screen_h` window.
    pub fn blit_command(&self, screen_w: i32, screen_h: i32) -> DrawCommand {
        DrawCommand {
            source: self.source_rect(),
            dest: Rectangle {
                x: 0.0,
                y: 0.0,
                width: screen_w as f32,
                height: screen_h as f32,
            },
            origin: Vector2 { x: 0.0, y: 0.0 },
            rotation: 0.0,
            tint: Color::WHITE,
            blend: BlendMode::Alpha,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::HeadlessGraphics;

    #[test]
    fn test_new_applies_filter() {
        let mut gfx = HeadlessGraphics::default();
        let target = RenderTarget::new(&mut gfx, 320, 180, RenderFilter::Bilinear).unwrap();
        assert_eq!(target.surface.size(), (320, 180));
        assert_eq!(
            gfx.filter_of(target.surface.id()),
            Some(RenderFilter::Bilinear)
        );
        assert!((target.aspect_ratio() - 16.0 / 9.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_size_fails() {
        let mut gfx = HeadlessGraphics::default();
        assert!(RenderTarget::new(&mut gfx, 0, 180, RenderFilter::Nearest).is_err());
    }

    #[test]
    fn test_blit_flips_and_stretches() {
        let mut gfx = HeadlessGraphics::default();
        let target = RenderTarget::new(&mut gfx, 1920, 1080, RenderFilter::Bilinear).unwrap();
        let cmd = target.blit_command(800, 800);
        assert_eq!(cmd.source.width, 1920.0);
        assert_eq!(cmd.source.height, -1080.0);
        assert_eq!(cmd.dest.width, 800.0);
        assert_eq!(cmd.dest.height, 800.0);
        assert_eq!(cmd.tint.a, 255);
    }
}
