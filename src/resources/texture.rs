//! Drawable texture with persistent draw state.
//!
//! A [`Texture`] owns one backend image handle plus the parameters it is
//! normally drawn with (opacity, rotation, scale, reference point, blend
//! mode). Each draw call can override any of them through [`DrawOptions`];
//! fields left as `None` fall back to the texture's own state.
//!
//! The handle is released exactly once: either by [`Texture::dispose`] or
//! when the texture is dropped.

use std::path::{Path, PathBuf};

use raylib::prelude::{Color, Rectangle, Vector2};

use crate::backend::{
    BackendError, BlendMode, DrawCommand, GraphicsBackend, RenderFilter, opacity_tint,
};

/// Anchor of a rectangle used as the origin for placement, rotation and
/// scaling.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum ReferencePoint {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl ReferencePoint {
    /// Offset of this anchor inside a `width` x `height` rectangle.
    pub fn origin(self, width: f32, height: f32) -> Vector2 {
        let (x, y) = match self {
            ReferencePoint::TopLeft => (0.0, 0.0),
            ReferencePoint::TopCenter => (width / 2.0, 0.0),
            ReferencePoint::TopRight => (width, 0.0),
            ReferencePoint::CenterLeft => (0.0, height / 2.0),
            ReferencePoint::Center => (width / 2.0, height / 2.0),
            ReferencePoint::CenterRight => (width, height / 2.0),
            ReferencePoint::BottomLeft => (0.0, height),
            ReferencePoint::BottomCenter => (width / 2.0, height),
            ReferencePoint::BottomRight => (width, height),
        };
        Vector2 { x, y }
    }
}

/// Per-call overrides for [`Texture::draw`] and
/// [`Animation::draw`](crate::components::animation::Animation::draw).
#[derive(Clone, Copy, Debug, Default)]
pub struct DrawOptions {
    pub reference_point: Option<ReferencePoint>,
    /// Region of the image to draw. Defaults to the whole image.
    pub source: Option<Rectangle>,
    /// Defaults to white carrying the owner's opacity.
    pub tint: Option<Color>,
    pub rotation: Option<f32>,
    pub scale: Option<Vector2>,
    /// Explicit origin in source pixels; replaces the reference point.
    pub origin: Option<Vector2>,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl DrawOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference_point(mut self, reference_point: ReferencePoint) -> Self {
        self.reference_point = Some(reference_point);
        self
    }

    pub fn with_source(mut self, source: Rectangle) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = Some(tint);
        self
    }

    /// Shorthand for a white tint with the given alpha (0..1).
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.tint = Some(opacity_tint(alpha));
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = Some(degrees);
        self
    }

    pub fn with_scale(mut self, x: f32, y: f32) -> Self {
        self.scale = Some(Vector2 { x, y });
        self
    }

    pub fn with_origin(mut self, x: f32, y: f32) -> Self {
        self.origin = Some(Vector2 { x, y });
        self
    }

    pub fn flipped(mut self, flip_x: bool, flip_y: bool) -> Self {
        self.flip_x = flip_x;
        self.flip_y = flip_y;
        self
    }
}

/// One loaded image and the state it is drawn with.
pub struct Texture<G: GraphicsBackend> {
    handle: Option<G::Texture>,
    file_name: PathBuf,
    width: f32,
    height: f32,
    /// Alpha used when no tint is given, 0..1.
    pub opacity: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    pub scale: Vector2,
    pub reference_point: ReferencePoint,
    pub blend_mode: BlendMode,
}

impl<G: GraphicsBackend> Texture<G> {
    /// Load the image at `path` through the backend.
    pub fn load(gfx: &mut G, path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let path = path.as_ref();
        let handle = gfx.load_texture(path)?;
        let (width, height) = gfx.texture_size(&handle);
        Ok(Self {
            handle: Some(handle),
            file_name: path.to_path_buf(),
            width,
            height,
            opacity: 1.0,
            rotation: 0.0,
            scale: Vector2 { x: 1.0, y: 1.0 },
            reference_point: ReferencePoint::TopLeft,
            blend_mode: BlendMode::Alpha,
        })
    }

    /// False once the handle has been released.
    pub fn is_enabled(&self) -> bool {
        self.handle.is_some()
    }

    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Backend handle, if still loaded.
    pub fn handle(&self) -> Option<&G::Texture> {
        self.handle.as_ref()
    }

    pub fn set_filter(&mut self, gfx: &mut G, filter: RenderFilter) {
        if let Some(handle) = self.handle.as_mut() {
            gfx.set_texture_filter(handle, filter);
        }
    }

    /// Resolve `opts` against this texture's state into a backend command.
    ///
    /// Returns `None` when the texture has been disposed.
    pub fn draw_command(&self, x: f32, y: f32, opts: &DrawOptions) -> Option<DrawCommand> {
        self.handle.as_ref()?;

        let mut source = opts.source.unwrap_or(Rectangle {
            x: 0.0,
            y: 0.0,
            width: self.width,
            height: self.height,
        });
        let scale = opts.scale.unwrap_or(self.scale);
        let rotation = opts.rotation.unwrap_or(self.rotation);
        let reference = opts.reference_point.unwrap_or(self.reference_point);

        let width = source.width.abs();
        let height = source.height.abs();
        if opts.flip_x {
            source.width = -source.width;
        }
        if opts.flip_y {
            source.height = -source.height;
        }

        let base = opts.origin.unwrap_or_else(|| reference.origin(width, height));
        let origin = Vector2 {
            x: base.x * scale.x,
            y: base.y * scale.y,
        };

        Some(DrawCommand {
            source,
            dest: Rectangle {
                x,
                y,
                width: width * scale.x,
                height: height * scale.y,
            },
            origin,
            rotation,
            tint: opts.tint.unwrap_or_else(|| opacity_tint(self.opacity)),
            blend: self.blend_mode,
        })
    }

    /// Draw at `(x, y)`, which the reference point is pinned to.
    pub fn draw(&self, gfx: &mut G, x: f32, y: f32, opts: &DrawOptions) {
        if let (Some(handle), Some(cmd)) = (self.handle.as_ref(), self.draw_command(x, y, opts)) {
            gfx.draw_texture(handle, &cmd);
        }
    }

    /// Release the backend handle. Calling it again does nothing.
    pub fn dispose(&mut self) {
        self.handle = None;
    }
}
