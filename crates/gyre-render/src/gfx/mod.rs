//! The graphics vocabulary the render loop speaks.
//!
//! The render thread never talks to a platform API directly; everything it
//! needs is expressed through the [`Gfx`] trait. A backend supplies the
//! concrete display / surface / context / texture handles and implements
//! the operations against whatever the platform offers.
//!
//! Call protocol, driven by the render loop:
//!
//! 1. `open_display` → `create_surface` → `create_context` →
//!    `surface_size` → `set_viewport`, in that order. Any failure makes the
//!    loop destroy whatever stages already succeeded, in reverse.
//! 2. Per frame: `begin_frame`, any number of `draw_*` calls, `present`.
//!    A failed `present` is reported but the next frame proceeds.
//! 3. Teardown: `destroy_texture` for every live texture, then
//!    `destroy_context`, `destroy_surface`, `close_display`.
//!
//! Handles are plain values owned by the render thread; nothing in this
//! contract is reference-counted or shared.

mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use types::{Frustum, PixelBuffer, PixelFormat, Rgba, SurfaceRequest, ViewTransform};

use std::fmt;

use crate::mesh::{ColorVertex, Triangle, Vertex};

/// Error from a graphics backend operation.
///
/// The message carries whatever the backend knows; callers add their own
/// context when composing.
#[derive(Debug, Clone, PartialEq)]
pub struct GfxError(pub String);

impl GfxError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl fmt::Display for GfxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for GfxError {}

/// A graphics backend.
///
/// Implementations are free to make handles as heavy or as light as they
/// like; the render loop only ever moves them around and hands them back.
/// Draw calls are infallible: a backend that can fail mid-frame surfaces
/// that from `present`.
pub trait Gfx {
    /// Window handle delivered by the host. Crosses from the caller's
    /// thread to the render thread exactly once.
    type Window: Send;
    type Display;
    type Surface;
    type Context;
    type Texture;

    /// Connects to the platform's display.
    fn open_display(&mut self) -> Result<Self::Display, GfxError>;

    /// Creates a window surface satisfying `request`.
    fn create_surface(
        &mut self,
        display: &mut Self::Display,
        window: &Self::Window,
        request: SurfaceRequest,
    ) -> Result<Self::Surface, GfxError>;

    /// Creates a rendering context on `surface` and makes it current.
    fn create_context(
        &mut self,
        display: &mut Self::Display,
        surface: &mut Self::Surface,
    ) -> Result<Self::Context, GfxError>;

    /// Pixel size of the surface, as the platform reports it.
    fn surface_size(
        &mut self,
        display: &mut Self::Display,
        surface: &mut Self::Surface,
    ) -> Result<(u32, u32), GfxError>;

    /// Sets the pixel viewport and the projection frustum.
    fn set_viewport(
        &mut self,
        context: &mut Self::Context,
        size: (u32, u32),
        frustum: Frustum,
    ) -> Result<(), GfxError>;

    /// Uploads pixels as a texture: clamp-to-edge, nearest filtering, no
    /// mipmaps.
    fn create_texture(
        &mut self,
        context: &mut Self::Context,
        pixels: &PixelBuffer,
    ) -> Result<Self::Texture, GfxError>;

    fn destroy_texture(&mut self, context: &mut Self::Context, texture: Self::Texture);

    /// Opens a frame: clear color and the scene transform for every draw
    /// until `present`.
    fn begin_frame(&mut self, context: &mut Self::Context, clear: Rgba, view: &ViewTransform);

    /// Draws indexed, textured triangles with the current frame transform.
    fn draw_textured(
        &mut self,
        context: &mut Self::Context,
        texture: &Self::Texture,
        vertices: &[Vertex],
        triangles: &[Triangle],
    );

    /// Draws indexed, per-vertex-colored triangles.
    fn draw_colored(
        &mut self,
        context: &mut Self::Context,
        vertices: &[ColorVertex],
        triangles: &[Triangle],
    );

    /// Finishes the frame and hands it to the platform.
    fn present(
        &mut self,
        context: &mut Self::Context,
        surface: &mut Self::Surface,
    ) -> Result<(), GfxError>;

    fn destroy_context(&mut self, display: &mut Self::Display, context: Self::Context);

    fn destroy_surface(&mut self, display: &mut Self::Display, surface: Self::Surface);

    fn close_display(&mut self, display: Self::Display);
}
