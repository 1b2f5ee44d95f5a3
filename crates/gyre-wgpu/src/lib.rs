//! wgpu backend for the gyre render core.
//!
//! Implements [`gyre_render::gfx::Gfx`] over wgpu, with winit windows as
//! the window handles. The render thread drives everything; this crate
//! never touches the event loop.

pub mod backend;
pub mod transform;

pub use backend::{WgpuGfx, WgpuOptions};
