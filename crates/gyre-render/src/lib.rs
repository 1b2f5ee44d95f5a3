//! Gyre render core.
//!
//! This crate owns the render thread, its control mailbox, and the scene
//! drawables, all in terms of the backend-neutral [`gfx::Gfx`] trait.
//! Backends and window plumbing live in sibling crates.

pub mod assets;
pub mod drawable;
pub mod gfx;
pub mod mailbox;
pub mod mesh;
pub mod renderer;
pub mod scene;
pub mod texture;

pub mod logging;

pub use renderer::{Phase, Renderer, RendererError};
pub use scene::{CameraRig, SceneConfig};
