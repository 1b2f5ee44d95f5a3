//! Plain-data mesh types shared between drawables and backends.
//!
//! Everything here is `Pod` so a backend can hand slices straight to the
//! GPU without copying or conversion.

use bytemuck::{Pod, Zeroable};

/// A textured mesh vertex: position and texture coordinates.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub uv: [f32; 2],
}

/// A colored mesh vertex: position and straight-alpha RGBA color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub pos: [f32; 3],
    pub color: [f32; 4],
}

/// Three indices into a vertex slice.
///
/// Front faces wind counter-clockwise; backends cull the other side.
#[repr(C)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Pod, Zeroable)]
pub struct Triangle {
    pub indices: [u16; 3],
}

impl Triangle {
    pub const fn new(a: u16, b: u16, c: u16) -> Self {
        Self { indices: [a, b, c] }
    }
}
