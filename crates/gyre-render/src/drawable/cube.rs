//! A cube with a differently colored corner at every vertex.

use crate::gfx::Gfx;
use crate::mesh::{ColorVertex, Triangle};

/// Cube corners at +-1 on every axis.
const VERTICES: [ColorVertex; 8] = [
    ColorVertex { pos: [-1.0, -1.0, -1.0], color: [0.0, 0.0, 0.0, 1.0] },
    ColorVertex { pos: [1.0, -1.0, -1.0], color: [1.0, 0.0, 0.0, 1.0] },
    ColorVertex { pos: [1.0, 1.0, -1.0], color: [1.0, 1.0, 0.0, 1.0] },
    ColorVertex { pos: [-1.0, 1.0, -1.0], color: [0.0, 1.0, 0.0, 1.0] },
    ColorVertex { pos: [-1.0, -1.0, 1.0], color: [0.0, 0.0, 1.0, 1.0] },
    ColorVertex { pos: [1.0, -1.0, 1.0], color: [1.0, 0.0, 1.0, 1.0] },
    ColorVertex { pos: [1.0, 1.0, 1.0], color: [1.0, 1.0, 1.0, 1.0] },
    ColorVertex { pos: [-1.0, 1.0, 1.0], color: [0.0, 1.0, 1.0, 1.0] },
];

/// Six faces, two triangles each, wound counter-clockwise seen from
/// outside.
const TRIANGLES: [Triangle; 12] = [
    Triangle::new(0, 5, 4),
    Triangle::new(0, 1, 5),
    Triangle::new(1, 6, 5),
    Triangle::new(1, 2, 6),
    Triangle::new(2, 7, 6),
    Triangle::new(2, 3, 7),
    Triangle::new(3, 4, 7),
    Triangle::new(3, 0, 4),
    Triangle::new(4, 6, 7),
    Triangle::new(4, 5, 6),
    Triangle::new(3, 1, 0),
    Triangle::new(3, 2, 1),
];

/// Fixed colored cube; no assets, no per-frame state.
pub struct ColoredCube;

impl ColoredCube {
    pub fn new() -> Self {
        Self
    }

    pub fn draw<G: Gfx>(&mut self, gfx: &mut G, context: &mut G::Context) {
        gfx.draw_colored(context, &VERTICES, &TRIANGLES);
    }
}

impl Default for ColoredCube {
    fn default() -> Self {
        Self::new()
    }
}
