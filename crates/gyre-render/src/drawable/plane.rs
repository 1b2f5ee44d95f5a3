//! A unit quad with an image stretched across it.

use anyhow::Result;

use crate::assets::AssetSource;
use crate::gfx::Gfx;
use crate::mesh::{Triangle, Vertex};
use crate::texture::load_texture;

/// Quad corners, centered on the origin. The texture's first row maps to
/// the top edge.
const VERTICES: [Vertex; 4] = [
    Vertex { pos: [-0.5, -0.5, 0.0], uv: [0.0, 1.0] },
    Vertex { pos: [-0.5, 0.5, 0.0], uv: [0.0, 0.0] },
    Vertex { pos: [0.5, 0.5, 0.0], uv: [1.0, 0.0] },
    Vertex { pos: [0.5, -0.5, 0.0], uv: [1.0, 1.0] },
];

const TRIANGLES: [Triangle; 2] = [Triangle::new(0, 2, 1), Triangle::new(2, 0, 3)];

/// Fixed textured quad; geometry never changes after construction.
pub struct TexturedPlane<G: Gfx> {
    texture: G::Texture,
}

impl<G: Gfx> TexturedPlane<G> {
    pub fn create(
        gfx: &mut G,
        context: &mut G::Context,
        assets: &dyn AssetSource,
        image: &str,
    ) -> Result<Self> {
        let texture = load_texture(gfx, context, assets, image)?;
        Ok(Self { texture })
    }

    pub fn draw(&mut self, gfx: &mut G, context: &mut G::Context) {
        gfx.draw_textured(context, &self.texture, &VERTICES, &TRIANGLES);
    }

    pub fn destroy(self, gfx: &mut G, context: &mut G::Context) {
        gfx.destroy_texture(context, self.texture);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_is_a_unit_square() {
        for v in &VERTICES {
            assert_eq!(v.pos[0].abs(), 0.5);
            assert_eq!(v.pos[1].abs(), 0.5);
            assert_eq!(v.pos[2], 0.0);
        }
    }

    #[test]
    fn winding_is_counter_clockwise() {
        // signed area of both triangles in the xy plane
        for t in &TRIANGLES {
            let [a, b, c] = t.indices.map(|i| VERTICES[i as usize].pos);
            let area = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
            assert!(area > 0.0, "triangle {:?} winds clockwise", t.indices);
        }
    }
}
