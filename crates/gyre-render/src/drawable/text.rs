//! A row of hex glyphs cut out of a fixed sheet texture.
//!
//! The sheet is a 128 px square holding the sixteen glyphs `0`-`F` in
//! 21 x 40 px cells, six per row. The mesh is regenerated lazily from the
//! current value and memoized on string equality, so redrawing the same
//! value touches nothing.

use anyhow::Result;

use crate::assets::AssetSource;
use crate::gfx::Gfx;
use crate::mesh::{Triangle, Vertex};
use crate::texture::load_texture;

// ── sheet metrics ─────────────────────────────────────────────────────────

/// Texture coordinates per sheet pixel.
const SHEET_SCALE: f32 = 1.0 / 128.0;
/// One glyph cell in texture coordinates.
const CELL_W: f32 = 21.0 * SHEET_SCALE;
const CELL_H: f32 = 40.0 * SHEET_SCALE;
/// One glyph cell in world units.
const GLYPH_W: f32 = 0.3;
const GLYPH_H: f32 = 0.4;
/// Where the finished row sits in the scene.
const ROW_OFFSET: [f32; 3] = [-0.3, -0.4, 0.2];
/// Glyph cells per sheet row.
const CELLS_PER_ROW: u32 = 6;

/// Maps a hex digit to its (row, col) cell in the glyph sheet.
///
/// Cells are row-major: `0..5` on the first row, `6..B` on the second,
/// `C..F` starting the third. Upper and lower case address the same cell;
/// anything else has none.
fn glyph_cell(c: char) -> Option<(u32, u32)> {
    let value = c.to_digit(16)?;
    Some((value / CELLS_PER_ROW, value % CELLS_PER_ROW))
}

/// Appends one quad per mappable character of `value`.
///
/// Non-hex characters emit nothing and consume no horizontal space; the
/// glyphs that do emit sit side by side. The whole row is then parked at
/// [`ROW_OFFSET`].
fn build_row(value: &str, vertices: &mut Vec<Vertex>, triangles: &mut Vec<Triangle>) {
    vertices.clear();
    triangles.clear();

    for c in value.chars() {
        let Some((row, col)) = glyph_cell(c) else {
            continue;
        };

        let base = vertices.len() as u16;
        let x0 = f32::from(base / 4) * GLYPH_W;
        let x1 = x0 + GLYPH_W;
        let u0 = col as f32 * CELL_W;
        let u1 = u0 + CELL_W;
        let v0 = row as f32 * CELL_H;
        let v1 = v0 + CELL_H;

        vertices.push(Vertex { pos: [x0, 0.0, 0.0], uv: [u0, v1] });
        vertices.push(Vertex { pos: [x0, GLYPH_H, 0.0], uv: [u0, v0] });
        vertices.push(Vertex { pos: [x1, GLYPH_H, 0.0], uv: [u1, v0] });
        vertices.push(Vertex { pos: [x1, 0.0, 0.0], uv: [u1, v1] });

        triangles.push(Triangle::new(base, base + 2, base + 1));
        triangles.push(Triangle::new(base + 2, base, base + 3));
    }

    for v in vertices.iter_mut() {
        v.pos[0] += ROW_OFFSET[0];
        v.pos[1] += ROW_OFFSET[1];
        v.pos[2] += ROW_OFFSET[2];
    }
}

/// Text drawable: a memoized glyph-row mesh plus the sheet texture.
pub struct Text<G: Gfx> {
    texture: G::Texture,
    value: String,
    /// Value the buffers were last generated from; `None` until first build.
    built: Option<String>,
    vertices: Vec<Vertex>,
    triangles: Vec<Triangle>,
}

impl<G: Gfx> Text<G> {
    pub fn create(
        gfx: &mut G,
        context: &mut G::Context,
        assets: &dyn AssetSource,
        sheet: &str,
        value: &str,
    ) -> Result<Self> {
        let texture = load_texture(gfx, context, assets, sheet)?;
        Ok(Self {
            texture,
            value: value.to_owned(),
            built: None,
            vertices: Vec::new(),
            triangles: Vec::new(),
        })
    }

    /// Replaces the displayed value; the mesh rebuilds on the next draw.
    pub fn set_value(&mut self, value: &str) {
        if self.value != value {
            self.value.clear();
            self.value.push_str(value);
        }
    }

    /// Rebuilds the mesh when the value changed since the last build.
    fn regenerate(&mut self) {
        if self.built.as_deref() == Some(self.value.as_str()) {
            return;
        }
        build_row(&self.value, &mut self.vertices, &mut self.triangles);
        self.built = Some(self.value.clone());
    }

    pub fn draw(&mut self, gfx: &mut G, context: &mut G::Context) {
        self.regenerate();
        gfx.draw_textured(context, &self.texture, &self.vertices, &self.triangles);
    }

    pub fn destroy(self, gfx: &mut G, context: &mut G::Context) {
        gfx.destroy_texture(context, self.texture);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssets;
    use crate::gfx::fake::{FakeContext, FakeGfx};
    use crate::texture::make_bmp;

    #[test]
    fn every_hex_digit_round_trips_through_its_cell() {
        for (i, c) in "0123456789abcdef".chars().enumerate() {
            let (row, col) = glyph_cell(c).unwrap();
            assert_eq!(row * 6 + col, i as u32, "digit {c}");
        }
        for (lower, upper) in "abcdef".chars().zip("ABCDEF".chars()) {
            assert_eq!(glyph_cell(lower), glyph_cell(upper));
        }
    }

    #[test]
    fn non_hex_characters_have_no_cell() {
        for c in ['g', 'G', ' ', '-', 'z', '!'] {
            assert_eq!(glyph_cell(c), None, "char {c:?}");
        }
    }

    #[test]
    fn each_glyph_emits_one_quad() {
        let mut vertices = Vec::new();
        let mut triangles = Vec::new();
        build_row("47Fc", &mut vertices, &mut triangles);
        assert_eq!(vertices.len(), 16);
        assert_eq!(triangles.len(), 8);
    }

    #[test]
    fn skipped_characters_consume_no_space() {
        let mut vertices = Vec::new();
        let mut triangles = Vec::new();
        build_row("4 zz 7", &mut vertices, &mut triangles);
        assert_eq!(vertices.len(), 8, "two glyphs expected");

        // the second glyph starts exactly where the first one ends
        let first_left = vertices[0].pos[0];
        let second_left = vertices[4].pos[0];
        assert!((second_left - (first_left + GLYPH_W)).abs() < 1e-6);
    }

    #[test]
    fn all_skipped_value_emits_nothing() {
        let mut vertices = Vec::new();
        let mut triangles = Vec::new();
        build_row("ghij klm", &mut vertices, &mut triangles);
        assert!(vertices.is_empty());
        assert!(triangles.is_empty());
    }

    #[test]
    fn glyph_quads_sample_their_sheet_cell() {
        let mut vertices = Vec::new();
        let mut triangles = Vec::new();
        build_row("7", &mut vertices, &mut triangles);

        // '7' is cell (1, 1): u spans 21..42 px, v spans 40..80 px
        let u0 = 21.0 / 128.0;
        let u1 = 42.0 / 128.0;
        let v0 = 40.0 / 128.0;
        let v1 = 80.0 / 128.0;
        assert_eq!(vertices[0].uv, [u0, v1]);
        assert_eq!(vertices[1].uv, [u0, v0]);
        assert_eq!(vertices[2].uv, [u1, v0]);
        assert_eq!(vertices[3].uv, [u1, v1]);
    }

    #[test]
    fn finished_row_sits_at_its_scene_offset() {
        let mut vertices = Vec::new();
        let mut triangles = Vec::new();
        build_row("0", &mut vertices, &mut triangles);
        assert_eq!(vertices[0].pos, [-0.3, -0.4, 0.2]);
        assert_eq!(vertices[2].pos, [-0.3 + GLYPH_W, -0.4 + GLYPH_H, 0.2]);
    }

    fn text_fixture() -> (FakeGfx, FakeContext, Text<FakeGfx>) {
        let mut assets = MemoryAssets::new();
        assets.insert("sheet.bmp", make_bmp(1, 1, &[0, 0, 0]));
        let (mut gfx, _rec) = FakeGfx::new();
        let mut context = FakeContext;
        let text = Text::create(&mut gfx, &mut context, &assets, "sheet.bmp", "47Fc").unwrap();
        (gfx, context, text)
    }

    #[test]
    fn redrawing_the_same_value_reuses_the_buffers() {
        let (mut gfx, mut context, mut text) = text_fixture();

        text.draw(&mut gfx, &mut context);
        let ptr = text.vertices.as_ptr();
        let len = text.vertices.len();
        let cap = text.vertices.capacity();

        text.draw(&mut gfx, &mut context);
        assert_eq!(text.vertices.as_ptr(), ptr);
        assert_eq!(text.vertices.len(), len);
        assert_eq!(text.vertices.capacity(), cap);
    }

    #[test]
    fn changing_the_value_rebuilds_the_mesh() {
        let (mut gfx, mut context, mut text) = text_fixture();

        text.draw(&mut gfx, &mut context);
        assert_eq!(text.vertices.len(), 16);

        text.set_value("AB");
        text.draw(&mut gfx, &mut context);
        assert_eq!(text.vertices.len(), 8);
        assert_eq!(text.built.as_deref(), Some("AB"));
    }
}
