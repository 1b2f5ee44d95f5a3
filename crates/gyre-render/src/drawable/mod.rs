//! Scene drawables.
//!
//! A drawable owns its geometry and any texture it samples, and knows how
//! to draw itself into the current frame. The set is closed: dispatch is a
//! plain `match`, and adding a drawable kind means adding a variant here.
//!
//! Lifecycle: built by [`Drawable::create`] during context bring-up, drawn
//! every frame in authored order, torn down by [`Drawable::destroy`]
//! before the context goes away.

mod cube;
mod plane;
mod text;

pub use cube::ColoredCube;
pub use plane::TexturedPlane;
pub use text::Text;

use anyhow::{Context as _, Result};

use crate::assets::AssetSource;
use crate::gfx::Gfx;

/// What to build one drawable from.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawableDesc {
    /// A fixed textured quad; `image` names the asset stretched across it.
    TexturedPlane { image: String },
    /// A row of hex glyphs; `sheet` names the glyph sheet asset.
    Text { sheet: String, value: String },
    /// The fixed rainbow-cornered cube; needs no assets.
    ColoredCube,
}

/// One scene element.
pub enum Drawable<G: Gfx> {
    TexturedPlane(TexturedPlane<G>),
    Text(Text<G>),
    ColoredCube(ColoredCube),
}

impl<G: Gfx> Drawable<G> {
    /// Builds a drawable, loading whatever assets it names.
    pub fn create(
        gfx: &mut G,
        context: &mut G::Context,
        assets: &dyn AssetSource,
        desc: &DrawableDesc,
    ) -> Result<Self> {
        match desc {
            DrawableDesc::TexturedPlane { image } => {
                let plane = TexturedPlane::create(gfx, context, assets, image)
                    .context("building textured plane")?;
                Ok(Self::TexturedPlane(plane))
            }
            DrawableDesc::Text { sheet, value } => {
                let text = Text::create(gfx, context, assets, sheet, value)
                    .context("building text row")?;
                Ok(Self::Text(text))
            }
            DrawableDesc::ColoredCube => Ok(Self::ColoredCube(ColoredCube::new())),
        }
    }

    /// Issues this drawable's draw calls for the current frame.
    pub fn draw(&mut self, gfx: &mut G, context: &mut G::Context) {
        match self {
            Self::TexturedPlane(plane) => plane.draw(gfx, context),
            Self::Text(text) => text.draw(gfx, context),
            Self::ColoredCube(cube) => cube.draw(gfx, context),
        }
    }

    /// Releases GPU resources. The drawable is gone afterwards.
    pub fn destroy(self, gfx: &mut G, context: &mut G::Context) {
        match self {
            Self::TexturedPlane(plane) => plane.destroy(gfx, context),
            Self::Text(text) => text.destroy(gfx, context),
            Self::ColoredCube(_) => {}
        }
    }
}
