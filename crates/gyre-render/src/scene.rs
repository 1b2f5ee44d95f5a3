//! Scene configuration.

use crate::drawable::DrawableDesc;
use crate::gfx::Rgba;

/// Camera rig for the tumble.
///
/// `distance` is the fixed translate applied before the rotations (negative
/// z pushes the scene away from the viewer). `pitch_ratio` couples the
/// x-axis rotation to the driven angle: pitch = angle x ratio.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraRig {
    pub distance: f32,
    pub pitch_ratio: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            distance: -1.75,
            pitch_ratio: 0.4,
        }
    }
}

/// Everything the render thread needs to know about what to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub clear: Rgba,
    pub camera: CameraRig,
    /// Drawables in paint order.
    pub drawables: Vec<DrawableDesc>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            clear: Rgba::new(0.5, 0.01, 0.35, 0.0),
            camera: CameraRig::default(),
            drawables: Vec::new(),
        }
    }
}
