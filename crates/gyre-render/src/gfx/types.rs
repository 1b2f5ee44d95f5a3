//! Value types crossing the backend boundary.

/// An RGBA color with components in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Minimum channel depths requested when negotiating a window surface.
///
/// The negotiation is deliberately coarse: the render loop always asks for
/// [`SurfaceRequest::RGB888`] and treats any failure to satisfy it as a
/// bring-up failure, not something to retry with other depths.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SurfaceRequest {
    pub red_bits: u8,
    pub green_bits: u8,
    pub blue_bits: u8,
}

impl SurfaceRequest {
    pub const RGB888: SurfaceRequest = SurfaceRequest {
        red_bits: 8,
        green_bits: 8,
        blue_bits: 8,
    };
}

/// Perspective view volume.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Frustum {
    /// The fixed scene frustum: unit vertical extent, horizontal extent
    /// matching the surface aspect ratio, depth range 1..10.
    pub fn from_aspect(aspect: f32) -> Self {
        Self {
            left: -aspect,
            right: aspect,
            bottom: -1.0,
            top: 1.0,
            near: 1.0,
            far: 10.0,
        }
    }
}

/// Per-frame scene transform: a fixed translate, then a tumble.
///
/// Backends apply it as `translate × rotate_y(yaw) × rotate_x(pitch)`, so
/// the rotations spin the scene about its own origin and the translate then
/// pushes it away from the viewer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewTransform {
    pub translate: [f32; 3],
    pub yaw_deg: f32,
    pub pitch_deg: f32,
}

/// Pixel formats accepted by texture upload.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// A decoded image, tightly packed rows, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub bytes: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps decoded bytes. `bytes` must hold exactly
    /// `width × height × bytes_per_pixel`.
    pub fn new(width: u32, height: u32, format: PixelFormat, bytes: Vec<u8>) -> Self {
        debug_assert_eq!(
            bytes.len(),
            width as usize * height as usize * format.bytes_per_pixel(),
        );
        Self {
            width,
            height,
            format,
            bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frustum_tracks_the_aspect_ratio() {
        let f = Frustum::from_aspect(1.5);
        assert_eq!(f.left, -1.5);
        assert_eq!(f.right, 1.5);
        assert_eq!((f.bottom, f.top), (-1.0, 1.0));
        assert_eq!((f.near, f.far), (1.0, 10.0));
    }

    #[test]
    fn pixel_sizes_match_their_formats() {
        assert_eq!(PixelFormat::Rgb8.bytes_per_pixel(), 3);
        assert_eq!(PixelFormat::Rgba8.bytes_per_pixel(), 4);
    }
}
