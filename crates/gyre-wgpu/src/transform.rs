//! Column-major 4x4 matrices for the per-frame scene transform.
//!
//! Only what the backend needs: a perspective projection with clip depth in
//! wgpu's `[0, 1]` range, translation, and axis rotations, composed by
//! multiplication.

use gyre_render::gfx::{Frustum, ViewTransform};

/// Column-major 4x4 matrix. `cols[c][r]` is row `r` of column `c`, which is
/// the layout a WGSL `mat4x4<f32>` uniform expects.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    cols: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn translation(v: [f32; 3]) -> Mat4 {
        let mut m = Mat4::IDENTITY;
        m.cols[3] = [v[0], v[1], v[2], 1.0];
        m
    }

    /// Rotation about the x axis, in degrees.
    pub fn rotation_x(degrees: f32) -> Mat4 {
        let (s, c) = degrees.to_radians().sin_cos();
        let mut m = Mat4::IDENTITY;
        m.cols[1] = [0.0, c, s, 0.0];
        m.cols[2] = [0.0, -s, c, 0.0];
        m
    }

    /// Rotation about the y axis, in degrees.
    pub fn rotation_y(degrees: f32) -> Mat4 {
        let (s, c) = degrees.to_radians().sin_cos();
        let mut m = Mat4::IDENTITY;
        m.cols[0] = [c, 0.0, -s, 0.0];
        m.cols[2] = [s, 0.0, c, 0.0];
        m
    }

    /// Perspective projection for `f`. The near plane lands on clip depth 0
    /// and the far plane on 1, wgpu's convention.
    pub fn perspective(f: &Frustum) -> Mat4 {
        let width = f.right - f.left;
        let height = f.top - f.bottom;
        let depth = f.far - f.near;
        Mat4 {
            cols: [
                [2.0 * f.near / width, 0.0, 0.0, 0.0],
                [0.0, 2.0 * f.near / height, 0.0, 0.0],
                [
                    (f.right + f.left) / width,
                    (f.top + f.bottom) / height,
                    -f.far / depth,
                    -1.0,
                ],
                [0.0, 0.0, -f.far * f.near / depth, 0.0],
            ],
        }
    }

    pub fn to_cols(&self) -> [[f32; 4]; 4] {
        self.cols
    }

    /// Applies the matrix to a homogeneous vector.
    pub fn transform(&self, v: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (c, col) in self.cols.iter().enumerate() {
            for (r, out_r) in out.iter_mut().enumerate() {
                *out_r += col[r] * v[c];
            }
        }
        out
    }
}

impl std::ops::Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut cols = [[0.0; 4]; 4];
        for (c, col) in cols.iter_mut().enumerate() {
            *col = self.transform(rhs.cols[c]);
        }
        Mat4 { cols }
    }
}

/// The whole per-frame transform: projection, then the scene translate and
/// tumble from `view`. Matches fixed-function matrix stacking, where each
/// operation post-multiplies the current matrix.
pub fn model_view_projection(frustum: &Frustum, view: &ViewTransform) -> Mat4 {
    Mat4::perspective(frustum)
        * Mat4::translation(view.translate)
        * Mat4::rotation_y(view.yaw_deg)
        * Mat4::rotation_x(view.pitch_deg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: [f32; 4], b: [f32; 4]) {
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-5, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn identity_leaves_vectors_alone() {
        let v = [1.0, 2.0, 3.0, 1.0];
        assert_close(Mat4::IDENTITY.transform(v), v);
    }

    #[test]
    fn translation_moves_points_but_not_directions() {
        let m = Mat4::translation([1.0, -2.0, 3.0]);
        assert_close(m.transform([0.0, 0.0, 0.0, 1.0]), [1.0, -2.0, 3.0, 1.0]);
        assert_close(m.transform([5.0, 0.0, 0.0, 0.0]), [5.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn rotation_y_carries_z_toward_x() {
        let m = Mat4::rotation_y(90.0);
        assert_close(m.transform([0.0, 0.0, 1.0, 1.0]), [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn rotation_x_carries_y_toward_z() {
        let m = Mat4::rotation_x(90.0);
        assert_close(m.transform([0.0, 1.0, 0.0, 1.0]), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn perspective_maps_the_depth_range_onto_zero_one() {
        let f = Frustum::from_aspect(1.0);
        let m = Mat4::perspective(&f);

        let near = m.transform([0.0, 0.0, -f.near, 1.0]);
        assert!((near[2] / near[3]).abs() < 1e-6);

        let far = m.transform([0.0, 0.0, -f.far, 1.0]);
        assert!((far[2] / far[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn perspective_pins_the_near_plane_corners() {
        let f = Frustum::from_aspect(2.0);
        let m = Mat4::perspective(&f);
        let corner = m.transform([f.left, f.bottom, -f.near, 1.0]);
        assert!((corner[0] / corner[3] + 1.0).abs() < 1e-5);
        assert!((corner[1] / corner[3] + 1.0).abs() < 1e-5);
    }

    #[test]
    fn mvp_places_the_scene_origin_at_screen_center() {
        let view = ViewTransform {
            translate: [0.0, 0.0, -2.0],
            yaw_deg: 0.0,
            pitch_deg: 0.0,
        };
        let m = model_view_projection(&Frustum::from_aspect(1.0), &view);
        let p = m.transform([0.0, 0.0, 0.0, 1.0]);
        assert!((p[0] / p[3]).abs() < 1e-6);
        assert!((p[1] / p[3]).abs() < 1e-6);
        let depth = p[2] / p[3];
        assert!(depth > 0.0 && depth < 1.0);
    }

    #[test]
    fn yaw_turns_the_scene_about_its_own_origin() {
        // A point on the +z side of the scene swings toward +x under yaw,
        // and the translate still pushes it away from the viewer.
        let view = ViewTransform {
            translate: [0.0, 0.0, -5.0],
            yaw_deg: 90.0,
            pitch_deg: 0.0,
        };
        let m = Mat4::translation(view.translate)
            * Mat4::rotation_y(view.yaw_deg)
            * Mat4::rotation_x(view.pitch_deg);
        assert_close(m.transform([0.0, 0.0, 1.0, 1.0]), [1.0, 0.0, -5.0, 1.0]);
    }
}
