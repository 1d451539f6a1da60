use glam::Mat4;

/// Fixed object scale applied every frame.
pub const SCALE: f32 = 0.3;
/// Fixed camera-relative depth of the object.
pub const TRANSLATION_Z: f32 = -5.0;
/// Vertical field of view of the projection.
pub const FOV_Y: f32 = std::f32::consts::FRAC_PI_4;
pub const Z_NEAR: f32 = 1.0;
pub const Z_FAR: f32 = 100.0;

/// Maps GL-convention clip-space depth [-1, 1] onto wgpu's [0, 1].
/// Premultiplied onto the projection before upload; the builders below keep
/// the GL-form entries.
pub const DEPTH_REMAP: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 0.5, 0.0, //
    0.0, 0.0, 0.5, 1.0,
]);

/// Model-view matrix: Y-axis rotation by `angle` with a uniform `scale`,
/// translated along Z only. Column-major.
pub fn model_view(angle: f32, scale: f32, translation_z: f32) -> Mat4 {
    let (sin, cos) = angle.sin_cos();
    Mat4::from_cols_array(&[
        scale * cos, 0.0, scale * sin, 0.0, //
        0.0, scale, 0.0, 0.0, //
        -scale * sin, 0.0, scale * cos, 0.0, //
        0.0, 0.0, translation_z, 1.0,
    ])
}

/// Symmetric-frustum perspective projection, column-major, GL depth
/// convention (`f = 1 / tan(fov_y / 2)`).
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fov_y / 2.0).tan();
    Mat4::from_cols_array(&[
        f / aspect, 0.0, 0.0, 0.0, //
        0.0, f, 0.0, 0.0, //
        0.0, 0.0, (far + near) / (near - far), -1.0, //
        0.0, 0.0, 2.0 * far * near / (near - far), 0.0,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_perspective_known_values() {
        // fov π/2 → f = 1; near 1, far 2 pin down the depth entries
        let m = perspective(FRAC_PI_2, 1.0, 1.0, 2.0).to_cols_array();
        assert!((m[0] - 1.0).abs() < 1e-6, "f/aspect should be 1, got {}", m[0]);
        assert!((m[5] - 1.0).abs() < 1e-6, "f should be 1, got {}", m[5]);
        assert!((m[10] - -3.0).abs() < 1e-6, "m[10] should be -3, got {}", m[10]);
        assert!((m[14] - -4.0).abs() < 1e-6, "m[14] should be -4, got {}", m[14]);
        assert!((m[11] - -1.0).abs() < 1e-6);
        assert!(m[15].abs() < 1e-6);
    }

    #[test]
    fn test_perspective_aspect_scales_x() {
        let m = perspective(FRAC_PI_2, 2.0, 1.0, 100.0).to_cols_array();
        assert!((m[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_model_view_identity_angle() {
        let m = model_view(0.0, 1.0, 0.0).to_cols_array();
        let identity = Mat4::IDENTITY.to_cols_array();
        for i in 0..16 {
            assert!((m[i] - identity[i]).abs() < 1e-6, "entry {} differs", i);
        }
    }

    #[test]
    fn test_model_view_layout() {
        let m = model_view(FRAC_PI_2, 2.0, -5.0).to_cols_array();
        // First column (2·cos, 0, 2·sin), third (-2·sin, 0, 2·cos)
        assert!(m[0].abs() < 1e-6);
        assert!((m[2] - 2.0).abs() < 1e-6);
        assert!((m[8] - -2.0).abs() < 1e-6);
        assert!(m[10].abs() < 1e-6);
        assert!((m[5] - 2.0).abs() < 1e-6, "uniform scale on Y");
        assert!((m[14] - -5.0).abs() < 1e-6, "translation only in Z");
        assert!((m[15] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_model_view_full_turn_wraps() {
        let a = model_view(0.3, SCALE, TRANSLATION_Z).to_cols_array();
        let b = model_view(0.3 + 2.0 * PI, SCALE, TRANSLATION_Z).to_cols_array();
        for i in 0..16 {
            assert!((a[i] - b[i]).abs() < 1e-5);
        }
    }

    #[test]
    fn test_depth_remap_range() {
        // GL near plane z = -1 → 0, far plane z = 1 → 1
        let near = DEPTH_REMAP * glam::Vec4::new(0.0, 0.0, -1.0, 1.0);
        let far = DEPTH_REMAP * glam::Vec4::new(0.0, 0.0, 1.0, 1.0);
        assert!(near.z.abs() < 1e-6);
        assert!((far.z - 1.0).abs() < 1e-6);
    }
}
