//! Math utilities and types
//!
//! Provides the fundamental 2D math types used by the engine. Everything is
//! `f32` and built on nalgebra; matrices are 4x4 so they can be handed to
//! shaders unchanged.

use std::cell::Cell;

pub use nalgebra::{Matrix4, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type (also used for RGBA colors)
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Math helper functions
pub mod utils {
    use super::{Mat4, Vec2, Vec3};

    /// Orthographic projection centred on the origin, sized in pixels.
    ///
    /// Equivalent to `ortho(-w/2, w/2, -h/2, h/2, -1, 1)`.
    pub fn centered_ortho(width: f32, height: f32) -> Mat4 {
        let half_w = width * 0.5;
        let half_h = height * 0.5;
        Mat4::new_orthographic(-half_w, half_w, -half_h, half_h, -1.0, 1.0)
    }

    /// Non-uniform scale in the XY plane
    pub fn scale_2d(scale: Vec2) -> Mat4 {
        Mat4::new_nonuniform_scaling(&Vec3::new(scale.x, scale.y, 1.0))
    }

    /// Translation in the XY plane
    pub fn translation_2d(offset: Vec2) -> Mat4 {
        Mat4::new_translation(&Vec3::new(offset.x, offset.y, 0.0))
    }

    /// Rotation about +Z, in radians
    pub fn rotation_z(radians: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), radians)
    }

    /// Component-wise absolute value
    pub fn abs_2d(v: Vec2) -> Vec2 {
        Vec2::new(v.x.abs(), v.y.abs())
    }

    /// Clamp each component of `v` into `[min, max]`
    pub fn clamp_2d(v: Vec2, min: Vec2, max: Vec2) -> Vec2 {
        Vec2::new(v.x.clamp(min.x, max.x), v.y.clamp(min.y, max.y))
    }

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees.to_radians()
    }
}

/// 2D transform with a lazily rebuilt model matrix
///
/// The matrix is only recomputed after one of the setters touched
/// position, rotation or scale. Rotation is in radians around +Z.
#[derive(Debug, Clone)]
pub struct Transform2D {
    position: Vec2,
    rotation: f32,
    scale: Vec2,
    matrix: Cell<Mat4>,
    dirty: Cell<bool>,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            matrix: Cell::new(Mat4::identity()),
            dirty: Cell::new(true),
        }
    }
}

impl Transform2D {
    /// Create an identity transform
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform at `position`
    pub fn from_position(position: Vec2) -> Self {
        let mut transform = Self::default();
        transform.set_position(position);
        transform
    }

    /// Set the position
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.dirty.set(true);
    }

    /// Offset the position
    pub fn add_position(&mut self, delta: Vec2) {
        self.position += delta;
        self.dirty.set(true);
    }

    /// Set the rotation (radians)
    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
        self.dirty.set(true);
    }

    /// Offset the rotation (radians)
    pub fn add_rotation(&mut self, delta: f32) {
        self.rotation += delta;
        self.dirty.set(true);
    }

    /// Set the scale
    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
        self.dirty.set(true);
    }

    /// Offset the scale
    pub fn add_scale(&mut self, delta: Vec2) {
        self.scale += delta;
        self.dirty.set(true);
    }

    /// Current position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Current rotation (radians)
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Current scale
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Model matrix in TRS order, rebuilt only when dirty
    pub fn matrix(&self) -> Mat4 {
        if self.dirty.get() {
            let matrix = utils::translation_2d(self.position)
                * utils::rotation_z(self.rotation)
                * utils::scale_2d(self.scale);
            self.matrix.set(matrix);
            self.dirty.set(false);
        }
        self.matrix.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_transform_matrix() {
        let transform = Transform2D::new();
        assert_relative_eq!(transform.matrix(), Mat4::identity(), epsilon = 1e-6);
    }

    #[test]
    fn test_matrix_rebuilt_after_change() {
        let mut transform = Transform2D::new();
        let _ = transform.matrix();
        transform.set_position(Vec2::new(10.0, -4.0));
        transform.set_scale(Vec2::new(2.0, 3.0));

        let m = transform.matrix();
        assert_relative_eq!(m[(0, 3)], 10.0);
        assert_relative_eq!(m[(1, 3)], -4.0);
        assert_relative_eq!(m[(0, 0)], 2.0);
        assert_relative_eq!(m[(1, 1)], 3.0);
    }

    #[test]
    fn test_rotation_applies_before_translation() {
        let mut transform = Transform2D::from_position(Vec2::new(5.0, 0.0));
        transform.set_rotation(std::f32::consts::FRAC_PI_2);
        let p = transform.matrix().transform_point(&nalgebra::Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 5.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_centered_ortho_maps_half_extents_to_ndc() {
        let proj = utils::centered_ortho(800.0, 600.0);
        let p = proj.transform_point(&nalgebra::Point3::new(400.0, -300.0, 0.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, -1.0, epsilon = 1e-6);
    }
}
