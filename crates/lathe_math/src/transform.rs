// Transform utilities for DMat4
//
// Extends glam::DMat4 with the pieces ray tracing needs on top of
// transform_point3(), transform_vector3() and inverse().

use crate::Aabb;
use glam::{DMat3, DMat4};

/// Extension trait for DMat4 to provide additional transform utilities
pub trait MatrixExt {
    /// The matrix that carries surface normals through this transform:
    /// the transpose of the inverse of the linear (upper 3x3) part.
    fn normal_matrix(&self) -> DMat3;

    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl MatrixExt for DMat4 {
    fn normal_matrix(&self) -> DMat3 {
        DMat3::from_mat4(*self).inverse().transpose()
    }

    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        // Infinite corners would turn into NaN through the multiply.
        if !aabb.is_finite() {
            return Aabb::UNIVERSE;
        }
        let corners = aabb.corners().map(|corner| self.transform_point3(corner));
        Aabb::from_corners(&corners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use std::f64::consts::PI;

    #[test]
    fn test_normal_matrix_rotation_is_rotation() {
        let mat = DMat4::from_rotation_z(PI / 2.0);
        let n = mat.normal_matrix() * DVec3::X;

        // Rotations carry normals like any other direction
        assert!((n - DVec3::Y).length() < 1e-12);
    }

    #[test]
    fn test_normal_matrix_non_uniform_scale() {
        // Plane x + y = 0 has normal (1, 1, 0); stretching x by 2 turns the
        // plane into x/2 + y = 0, whose normal is (1, 2, 0) up to scale.
        let mat = DMat4::from_scale(DVec3::new(2.0, 1.0, 1.0));
        let n = (mat.normal_matrix() * DVec3::new(1.0, 1.0, 0.0)).normalize();
        let expected = DVec3::new(1.0, 2.0, 0.0).normalize();

        assert!((n - expected).length() < 1e-12);
    }

    #[test]
    fn test_transform_aabb_translation() {
        let mat = DMat4::from_translation(DVec3::splat(5.0));
        let aabb = Aabb::from_points(DVec3::ZERO, DVec3::ONE);
        let transformed = mat.transform_aabb(&aabb);

        assert!((transformed.x.min - 5.0).abs() < 1e-12);
        assert!((transformed.z.max - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_aabb_rotation_grows_box() {
        let mat = DMat4::from_rotation_y(PI / 4.0);
        let aabb = Aabb::from_points(DVec3::splat(-1.0), DVec3::splat(1.0));
        let transformed = mat.transform_aabb(&aabb);

        assert!((transformed.x.max - 2.0_f64.sqrt()).abs() < 1e-9);
        assert!((transformed.y.max - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_transform_aabb_unbounded() {
        let mat = DMat4::from_translation(DVec3::X);
        assert_eq!(mat.transform_aabb(&Aabb::UNIVERSE), Aabb::UNIVERSE);
    }

    #[test]
    fn test_mat4_inverse_round_trip() {
        let mat = DMat4::from_rotation_y(PI / 4.0) * DMat4::from_translation(DVec3::new(10.0, 20.0, 30.0));
        let inv = mat.inverse();

        let point = DVec3::new(5.0, 3.0, 2.0);
        let back = inv.transform_point3(mat.transform_point3(point));

        assert!((back - point).length() < 1e-9);
    }
}
