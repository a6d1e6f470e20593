//! Affine transform wrapper around another object.

use crate::hittable::{Hit, Hittable, Object3D};
use crate::scene::{SceneError, SceneResult};
use lathe_math::{Aabb, DMat3, DMat4, MatrixExt, Ray};

/// Matrices with a determinant this small are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// An object placed in the scene by an affine matrix.
///
/// Rays are carried into object space with the inverse matrix. The direction
/// is not renormalized, so a hit's `t` means the same in both spaces.
pub struct Transform {
    matrix: DMat4,
    inverse: DMat4,
    normal_matrix: DMat3,
    object: Box<Object3D>,
    bbox: Aabb,
}

impl Transform {
    /// Wrap `object` with the object-to-world `matrix`.
    pub fn new(matrix: DMat4, object: impl Into<Object3D>) -> SceneResult<Self> {
        let determinant = matrix.determinant();
        if !determinant.is_finite() || determinant.abs() < SINGULAR_EPSILON {
            return Err(SceneError::SingularTransform { determinant });
        }

        let object = Box::new(object.into());
        let bbox = matrix.transform_aabb(&object.bounding_box());

        Ok(Self {
            matrix,
            inverse: matrix.inverse(),
            normal_matrix: matrix.normal_matrix(),
            object,
            bbox,
        })
    }

    pub fn matrix(&self) -> DMat4 {
        self.matrix
    }

    pub fn object(&self) -> &Object3D {
        &self.object
    }
}

impl Hittable for Transform {
    fn intersect(&self, ray: &Ray, hit: &mut Hit, t_min: f64) -> bool {
        let local = Ray::new(
            self.inverse.transform_point3(ray.origin()),
            self.inverse.transform_vector3(ray.direction()),
        );

        if !self.object.intersect(&local, hit, t_min) {
            return false;
        }

        hit.normal = (self.normal_matrix * hit.normal).normalize_or_zero();
        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
