//! Triangle primitive for ray tracing.
//!
//! Solves against the supporting plane, then classifies the hit point with
//! barycentric coordinates computed by Cramer's rule.

use crate::hittable::{Hit, Hittable, MaterialId};
use crate::plane::SupportPlane;
use crate::scene::{SceneError, SceneResult};
use lathe_math::{Aabb, DVec2, DVec3, Ray};

/// A triangle primitive.
#[derive(Debug, Clone)]
pub struct Triangle {
    /// First vertex, the origin of the barycentric frame
    v0: DVec3,
    /// Edge v1 - v0
    edge1: DVec3,
    /// Edge v2 - v0
    edge2: DVec3,
    /// Supporting plane (geometric normal)
    plane: SupportPlane,
    /// Normal reported on hits
    normal: DVec3,
    /// Precomputed dot products of the edge basis
    d11: f64,
    d12: f64,
    d22: f64,
    inv_denom: f64,
    material: MaterialId,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    ///
    /// The normal is `(v1 - v0) x (v2 - v0)`, normalized.
    pub fn new(v0: DVec3, v1: DVec3, v2: DVec3, material: MaterialId) -> SceneResult<Self> {
        let normal = (v1 - v0).cross(v2 - v0);
        Self::with_normal(v0, v1, v2, normal, material)
    }

    /// Create a triangle that reports `normal` instead of its geometric normal.
    pub fn with_normal(v0: DVec3, v1: DVec3, v2: DVec3, normal: DVec3, material: MaterialId) -> SceneResult<Self> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let plane = SupportPlane::through(v0, edge1.cross(edge2))
            .ok_or_else(|| SceneError::invalid("triangle", "vertices are collinear"))?;
        let normal = normal
            .try_normalize()
            .ok_or_else(|| SceneError::invalid("triangle", "normal has zero length"))?;

        let d11 = edge1.dot(edge1);
        let d12 = edge1.dot(edge2);
        let d22 = edge2.dot(edge2);
        let inv_denom = 1.0 / (d11 * d22 - d12 * d12);

        Ok(Self {
            v0,
            edge1,
            edge2,
            plane,
            normal,
            d11,
            d12,
            d22,
            inv_denom,
            material,
            bbox: Aabb::from_corners(&[v0, v1, v2]),
        })
    }

    pub fn vertices(&self) -> [DVec3; 3] {
        [self.v0, self.v0 + self.edge1, self.v0 + self.edge2]
    }

    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Barycentric weights `(w1, w2)` of `p` along the two edges.
    fn barycentric(&self, p: DVec3) -> (f64, f64) {
        let rel = p - self.v0;
        let r1 = rel.dot(self.edge1);
        let r2 = rel.dot(self.edge2);
        let w1 = (self.d22 * r1 - self.d12 * r2) * self.inv_denom;
        let w2 = (self.d11 * r2 - self.d12 * r1) * self.inv_denom;
        (w1, w2)
    }
}

#[inline]
fn unit(x: f64) -> bool {
    (0.0..=1.0).contains(&x)
}

impl Hittable for Triangle {
    fn intersect(&self, ray: &Ray, hit: &mut Hit, t_min: f64) -> bool {
        let Some(t) = self.plane.solve(ray) else {
            return false;
        };
        if !hit.accepts(t, t_min) {
            return false;
        }

        let (w1, w2) = self.barycentric(ray.at(t));
        if !(unit(w1) && unit(w2) && unit(w1 + w2)) {
            return false;
        }

        hit.set(t, self.material, self.normal, DVec2::new(w1, w2));
        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
