//! Infinite plane primitive.
//!
//! The plane equation is also the first step of the bounded planar shapes
//! (triangle, rectangle, disk), which solve against it and then classify the
//! hit point.

use crate::hittable::{Hit, Hittable, MaterialId};
use crate::scene::{SceneError, SceneResult};
use lathe_math::{Aabb, DVec2, DVec3, Ray};

/// Rays whose direction is this close to perpendicular to the normal never hit.
const PARALLEL_EPSILON: f64 = 1e-8;

/// The plane `normal . x = d` with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SupportPlane {
    pub normal: DVec3,
    pub d: f64,
}

impl SupportPlane {
    /// Plane through `point` with the given normal, or `None` for a zero normal.
    pub fn through(point: DVec3, normal: DVec3) -> Option<Self> {
        let normal = normal.try_normalize()?;
        Some(Self {
            normal,
            d: normal.dot(point),
        })
    }

    /// Ray parameter of the crossing, or `None` for a (near) parallel ray.
    pub fn solve(&self, ray: &Ray) -> Option<f64> {
        let denom = self.normal.dot(ray.direction());
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        Some((self.d - self.normal.dot(ray.origin())) / denom)
    }
}

/// An infinite plane.
#[derive(Debug, Clone)]
pub struct Plane {
    plane: SupportPlane,
    material: MaterialId,
}

impl Plane {
    /// Create a plane through `point` with the given normal.
    pub fn new(normal: DVec3, point: DVec3, material: MaterialId) -> SceneResult<Self> {
        let plane = SupportPlane::through(point, normal)
            .ok_or_else(|| SceneError::invalid("plane", "normal has zero length"))?;
        Ok(Self { plane, material })
    }

    /// Unit normal of the plane.
    pub fn normal(&self) -> DVec3 {
        self.plane.normal
    }

    /// Offset `d` in `normal . x = d`.
    pub fn offset(&self) -> f64 {
        self.plane.d
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }
}

impl Hittable for Plane {
    fn intersect(&self, ray: &Ray, hit: &mut Hit, t_min: f64) -> bool {
        match self.plane.solve(ray) {
            Some(t) if hit.accepts(t, t_min) => {
                hit.set(t, self.material, self.plane.normal, DVec2::ZERO);
                true
            }
            _ => false,
        }
    }

    fn bounding_box(&self) -> Aabb {
        Aabb::UNIVERSE
    }
}
