//! Bounded planar shapes: parallelogram rectangles and disks.

use crate::hittable::{Hit, Hittable, MaterialId};
use crate::plane::SupportPlane;
use crate::scene::{SceneError, SceneResult};
use lathe_math::{Aabb, DVec2, DVec3, Ray};

/// A parallelogram spanned by two edges from a corner.
///
/// Points `corner + a * u + b * v` with `a, b` in [0, 1].
#[derive(Debug, Clone)]
pub struct Rectangle {
    corner: DVec3,
    u: DVec3,
    v: DVec3,
    plane: SupportPlane,
    /// Dual basis: `x . u_dual` recovers the `a` coordinate of `corner + x`
    u_dual: DVec3,
    v_dual: DVec3,
    material: MaterialId,
    bbox: Aabb,
}

impl Rectangle {
    /// Create a rectangle from a corner and two edge vectors.
    ///
    /// The normal is `u x v`, normalized.
    pub fn new(corner: DVec3, u: DVec3, v: DVec3, material: MaterialId) -> SceneResult<Self> {
        let n = u.cross(v);
        let plane = SupportPlane::through(corner, n)
            .ok_or_else(|| SceneError::invalid("rectangle", "edges are parallel or zero"))?;

        // Solve x = a u + b v for vectors x in the plane
        let nn = n.length_squared();
        let u_dual = v.cross(n) / nn;
        let v_dual = n.cross(u) / nn;

        let bbox = Aabb::from_corners(&[corner, corner + u, corner + v, corner + u + v]);

        Ok(Self {
            corner,
            u,
            v,
            plane,
            u_dual,
            v_dual,
            material,
            bbox,
        })
    }

    pub fn normal(&self) -> DVec3 {
        self.plane.normal
    }

    pub fn edges(&self) -> (DVec3, DVec3) {
        (self.u, self.v)
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }
}

impl Hittable for Rectangle {
    fn intersect(&self, ray: &Ray, hit: &mut Hit, t_min: f64) -> bool {
        let Some(t) = self.plane.solve(ray) else {
            return false;
        };
        if !hit.accepts(t, t_min) {
            return false;
        }

        let local = ray.at(t) - self.corner;
        let a = local.dot(self.u_dual);
        let b = local.dot(self.v_dual);
        if !((0.0..=1.0).contains(&a) && (0.0..=1.0).contains(&b)) {
            return false;
        }

        hit.set(t, self.material, self.plane.normal, DVec2::new(a, b));
        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// A disk of given radius around a center point.
#[derive(Debug, Clone)]
pub struct Disk {
    center: DVec3,
    radius: f64,
    plane: SupportPlane,
    material: MaterialId,
    bbox: Aabb,
}

impl Disk {
    /// Create a disk facing along `normal`.
    pub fn new(center: DVec3, radius: f64, normal: DVec3, material: MaterialId) -> SceneResult<Self> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(SceneError::invalid("disk", format!("radius must be positive, got {}", radius)));
        }
        let plane = SupportPlane::through(center, normal)
            .ok_or_else(|| SceneError::invalid("disk", "normal has zero length"))?;

        // Extent of the disk along each axis is r * sqrt(1 - n_i^2)
        let n = plane.normal;
        let extent = DVec3::new(
            (1.0 - n.x * n.x).max(0.0).sqrt(),
            (1.0 - n.y * n.y).max(0.0).sqrt(),
            (1.0 - n.z * n.z).max(0.0).sqrt(),
        ) * radius;
        let bbox = Aabb::from_points(center - extent, center + extent);

        Ok(Self {
            center,
            radius,
            plane,
            material,
            bbox,
        })
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn normal(&self) -> DVec3 {
        self.plane.normal
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }
}

impl Hittable for Disk {
    fn intersect(&self, ray: &Ray, hit: &mut Hit, t_min: f64) -> bool {
        let Some(t) = self.plane.solve(ray) else {
            return false;
        };
        if !hit.accepts(t, t_min) {
            return false;
        }
        if (ray.at(t) - self.center).length_squared() > self.radius * self.radius {
            return false;
        }

        hit.set(t, self.material, self.plane.normal, DVec2::ZERO);
        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
