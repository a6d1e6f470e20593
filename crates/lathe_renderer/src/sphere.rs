//! Sphere primitive for ray tracing.

use crate::hittable::{Hit, Hittable, MaterialId};
use crate::scene::{SceneError, SceneResult};
use lathe_math::{Aabb, DVec2, DVec3, Ray};
use std::f64::consts::PI;

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: DVec3,
    radius: f64,
    material: MaterialId,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: DVec3, radius: f64, material: MaterialId) -> SceneResult<Self> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(SceneError::invalid("sphere", format!("radius must be positive, got {}", radius)));
        }
        let rvec = DVec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Ok(Self {
            center,
            radius,
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

    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: DVec3) -> DVec2 {
        // theta: angle down from +Y
        // phi: angle around Y axis from +X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        DVec2::new(phi / (2.0 * PI), theta / PI)
    }
}

impl Hittable for Sphere {
    fn intersect(&self, ray: &Ray, hit: &mut Hit, t_min: f64) -> bool {
        let a = ray.direction().length_squared();
        if a == 0.0 {
            return false;
        }

        // Foot of the perpendicular from the center onto the ray line
        let oc = self.center - ray.origin();
        let foot = ray.direction().dot(oc) / a;
        let dist_sq = (oc - ray.direction() * foot).length_squared();
        let radius_sq = self.radius * self.radius;
        if dist_sq > radius_sq {
            return false;
        }

        let half_chord = ((radius_sq - dist_sq) / a).sqrt();

        // Nearest root past t_min
        let mut root = foot - half_chord;
        if root <= t_min {
            root = foot + half_chord;
        }
        if !hit.accepts(root, t_min) {
            return false;
        }

        let outward_normal = (ray.at(root) - self.center) / self.radius;
        hit.set(root, self.material, outward_normal, Self::get_sphere_uv(outward_normal));

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_sphere() -> Sphere {
        Sphere::new(DVec3::new(0.0, 0.0, -1.0), 0.5, MaterialId(0)).unwrap()
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = unit_sphere();
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));
        let mut hit = Hit::new();

        assert!(sphere.intersect(&ray, &mut hit, 1e-4));
        assert!((hit.t - 0.5).abs() < 1e-12);
        assert!((hit.normal - DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_sphere_hit_unnormalized_direction() {
        let sphere = unit_sphere();
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -4.0));
        let mut hit = Hit::new();

        // t is measured in units of the direction vector
        assert!(sphere.intersect(&ray, &mut hit, 1e-4));
        assert!((hit.t - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_sphere_hit_off_axis() {
        let sphere = Sphere::new(DVec3::ZERO, 1.0, MaterialId(0)).unwrap();
        // Passes through (0.6, 0.8, 0) on the surface
        let target = DVec3::new(0.6, 0.8, 0.0);
        let origin = target + DVec3::new(0.0, 0.0, 3.0) + DVec3::new(3.0, 4.0, 0.0);
        let ray = Ray::new(origin, (target - origin).normalize());
        let mut hit = Hit::new();

        assert!(sphere.intersect(&ray, &mut hit, 1e-4));
        assert!((hit.t - (target - origin).length()).abs() < 1e-9);
        assert!((hit.normal - target).length() < 1e-9);
    }

    #[test]
    fn test_sphere_from_inside_uses_far_root() {
        let sphere = Sphere::new(DVec3::ZERO, 2.0, MaterialId(0)).unwrap();
        let ray = Ray::new(DVec3::ZERO, DVec3::X);
        let mut hit = Hit::new();

        assert!(sphere.intersect(&ray, &mut hit, 1e-4));
        assert!((hit.t - 2.0).abs() < 1e-12);
        // Normal stays outward
        assert!((hit.normal - DVec3::X).length() < 1e-12);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere();
        let mut hit = Hit::new();

        // Ray pointing away from sphere
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 1.0, 0.0));
        assert!(!sphere.intersect(&ray, &mut hit, 1e-4));

        // Sphere entirely behind the ray
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);
        assert!(!sphere.intersect(&ray, &mut hit, 1e-4));
        assert!(!hit.is_hit());
    }

    #[test]
    fn test_sphere_uv() {
        let sphere = Sphere::new(DVec3::ZERO, 1.0, MaterialId(0)).unwrap();
        let ray = Ray::new(DVec3::new(0.0, 5.0, 0.0), -DVec3::Y);
        let mut hit = Hit::new();

        assert!(sphere.intersect(&ray, &mut hit, 1e-4));
        // Top of the sphere maps to v = 1
        assert!((hit.uv.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_sphere_invalid_radius() {
        assert!(Sphere::new(DVec3::ZERO, 0.0, MaterialId(0)).is_err());
        assert!(Sphere::new(DVec3::ZERO, -1.0, MaterialId(0)).is_err());
    }
}
