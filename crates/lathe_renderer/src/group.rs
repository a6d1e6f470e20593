//! Group of objects resolving the nearest hit among its children.

use crate::hittable::{Hit, Hittable, Object3D};
use lathe_math::{Aabb, Interval, Ray};

/// A collection of objects.
///
/// Child bounding boxes are cached so a query can skip children the ray
/// cannot reach before the current closest hit.
pub struct Group {
    objects: Vec<Object3D>,
    boxes: Vec<Aabb>,
    bbox: Aabb,
}

impl Group {
    /// Create a new empty group.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            boxes: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Add an object to the group.
    pub fn add(&mut self, object: impl Into<Object3D>) {
        let object = object.into();
        let bbox = object.bounding_box();
        self.bbox = Aabb::surrounding(&self.bbox, &bbox);
        self.boxes.push(bbox);
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[Object3D] {
        &self.objects
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the group is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Into<Object3D>> FromIterator<T> for Group {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut group = Group::new();
        for object in iter {
            group.add(object);
        }
        group
    }
}

impl Hittable for Group {
    fn intersect(&self, ray: &Ray, hit: &mut Hit, t_min: f64) -> bool {
        let mut hit_anything = false;

        for (object, bbox) in self.objects.iter().zip(&self.boxes) {
            if !bbox.hit(ray, Interval::new(t_min, hit.t)) {
                continue;
            }
            if object.intersect(ray, hit, t_min) {
                hit_anything = true;
            }
        }

        hit_anything
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MaterialId, Plane, Sphere};
    use lathe_math::{DVec2, DVec3};

    fn row_of_spheres(count: usize) -> Group {
        (0..count)
            .map(|i| Sphere::new(DVec3::new(3.0 * i as f64, 0.0, 0.0), 1.0, MaterialId(i)).unwrap())
            .collect()
    }

    #[test]
    fn test_group_hits_only_the_sphere_on_the_ray() {
        let group = row_of_spheres(5);
        assert_eq!(group.len(), 5);

        for i in 0..5 {
            let x = 3.0 * i as f64;
            let ray = Ray::new(DVec3::new(x, 0.0, 10.0), -DVec3::Z);
            let mut hit = Hit::new();

            assert!(group.intersect(&ray, &mut hit, 1e-4));
            assert_eq!(hit.material, Some(MaterialId(i)));
            assert!((hit.t - 9.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_group_picks_nearest_along_ray() {
        let group = row_of_spheres(4);
        // Travels down the row from the far end
        let ray = Ray::new(DVec3::new(20.0, 0.0, 0.0), -DVec3::X);
        let mut hit = Hit::new();

        assert!(group.intersect(&ray, &mut hit, 1e-4));
        assert_eq!(hit.material, Some(MaterialId(3)));
        assert!((hit.t - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_group_reports_only_improvements() {
        let group = row_of_spheres(3);
        let ray = Ray::new(DVec3::new(0.0, 0.0, 10.0), -DVec3::Z);

        let mut hit = Hit::new();
        hit.set(2.0, MaterialId(99), DVec3::Z, DVec2::ZERO);
        assert!(!group.intersect(&ray, &mut hit, 1e-4));
        assert_eq!(hit.material, Some(MaterialId(99)));
    }

    #[test]
    fn test_empty_group_misses() {
        let group = Group::new();
        let ray = Ray::new(DVec3::ZERO, DVec3::X);
        let mut hit = Hit::new();
        assert!(group.is_empty());
        assert!(!group.intersect(&ray, &mut hit, 1e-4));
        assert_eq!(group.bounding_box(), Aabb::EMPTY);
    }

    #[test]
    fn test_group_with_unbounded_child() {
        let mut group = row_of_spheres(1);
        group.add(Plane::new(DVec3::Y, DVec3::new(0.0, -5.0, 0.0), MaterialId(7)).unwrap());
        assert_eq!(group.bounding_box(), Aabb::UNIVERSE);

        let ray = Ray::new(DVec3::new(10.0, 0.0, 0.0), -DVec3::Y);
        let mut hit = Hit::new();
        assert!(group.intersect(&ray, &mut hit, 1e-4));
        assert_eq!(hit.material, Some(MaterialId(7)));
        assert!((hit.t - 5.0).abs() < 1e-12);
    }
}
