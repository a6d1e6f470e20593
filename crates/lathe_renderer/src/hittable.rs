//! Hittable trait, the Hit record, and the closed set of scene objects.

use crate::{Disk, Group, Plane, Rectangle, RevSurface, Sphere, Transform, Triangle, TriangleMesh};
use lathe_math::{Aabb, DVec2, DVec3, Ray};

/// Index of a material in the scene's material table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

/// Record of the closest intersection found so far along a ray.
///
/// `t` starts at infinity and only ever decreases while a query runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Ray parameter of the intersection
    pub t: f64,
    /// Material at the intersection, `None` until something is hit
    pub material: Option<MaterialId>,
    /// Unit surface normal, oriented by the primitive that produced it
    pub normal: DVec3,
    /// Surface (texture) coordinate
    pub uv: DVec2,
}

impl Default for Hit {
    fn default() -> Self {
        Self {
            t: f64::INFINITY,
            material: None,
            normal: DVec3::ZERO,
            uv: DVec2::ZERO,
        }
    }
}

impl Hit {
    /// Create an empty hit record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the record with a new intersection.
    pub fn set(&mut self, t: f64, material: MaterialId, normal: DVec3, uv: DVec2) {
        self.t = t;
        self.material = Some(material);
        self.normal = normal;
        self.uv = uv;
    }

    /// Returns true if `t` lies past `t_min` and before the current closest hit.
    #[inline]
    pub fn accepts(&self, t: f64, t_min: f64) -> bool {
        t > t_min && t < self.t
    }

    /// Returns true once any object has been recorded.
    pub fn is_hit(&self) -> bool {
        self.material.is_some()
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object past `t_min` and closer than `hit.t`.
    ///
    /// Returns true if hit and overwrites the record; otherwise leaves it untouched.
    fn intersect(&self, ray: &Ray, hit: &mut Hit, t_min: f64) -> bool;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;
}

/// Every kind of object a scene can hold.
pub enum Object3D {
    Plane(Plane),
    Sphere(Sphere),
    Triangle(Triangle),
    Rectangle(Rectangle),
    Disk(Disk),
    Mesh(TriangleMesh),
    Transform(Transform),
    Group(Group),
    RevSurface(RevSurface),
}

impl Object3D {
    /// Collect the material ids used by this object and its children.
    pub fn collect_materials(&self, out: &mut Vec<MaterialId>) {
        match self {
            Object3D::Plane(o) => out.push(o.material()),
            Object3D::Sphere(o) => out.push(o.material()),
            Object3D::Triangle(o) => out.push(o.material()),
            Object3D::Rectangle(o) => out.push(o.material()),
            Object3D::Disk(o) => out.push(o.material()),
            Object3D::Mesh(o) => out.push(o.material()),
            Object3D::RevSurface(o) => out.push(o.material()),
            Object3D::Transform(o) => o.object().collect_materials(out),
            Object3D::Group(o) => o.objects().iter().for_each(|child| child.collect_materials(out)),
        }
    }

    /// Material ids used by this object and its children.
    pub fn materials(&self) -> Vec<MaterialId> {
        let mut out = Vec::new();
        self.collect_materials(&mut out);
        out
    }
}

impl Hittable for Object3D {
    fn intersect(&self, ray: &Ray, hit: &mut Hit, t_min: f64) -> bool {
        match self {
            Object3D::Plane(o) => o.intersect(ray, hit, t_min),
            Object3D::Sphere(o) => o.intersect(ray, hit, t_min),
            Object3D::Triangle(o) => o.intersect(ray, hit, t_min),
            Object3D::Rectangle(o) => o.intersect(ray, hit, t_min),
            Object3D::Disk(o) => o.intersect(ray, hit, t_min),
            Object3D::Mesh(o) => o.intersect(ray, hit, t_min),
            Object3D::Transform(o) => o.intersect(ray, hit, t_min),
            Object3D::Group(o) => o.intersect(ray, hit, t_min),
            Object3D::RevSurface(o) => o.intersect(ray, hit, t_min),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            Object3D::Plane(o) => o.bounding_box(),
            Object3D::Sphere(o) => o.bounding_box(),
            Object3D::Triangle(o) => o.bounding_box(),
            Object3D::Rectangle(o) => o.bounding_box(),
            Object3D::Disk(o) => o.bounding_box(),
            Object3D::Mesh(o) => o.bounding_box(),
            Object3D::Transform(o) => o.bounding_box(),
            Object3D::Group(o) => o.bounding_box(),
            Object3D::RevSurface(o) => o.bounding_box(),
        }
    }
}

macro_rules! impl_from_object {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Object3D {
                fn from(object: $ty) -> Self {
                    Object3D::$variant(object)
                }
            }
        )*
    };
}

impl_from_object! {
    Plane => Plane,
    Sphere => Sphere,
    Triangle => Triangle,
    Rectangle => Rectangle,
    Disk => Disk,
    Mesh => TriangleMesh,
    Transform => Transform,
    Group => Group,
    RevSurface => RevSurface,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_default_is_empty() {
        let hit = Hit::new();
        assert_eq!(hit.t, f64::INFINITY);
        assert!(!hit.is_hit());
        assert_eq!(hit.uv, DVec2::ZERO);
    }

    #[test]
    fn test_hit_accepts() {
        let mut hit = Hit::new();
        assert!(hit.accepts(1.0, 1e-4));
        assert!(!hit.accepts(1e-5, 1e-4));
        // The lower clip is strict
        assert!(!hit.accepts(1e-4, 1e-4));

        hit.set(2.0, MaterialId(3), DVec3::Y, DVec2::new(0.5, 0.25));
        assert!(hit.is_hit());
        assert!(hit.accepts(1.5, 1e-4));
        assert!(!hit.accepts(2.0, 1e-4));
        assert!(!hit.accepts(2.5, 1e-4));
    }

    #[test]
    fn test_collect_materials_recurses() {
        let mut group = Group::new();
        group.add(Sphere::new(DVec3::ZERO, 1.0, MaterialId(0)).unwrap());
        let mut inner = Group::new();
        inner.add(Plane::new(DVec3::Y, DVec3::ZERO, MaterialId(2)).unwrap());
        group.add(inner);

        let object = Object3D::from(group);
        assert_eq!(object.materials(), vec![MaterialId(0), MaterialId(2)]);
    }
}
