//! Intersectable triangle mesh.
//!
//! Wraps `lathe_core::Mesh` data as a flat list of triangles. Queries cull with
//! the mesh bounding box and then test every triangle.

use crate::hittable::{Hit, Hittable, MaterialId};
use crate::scene::SceneResult;
use crate::Triangle;
use lathe_core::Mesh;
use lathe_math::{Aabb, Interval, Ray};
use std::path::Path;

/// A triangle mesh sharing one material.
pub struct TriangleMesh {
    triangles: Vec<Triangle>,
    material: MaterialId,
    bbox: Aabb,
}

impl TriangleMesh {
    /// Build the triangles of `mesh`.
    ///
    /// Each triangle reports the mesh's face normal. Degenerate triangles are
    /// skipped.
    pub fn new(mesh: &Mesh, material: MaterialId) -> Self {
        let normals = mesh.face_normals();
        let mut triangles = Vec::with_capacity(mesh.triangle_count());
        let mut skipped = 0;

        for (index, normal) in normals.into_iter().enumerate() {
            let [v0, v1, v2] = mesh.triangle_vertices(index);
            match Triangle::with_normal(v0, v1, v2, normal, material) {
                Ok(triangle) => triangles.push(triangle),
                Err(_) => skipped += 1,
            }
        }

        if skipped > 0 {
            log::warn!("Skipped {} degenerate triangles of {}", skipped, mesh.triangle_count());
        }

        let bbox = triangles
            .iter()
            .fold(Aabb::EMPTY, |bbox, tri| Aabb::surrounding(&bbox, &tri.bounding_box()));

        Self {
            triangles,
            material,
            bbox,
        }
    }

    /// Load an OBJ file into an intersectable mesh.
    pub fn load_obj(path: impl AsRef<Path>, material: MaterialId) -> SceneResult<Self> {
        let mesh = Mesh::load_obj(path)?;
        Ok(Self::new(&mesh, material))
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }
}

impl Hittable for TriangleMesh {
    fn intersect(&self, ray: &Ray, hit: &mut Hit, t_min: f64) -> bool {
        if !self.bbox.hit(ray, Interval::new(t_min, hit.t)) {
            return false;
        }

        let mut hit_anything = false;
        for triangle in &self.triangles {
            if triangle.intersect(ray, hit, t_min) {
                hit_anything = true;
            }
        }
        hit_anything
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
