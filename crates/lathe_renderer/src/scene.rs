//! Scene container: camera, material table and the root group.

use crate::hittable::{Hit, Hittable, MaterialId};
use crate::{Camera, Group, Material};
use lathe_core::{CurveError, MeshError, TextureError};
use lathe_math::Ray;
use thiserror::Error;

/// Errors that make a scene impossible to render.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("revolution profile is not flat: control point {index} has z = {z}")]
    ProfileNotFlat { index: usize, z: f64 },

    #[error("transform matrix is singular (determinant {determinant})")]
    SingularTransform { determinant: f64 },

    #[error("material id {id} is out of range for a table of {count} materials")]
    UnknownMaterial { id: usize, count: usize },

    #[error("invalid {kind}: {reason}")]
    InvalidPrimitive { kind: &'static str, reason: String },

    #[error(transparent)]
    Curve(#[from] CurveError),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Texture(#[from] TextureError),
}

impl SceneError {
    /// Shorthand for a rejected primitive parameter.
    pub fn invalid(kind: &'static str, reason: impl Into<String>) -> Self {
        SceneError::InvalidPrimitive {
            kind,
            reason: reason.into(),
        }
    }
}

/// Result type for scene construction.
pub type SceneResult<T> = Result<T, SceneError>;

/// Everything the path tracer needs to render an image.
///
/// Read-only after construction, so a `&Scene` is shared across render threads.
pub struct Scene {
    pub camera: Camera,
    materials: Vec<Material>,
    root: Group,
    lights: Vec<usize>,
}

impl Scene {
    /// Build a scene, checking every material id the graph references.
    ///
    /// The camera is initialized here.
    pub fn new(mut camera: Camera, materials: Vec<Material>, root: Group) -> SceneResult<Self> {
        let count = materials.len();
        let mut lights = Vec::new();

        for (index, object) in root.objects().iter().enumerate() {
            let ids = object.materials();
            if let Some(bad) = ids.iter().find(|id| id.0 >= count) {
                return Err(SceneError::UnknownMaterial { id: bad.0, count });
            }
            if ids.iter().any(|id| materials[id.0].is_emissive()) {
                lights.push(index);
            }
        }

        camera.initialize();

        log::info!(
            "Scene built: {} objects, {} materials, {} lights",
            root.len(),
            count,
            lights.len()
        );

        Ok(Self {
            camera,
            materials,
            root,
            lights,
        })
    }

    /// Look up a material by id.
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn root(&self) -> &Group {
        &self.root
    }

    /// Indices of root objects that carry an emissive material.
    pub fn lights(&self) -> &[usize] {
        &self.lights
    }

    /// Nearest intersection past `t_min`, see [`Hittable::intersect`].
    pub fn intersect(&self, ray: &Ray, hit: &mut Hit, t_min: f64) -> bool {
        self.root.intersect(ray, hit, t_min)
    }
}
