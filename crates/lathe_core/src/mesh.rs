//! Triangle mesh data.
//!
//! A renderer-agnostic mesh representation populated either directly from
//! arrays or from a Wavefront OBJ file. The renderer wraps it in its own
//! intersectable type.

use std::path::Path;

use lathe_math::{Aabb, DVec3};
use thiserror::Error;

/// Errors that can occur when building or loading a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Index count {0} is not a multiple of 3")]
    RaggedIndices(usize),

    #[error("Triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("Normal count {normals} does not match vertex count {vertices}")]
    NormalCountMismatch { normals: usize, vertices: usize },

    #[error("Failed to load OBJ '{path}': {source}")]
    Obj {
        path: String,
        #[source]
        source: tobj::LoadError,
    },
}

pub type MeshResult<T> = Result<T, MeshError>;

/// A mesh consisting of vertex positions, optional vertex normals, and triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one per vertex)
    pub positions: Vec<DVec3>,

    /// Vertex normals, if the source provided them
    pub normals: Option<Vec<DVec3>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a mesh from positions and indices, optionally with vertex normals.
    pub fn new(positions: Vec<DVec3>, indices: Vec<u32>, normals: Option<Vec<DVec3>>) -> MeshResult<Self> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::RaggedIndices(indices.len()));
        }
        for (i, &index) in indices.iter().enumerate() {
            if index as usize >= positions.len() {
                return Err(MeshError::IndexOutOfRange {
                    triangle: i / 3,
                    index,
                    vertex_count: positions.len(),
                });
            }
        }
        if let Some(normals) = &normals {
            if normals.len() != positions.len() {
                return Err(MeshError::NormalCountMismatch {
                    normals: normals.len(),
                    vertices: positions.len(),
                });
            }
        }

        let bounds = Self::compute_bounds(&positions);
        Ok(Self {
            positions,
            normals,
            indices,
            bounds,
        })
    }

    /// Compute axis-aligned bounding box from positions.
    fn compute_bounds(positions: &[DVec3]) -> Aabb {
        Aabb::from_corners(positions)
    }

    /// Check if the mesh has vertex normals.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Vertex indices of each triangle.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|face| [face[0] as usize, face[1] as usize, face[2] as usize])
    }

    /// Vertex positions of triangle `index`.
    pub fn triangle_vertices(&self, index: usize) -> [DVec3; 3] {
        let base = index * 3;
        [
            self.positions[self.indices[base] as usize],
            self.positions[self.indices[base + 1] as usize],
            self.positions[self.indices[base + 2] as usize],
        ]
    }

    /// One unit normal per triangle.
    ///
    /// With vertex normals present, each face normal is the normalized average
    /// of its three vertex normals. Otherwise it is the normalized cross product
    /// of the two edges leaving the first vertex (counter-clockwise winding).
    pub fn face_normals(&self) -> Vec<DVec3> {
        self.triangles()
            .map(|[i0, i1, i2]| match &self.normals {
                Some(normals) => (normals[i0] + normals[i1] + normals[i2]).normalize_or_zero(),
                None => {
                    let (p0, p1, p2) = (self.positions[i0], self.positions[i1], self.positions[i2]);
                    (p1 - p0).cross(p2 - p0).normalize_or_zero()
                }
            })
            .collect()
    }

    /// Load every model in an OBJ file into a single mesh.
    ///
    /// Faces are triangulated on load. Vertex normals are kept only when every
    /// model in the file provides them.
    pub fn load_obj(path: impl AsRef<Path>) -> MeshResult<Self> {
        let path = path.as_ref();
        let options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };
        let (models, _materials) = tobj::load_obj(path, &options).map_err(|source| MeshError::Obj {
            path: path.display().to_string(),
            source,
        })?;

        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut indices = Vec::new();
        let mut all_normals = true;

        for model in &models {
            let mesh = &model.mesh;
            let offset = positions.len() as u32;

            positions.extend(
                mesh.positions
                    .chunks_exact(3)
                    .map(|p| DVec3::new(p[0] as f64, p[1] as f64, p[2] as f64)),
            );
            indices.extend(mesh.indices.iter().map(|i| i + offset));

            if mesh.normals.len() == mesh.positions.len() {
                normals.extend(
                    mesh.normals
                        .chunks_exact(3)
                        .map(|n| DVec3::new(n[0] as f64, n[1] as f64, n[2] as f64)),
                );
            } else {
                all_normals = false;
            }
        }

        let normals = (all_normals && !normals.is_empty()).then_some(normals);
        let result = Self::new(positions, indices, normals)?;

        log::info!(
            "Loaded OBJ {}: {} models, {} vertices, {} triangles",
            path.display(),
            models.len(),
            result.vertex_count(),
            result.triangle_count()
        );

        Ok(result)
    }
}
