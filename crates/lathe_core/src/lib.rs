//! Lathe Core - Geometry and image data for the lathe renderer.
//!
//! This crate provides:
//!
//! - **Curves**: Bezier and B-spline profiles for surfaces of revolution
//! - **Meshes**: triangle data, face normals and OBJ loading
//! - **Textures**: image textures with nearest-pixel lookup
//!
//! # Example
//!
//! ```ignore
//! use lathe_core::{Curve, Mesh};
//!
//! let profile = Curve::bspline(control_points)?;
//! let samples = profile.discretize(30);
//!
//! let mesh = Mesh::load_obj("bunny.obj")?;
//! println!("Loaded {} triangles", mesh.triangle_count());
//! ```

pub mod curve;
pub mod mesh;
pub mod texture;

// Re-export commonly used types
pub use curve::{Curve, CurveError, CurveKind, CurvePoint, CurveResult};
pub use mesh::{Mesh, MeshError, MeshResult};
pub use texture::{load_texture, Texture, TextureError, TextureResult};
