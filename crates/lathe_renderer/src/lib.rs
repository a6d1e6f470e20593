//! Lathe Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer for analytic primitives, triangle meshes and
//! surfaces of revolution.
//!
//! Scenes are a closed set of [`Object3D`] variants held in a root [`Group`],
//! a scene-owned material table indexed by [`MaterialId`], and a [`Camera`].
//! Rendering splits the image into rows processed in parallel with rayon.
//!
//! # Example
//!
//! ```ignore
//! use lathe_renderer::{render, scenes, RenderConfig};
//!
//! let scene = scenes::cornell_box(640, 480)?;
//! let image = render(&scene, &RenderConfig::default());
//! image.save("cornell.png")?;
//! ```

mod camera;
mod config;
mod group;
mod hittable;
mod image_buffer;
mod material;
mod mesh;
mod plane;
mod rectangle;
mod renderer;
mod revsurface;
mod scene;
pub mod scenes;
mod sphere;
mod transform;
mod triangle;

pub use camera::Camera;
pub use config::{ConfigError, ConfigResult, RenderConfig};
pub use group::Group;
pub use hittable::{Hit, Hittable, MaterialId, Object3D};
pub use image_buffer::{color_to_rgb8, encode_channel, ImageBuffer, ImageError, ImageResult, GAMMA};
pub use material::{
    diffuse_ray, refractive_split, schlick, schlick_r0, specular_ray, Color, Material, MaterialKind,
    RefractiveSplit,
};
pub use mesh::TriangleMesh;
pub use plane::Plane;
pub use rectangle::{Disk, Rectangle};
pub use renderer::{radiance, render, render_pixel, render_row, render_with_stats, row_seed, tent, TraceStats};
pub use revsurface::{RevSurface, RevSurfaceSettings};
pub use scene::{Scene, SceneError, SceneResult};
pub use sphere::Sphere;
pub use transform::Transform;
pub use triangle::Triangle;

/// Re-export common math types from lathe_math
pub use lathe_math::{Aabb, DVec2, DVec3, Interval, Ray};
