//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive radiance estimation cut off at a fixed depth
//! - Fresnel blending of refraction below a branch depth, roulette above it
//! - Stratified sub-pixel sampling with a tent filter
//! - Row-parallel rendering with a deterministic generator per row

use crate::image_buffer::ImageBuffer;
use crate::material::{diffuse_ray, refractive_split, specular_ray, MaterialKind};
use crate::{Color, Hit, RenderConfig, Scene};
use lathe_math::Ray;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;

/// Counters gathered while tracing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceStats {
    /// Number of radiance evaluations
    pub calls: u64,
    /// Deepest recursion depth reached
    pub deepest: u32,
}

impl TraceStats {
    #[inline]
    pub fn record(&mut self, depth: u32) {
        self.calls += 1;
        self.deepest = self.deepest.max(depth);
    }

    /// Combine counters from two disjoint parts of a render.
    pub fn merge(self, other: Self) -> Self {
        Self {
            calls: self.calls + other.calls,
            deepest: self.deepest.max(other.deepest),
        }
    }
}

/// Estimate the radiance arriving along `ray`.
///
/// `depth` counts bounces from the camera; the path ends once it reaches
/// `config.max_depth`.
pub fn radiance(
    scene: &Scene,
    ray: &Ray,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
    stats: &mut TraceStats,
) -> Color {
    stats.record(depth);
    if depth >= config.max_depth {
        return Color::ZERO;
    }

    let mut hit = Hit::new();
    if !scene.intersect(ray, &mut hit, config.t_min) {
        return config.background;
    }

    let material = match hit.material.and_then(|id| scene.material(id)) {
        Some(material) => material,
        None => return Color::ZERO,
    };

    let mut color = material.emission;
    let albedo = material.color_at(hit.uv);
    let next = depth + 1;

    let incoming = match material.kind {
        MaterialKind::Diffuse => {
            let bounce = diffuse_ray(ray, &hit, rng);
            radiance(scene, &bounce, next, config, rng, stats)
        }
        MaterialKind::Specular => {
            let bounce = specular_ray(ray, &hit);
            radiance(scene, &bounce, next, config, rng, stats)
        }
        MaterialKind::Refractive => {
            let split = refractive_split(ray, &hit, material.ior);
            match split.refract {
                // Total internal reflection
                None => radiance(scene, &split.reflect, next, config, rng, stats),
                Some(refract) if depth < config.branch_depth => {
                    radiance(scene, &split.reflect, next, config, rng, stats) * split.reflect_weight
                        + radiance(scene, &refract, next, config, rng, stats) * split.refract_weight
                }
                Some(refract) => {
                    if rng.gen::<f64>() < split.reflect_weight {
                        radiance(scene, &split.reflect, next, config, rng, stats)
                    } else {
                        radiance(scene, &refract, next, config, rng, stats)
                    }
                }
            }
        }
    };

    color += albedo * incoming;
    color
}

/// Warp a uniform sample in [0, 1) to a tent distribution on [-1, 1).
#[inline]
pub fn tent(u: f64) -> f64 {
    let r = 2.0 * u;
    if r < 1.0 {
        r.sqrt() - 1.0
    } else {
        1.0 - (2.0 - r).sqrt()
    }
}

/// Estimate the color of pixel (x, y).
///
/// The pixel is split into a grid of cells. Each cell averages its samples,
/// each sample clamped to [0, 1] first, and the pixel averages its cells.
pub fn render_pixel(
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
    stats: &mut TraceStats,
) -> Color {
    let grid = config.subpixel_grid.max(1);
    let samples = config.samples_per_cell.max(1);
    let mut pixel = Color::ZERO;

    for sy in 0..grid {
        for sx in 0..grid {
            let mut cell = Color::ZERO;
            for _ in 0..samples {
                let dx = tent(rng.gen());
                let dy = tent(rng.gen());
                let px = x as f64 + (sx as f64 + 0.5 + dx) / grid as f64;
                let py = y as f64 + (sy as f64 + 0.5 + dy) / grid as f64;

                let ray = scene.camera.generate_ray(px, py, rng);
                let sample = radiance(scene, &ray, 0, config, rng, stats);
                cell += sample.clamp(Color::ZERO, Color::ONE);
            }
            pixel += cell / samples as f64;
        }
    }

    pixel / (grid * grid) as f64
}

/// Seed for the generator of image row `row`.
///
/// SplitMix64 finalizer over the base seed and the row, so neighbouring rows
/// get unrelated streams.
pub fn row_seed(seed: u64, row: u32) -> u64 {
    let mut z = seed ^ (row as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Render one image row into `pixels`.
pub fn render_row(scene: &Scene, y: u32, pixels: &mut [Color], config: &RenderConfig) -> TraceStats {
    let mut rng = StdRng::seed_from_u64(row_seed(config.seed, y));
    let mut stats = TraceStats::default();

    for (x, pixel) in pixels.iter_mut().enumerate() {
        *pixel = render_pixel(scene, x as u32, y, config, &mut rng, &mut stats);
    }

    stats
}

/// Render the entire scene, returning the image and the trace counters.
///
/// Rows are rendered in parallel; each row owns its slice of the buffer and
/// its own generator, so the result does not depend on the thread count.
pub fn render_with_stats(scene: &Scene, config: &RenderConfig) -> (ImageBuffer, TraceStats) {
    let width = scene.camera.image_width;
    let height = scene.camera.image_height;
    let mut image = ImageBuffer::new(width, height);
    if width == 0 || height == 0 {
        return (image, TraceStats::default());
    }

    log::info!(
        "Rendering {}x{} @ {} spp, max depth {}",
        width,
        height,
        config.samples_per_pixel(),
        config.max_depth
    );
    let start = Instant::now();

    let stats = image
        .pixels
        .par_chunks_mut(width as usize)
        .enumerate()
        .map(|(y, row)| {
            let stats = render_row(scene, y as u32, row, config);
            log::debug!("Row {} done", y);
            stats
        })
        .reduce(TraceStats::default, TraceStats::merge);

    log::info!(
        "Rendered in {:.2?}: {} radiance calls, deepest bounce {}",
        start.elapsed(),
        stats.calls,
        stats.deepest
    );

    (image, stats)
}

/// Render the entire scene to an image buffer.
pub fn render(scene: &Scene, config: &RenderConfig) -> ImageBuffer {
    render_with_stats(scene, config).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{scenes, Camera, Group, Material, MaterialId, Plane, Sphere};
    use lathe_math::DVec3;

    fn small_config() -> RenderConfig {
        RenderConfig {
            samples_per_cell: 1,
            subpixel_grid: 2,
            seed: 11,
            ..RenderConfig::default()
        }
    }

    /// Two facing mirrors that bounce a ray forever.
    fn mirror_corridor() -> Scene {
        let mut root = Group::new();
        root.add(Plane::new(DVec3::X, DVec3::new(-1.0, 0.0, 0.0), MaterialId(0)).unwrap());
        root.add(Plane::new(-DVec3::X, DVec3::new(1.0, 0.0, 0.0), MaterialId(0)).unwrap());
        let camera = Camera::new().with_resolution(4, 4);
        Scene::new(camera, vec![Material::specular(Color::ONE)], root).unwrap()
    }

    /// Emissive sphere above a diffuse sphere with nothing around them.
    fn open_spheres(background: Color) -> (Scene, RenderConfig) {
        let materials = vec![Material::diffuse(Color::splat(0.75)), Material::light(Color::splat(4.0))];
        let mut root = Group::new();
        root.add(Sphere::new(DVec3::ZERO, 1.0, MaterialId(0)).unwrap());
        root.add(Sphere::new(DVec3::new(0.0, 2.5, 0.0), 0.5, MaterialId(1)).unwrap());
        let camera = Camera::new()
            .with_resolution(24, 24)
            .with_position(DVec3::new(0.0, 1.0, 8.0), DVec3::new(0.0, 1.0, 0.0), DVec3::Y)
            .with_lens(40.0, 0.0, 1.0);
        let scene = Scene::new(camera, materials, root).unwrap();
        let config = RenderConfig {
            background,
            ..small_config()
        };
        (scene, config)
    }

    #[test]
    fn test_tent_range() {
        assert_eq!(tent(0.0), -1.0);
        assert_eq!(tent(0.5), 0.0);
        assert!((tent(0.125) + 0.5).abs() < 1e-12);
        assert!((tent(0.875) - 0.5).abs() < 1e-12);
        for i in 0..100 {
            let d = tent(i as f64 / 100.0);
            assert!((-1.0..1.0).contains(&d));
        }
    }

    #[test]
    fn test_row_seed_is_stable_and_distinct() {
        assert_eq!(row_seed(0, 5), row_seed(0, 5));
        assert_ne!(row_seed(0, 5), row_seed(0, 6));
        assert_ne!(row_seed(0, 5), row_seed(1, 5));
    }

    #[test]
    fn test_recursion_stops_at_max_depth() {
        let scene = mirror_corridor();
        let mut rng = StdRng::seed_from_u64(1);

        for max_depth in [0, 1, 5, 9] {
            let config = RenderConfig {
                max_depth,
                ..RenderConfig::default()
            };
            let mut stats = TraceStats::default();
            let ray = Ray::new(DVec3::ZERO, DVec3::new(1.0, 0.1, 0.0));
            let color = radiance(&scene, &ray, 0, &config, &mut rng, &mut stats);

            assert_eq!(color, Color::ZERO);
            assert_eq!(stats.deepest, max_depth);
            assert_eq!(stats.calls, max_depth as u64 + 1);
        }
    }

    #[test]
    fn test_refraction_branching_stays_bounded() {
        let scene = scenes::cornell_box(8, 8).unwrap();
        let config = RenderConfig {
            max_depth: 6,
            ..small_config()
        };
        let (_, stats) = render_with_stats(&scene, &config);
        assert!(stats.deepest <= config.max_depth);
        assert!(stats.calls > 0);
    }

    #[test]
    fn test_emission_reaches_camera() {
        let (scene, config) = open_spheres(Color::ZERO);
        let mut rng = StdRng::seed_from_u64(2);
        let mut stats = TraceStats::default();

        // Straight at the light
        let ray = Ray::new(DVec3::new(0.0, 2.5, 8.0), -DVec3::Z);
        let color = radiance(&scene, &ray, 0, &config, &mut rng, &mut stats);
        assert_eq!(color, Color::splat(4.0));
    }

    #[test]
    fn test_background_pixels_are_black() {
        let (scene, config) = open_spheres(Color::ZERO);
        let image = render(&scene, &config);

        // Corners look past both spheres
        for (x, y) in [(0, 0), (23, 0), (0, 23), (23, 23)] {
            assert_eq!(image.get(x, y), Color::ZERO);
        }
        // Every sample of this pixel lands on the light
        assert_eq!(image.get(12, 5), Color::ONE);
    }

    #[test]
    fn test_background_color_on_miss() {
        let background = Color::new(0.2, 0.3, 0.4);
        let (scene, config) = open_spheres(background);
        let mut rng = StdRng::seed_from_u64(4);
        let mut stats = TraceStats::default();

        let ray = Ray::new(DVec3::new(0.0, 10.0, 8.0), DVec3::Y);
        assert_eq!(radiance(&scene, &ray, 0, &config, &mut rng, &mut stats), background);

        let image = render(&scene, &config);
        assert!((image.get(0, 0) - background).length() < 1e-12);
    }

    #[test]
    fn test_render_is_deterministic() {
        let scene = scenes::cornell_box(12, 9).unwrap();
        let config = small_config();

        let first = render(&scene, &config).to_rgb8();
        let second = render(&scene, &config).to_rgb8();
        assert_eq!(first, second);

        // Matches a single-threaded pass row by row
        let mut serial = ImageBuffer::new(12, 9);
        for (y, row) in serial.pixels.chunks_mut(12).enumerate() {
            render_row(&scene, y as u32, row, &config);
        }
        assert_eq!(serial.to_rgb8(), first);
    }

    #[test]
    fn test_pixels_stay_in_unit_range() {
        let scene = scenes::cornell_box(6, 6).unwrap();
        let image = render(&scene, &small_config());
        for color in &image.pixels {
            assert!(color.min_element() >= 0.0 && color.max_element() <= 1.0);
        }
    }
}
