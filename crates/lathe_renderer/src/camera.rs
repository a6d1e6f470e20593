//! Camera for ray generation.

use lathe_math::{DVec2, DVec3, Ray};
use rand::{Rng, RngCore};

/// Perspective camera with an optional thin lens.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: DVec3,
    look_at: DVec3,
    vup: DVec3,

    // Lens settings
    vfov: f64,       // Vertical field of view in degrees
    aperture: f64,   // Lens diameter, zero for a pinhole
    focus_dist: f64, // Distance from camera to plane of perfect focus

    // Cached computed values (set by initialize())
    center: DVec3,
    upper_left: DVec3,
    pixel_delta_u: DVec3,
    pixel_delta_v: DVec3,
    u: DVec3,
    v: DVec3,
    w: DVec3,
    lens_radius: f64,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            image_width: 800,
            image_height: 600,
            look_from: DVec3::ZERO,
            look_at: DVec3::new(0.0, 0.0, -1.0),
            vup: DVec3::Y,
            vfov: 40.0,
            aperture: 0.0,
            focus_dist: 1.0,
            center: DVec3::ZERO,
            upper_left: DVec3::ZERO,
            pixel_delta_u: DVec3::ZERO,
            pixel_delta_v: DVec3::ZERO,
            u: DVec3::X,
            v: DVec3::Y,
            w: DVec3::Z,
            lens_radius: 0.0,
        }
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: DVec3, look_at: DVec3, vup: DVec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings. An `aperture` of zero gives a pinhole camera.
    pub fn with_lens(mut self, vfov: f64, aperture: f64, focus_dist: f64) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Initialize the camera (must be called before generating rays).
    pub fn initialize(&mut self) {
        self.center = self.look_from;

        // Calculate viewport dimensions
        let h = (self.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width = viewport_height * (self.image_width as f64 / self.image_height.max(1) as f64);

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        // Viewport edges, v runs down the image
        let viewport_u = viewport_width * self.u;
        let viewport_v = -viewport_height * self.v;

        self.pixel_delta_u = viewport_u / self.image_width.max(1) as f64;
        self.pixel_delta_v = viewport_v / self.image_height.max(1) as f64;

        self.upper_left = self.center - self.focus_dist * self.w - viewport_u / 2.0 - viewport_v / 2.0;
        self.lens_radius = self.aperture / 2.0;
    }

    /// Generate a ray through the continuous pixel coordinate `(px, py)`.
    ///
    /// `(0, 0)` is the top-left corner of the image and `(width, height)` the
    /// bottom-right. The direction is unit length.
    pub fn generate_ray(&self, px: f64, py: f64, rng: &mut dyn RngCore) -> Ray {
        let target = self.upper_left + px * self.pixel_delta_u + py * self.pixel_delta_v;

        let origin = if self.lens_radius <= 0.0 {
            self.center
        } else {
            let p = random_in_unit_disk(rng) * self.lens_radius;
            self.center + p.x * self.u + p.y * self.v
        };

        Ray::new(origin, (target - origin).normalize())
    }

    pub fn look_from(&self) -> DVec3 {
        self.look_from
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample a random point in the unit disk.
fn random_in_unit_disk(rng: &mut dyn RngCore) -> DVec2 {
    loop {
        let p = DVec2::new(rng.gen::<f64>() * 2.0 - 1.0, rng.gen::<f64>() * 2.0 - 1.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pinhole(width: u32, height: u32) -> Camera {
        let mut camera = Camera::new()
            .with_resolution(width, height)
            .with_position(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0), DVec3::Y)
            .with_lens(90.0, 0.0, 1.0);
        camera.initialize();
        camera
    }

    #[test]
    fn test_camera_initialize() {
        let camera = pinhole(800, 600);
        assert_eq!(camera.center, DVec3::ZERO);
        assert!((camera.w - DVec3::Z).length() < 1e-12);
        assert!((camera.u - DVec3::X).length() < 1e-12);
    }

    #[test]
    fn test_camera_center_and_corners() {
        let camera = pinhole(100, 100);
        let mut rng = StdRng::seed_from_u64(42);

        let ray = camera.generate_ray(50.0, 50.0, &mut rng);
        assert!((ray.direction() + DVec3::Z).length() < 1e-12);

        // 90 degree FOV on a square image puts the corner at 45 degrees on both axes
        let ray = camera.generate_ray(0.0, 0.0, &mut rng);
        let expected = DVec3::new(-1.0, 1.0, -1.0).normalize();
        assert!((ray.direction() - expected).length() < 1e-12);

        let ray = camera.generate_ray(100.0, 100.0, &mut rng);
        let expected = DVec3::new(1.0, -1.0, -1.0).normalize();
        assert!((ray.direction() - expected).length() < 1e-12);
    }

    #[test]
    fn test_thin_lens_focuses() {
        let mut camera = Camera::new()
            .with_resolution(64, 64)
            .with_position(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0), DVec3::Y)
            .with_lens(60.0, 0.5, 4.0);
        camera.initialize();

        let mut rng = StdRng::seed_from_u64(3);
        let focus = DVec3::new(0.0, 0.0, -4.0);
        for _ in 0..32 {
            let ray = camera.generate_ray(32.0, 32.0, &mut rng);
            assert!(ray.origin().z.abs() < 1e-12);
            assert!(ray.origin().length() <= 0.25 + 1e-12);
            // Every lens sample converges on the focus plane
            let t = 4.0 / -ray.direction().z;
            assert!((ray.at(t) - focus).length() < 1e-9);
        }
    }
}
