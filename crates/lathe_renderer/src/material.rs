//! Surface materials and the sampling functions for continuation rays.

use crate::hittable::Hit;
use lathe_core::Texture;
use lathe_math::{DVec2, DVec3, Ray};
use rand::{Rng, RngCore};
use std::f64::consts::TAU;
use std::sync::Arc;

/// Color type alias (RGB values typically 0-1)
pub type Color = DVec3;

/// Index of refraction of the medium surrounding every object.
pub const AIR_IOR: f64 = 1.0;

/// How a surface scatters light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    /// Ideal Lambertian reflector
    Diffuse,
    /// Perfect mirror
    Specular,
    /// Dielectric that both reflects and refracts
    Refractive,
}

/// A surface material.
#[derive(Debug, Clone)]
pub struct Material {
    pub kind: MaterialKind,
    /// Albedo, replaced by the texture where one is set
    pub color: Color,
    /// Radiance emitted by the surface
    pub emission: Color,
    /// Index of refraction (only used by refractive materials)
    pub ior: f64,
    pub texture: Option<Arc<Texture>>,
}

impl Material {
    /// Create a material of the given kind with no emission.
    pub fn new(kind: MaterialKind, color: Color) -> Self {
        Self {
            kind,
            color,
            emission: Color::ZERO,
            ior: 1.0,
            texture: None,
        }
    }

    pub fn diffuse(color: Color) -> Self {
        Self::new(MaterialKind::Diffuse, color)
    }

    pub fn specular(color: Color) -> Self {
        Self::new(MaterialKind::Specular, color)
    }

    /// Dielectric with index of refraction `ior` (1.5 = glass, 2.4 = diamond).
    pub fn refractive(color: Color, ior: f64) -> Self {
        Self {
            ior,
            ..Self::new(MaterialKind::Refractive, color)
        }
    }

    /// Black diffuse emitter.
    pub fn light(emission: Color) -> Self {
        Self::diffuse(Color::ZERO).with_emission(emission)
    }

    pub fn with_emission(mut self, emission: Color) -> Self {
        self.emission = emission;
        self
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Returns true if the material emits light.
    pub fn is_emissive(&self) -> bool {
        self.emission != Color::ZERO
    }

    /// Albedo at surface coordinate `uv`.
    pub fn color_at(&self, uv: DVec2) -> Color {
        match &self.texture {
            Some(texture) => texture.sample_nearest(uv.x, uv.y),
            None => self.color,
        }
    }
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: DVec3, n: DVec3) -> DVec3 {
    v - 2.0 * v.dot(n) * n
}

/// Cosine-weighted direction on the hemisphere facing the incoming ray.
pub fn diffuse_ray(ray: &Ray, hit: &Hit, rng: &mut dyn RngCore) -> Ray {
    let phi = TAU * rng.gen::<f64>();
    let r2: f64 = rng.gen();
    let r2s = r2.sqrt();

    let w = if hit.normal.dot(ray.direction()) > 0.0 {
        -hit.normal
    } else {
        hit.normal
    };
    let axis = if w.x.abs() > 0.1 { DVec3::Y } else { DVec3::X };
    let u = axis.cross(w).normalize();
    let v = w.cross(u);

    let direction = (u * phi.cos() * r2s + v * phi.sin() * r2s + w * (1.0 - r2).sqrt()).normalize();
    Ray::new(ray.at(hit.t), direction)
}

/// Mirror reflection of the incoming ray.
pub fn specular_ray(ray: &Ray, hit: &Hit) -> Ray {
    Ray::new(ray.at(hit.t), reflect(ray.direction().normalize(), hit.normal))
}

/// Reflected and refracted continuations at a dielectric boundary.
#[derive(Debug, Clone, Copy)]
pub struct RefractiveSplit {
    pub reflect: Ray,
    pub reflect_weight: f64,
    /// `None` under total internal reflection
    pub refract: Option<Ray>,
    pub refract_weight: f64,
}

/// Schlick's reflectance at normal incidence between air and `ior`.
pub fn schlick_r0(ior: f64) -> f64 {
    ((AIR_IOR - ior) / (AIR_IOR + ior)).powi(2)
}

/// Schlick's approximation for reflectance.
pub fn schlick(cosine: f64, ior: f64) -> f64 {
    let r0 = schlick_r0(ior);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Split a ray hitting a dielectric of index `ior` into reflected and
/// refracted rays with Fresnel weights that sum to one.
///
/// The side is decided by the sign of `direction . normal`: a negative value
/// means the ray enters the material.
pub fn refractive_split(ray: &Ray, hit: &Hit, ior: f64) -> RefractiveSplit {
    let dir = ray.direction().normalize();
    let point = ray.at(hit.t);
    let reflected = Ray::new(point, reflect(dir, hit.normal));

    let mut cos = dir.dot(hit.normal);
    let sin = (1.0 - cos * cos).max(0.0).sqrt();

    let (eta, normal) = if cos < 0.0 {
        cos = -cos;
        (AIR_IOR / ior, -hit.normal)
    } else {
        (ior / AIR_IOR, hit.normal)
    };

    let k = 1.0 - eta * eta * sin * sin;
    if k <= 0.0 {
        return RefractiveSplit {
            reflect: reflected,
            reflect_weight: 1.0,
            refract: None,
            refract_weight: 0.0,
        };
    }

    let refracted = normal * (k.sqrt() - eta * cos) + dir * eta;
    let reflect_weight = schlick(cos, ior);

    RefractiveSplit {
        reflect: reflected,
        reflect_weight,
        refract: Some(Ray::new(point, refracted)),
        refract_weight: 1.0 - reflect_weight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MaterialId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hit_at(t: f64, normal: DVec3) -> Hit {
        let mut hit = Hit::new();
        hit.set(t, MaterialId(0), normal, DVec2::ZERO);
        hit
    }

    #[test]
    fn test_schlick_r0_glass() {
        let r0 = schlick_r0(1.5);
        assert!((r0 - 0.04).abs() < 1e-12);
        assert!((schlick(1.0, 1.5) - r0).abs() < 1e-12);
        assert!((schlick(0.0, 1.5) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_refractive_split_normal_incidence() {
        let ray = Ray::new(DVec3::new(0.0, 0.0, 2.0), -DVec3::Z);
        let split = refractive_split(&ray, &hit_at(2.0, DVec3::Z), 1.5);

        assert!((split.reflect_weight - 0.04).abs() < 1e-12);
        assert!((split.reflect_weight + split.refract_weight - 1.0).abs() < 1e-12);

        // Straight through, straight back
        let refract = split.refract.unwrap();
        assert!((refract.direction() + DVec3::Z).length() < 1e-12);
        assert!((split.reflect.direction() - DVec3::Z).length() < 1e-12);
        assert!(refract.origin().length() < 1e-12);
    }

    #[test]
    fn test_refractive_split_snell() {
        // Entering glass at 45 degrees
        let dir = DVec3::new(1.0, -1.0, 0.0).normalize();
        let ray = Ray::new(-dir, dir);
        let split = refractive_split(&ray, &hit_at(1.0, DVec3::Y), 1.5);

        let refract = split.refract.unwrap().direction();
        assert!((refract.length() - 1.0).abs() < 1e-12);
        let sin_out = refract.x;
        assert!((sin_out - (0.5f64).sqrt() / 1.5).abs() < 1e-12);
        assert!(refract.y < 0.0);
        assert!((split.reflect_weight + split.refract_weight - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_refractive_split_exiting() {
        // Leaving glass at a shallow angle, below the critical angle
        let dir = DVec3::new(0.3, 1.0, 0.0).normalize();
        let ray = Ray::new(DVec3::ZERO, dir);
        let split = refractive_split(&ray, &hit_at(1.0, DVec3::Y), 1.5);

        let refract = split.refract.unwrap().direction();
        assert!((refract.x - 1.5 * dir.x).abs() < 1e-12);
        assert!(refract.y > 0.0);
    }

    #[test]
    fn test_total_internal_reflection() {
        // Leaving glass at 60 degrees exceeds the critical angle of ~41.8
        let dir = DVec3::new(3.0f64.sqrt(), 1.0, 0.0).normalize();
        let ray = Ray::new(DVec3::ZERO, dir);
        let split = refractive_split(&ray, &hit_at(1.0, DVec3::Y), 1.5);

        assert!(split.refract.is_none());
        assert_eq!(split.reflect_weight, 1.0);
        assert_eq!(split.refract_weight, 0.0);
        assert!(split.reflect.direction().y < 0.0);
    }

    #[test]
    fn test_diffuse_ray_faces_incoming_side() {
        let mut rng = StdRng::seed_from_u64(42);
        // Ray arriving from below a surface whose normal points up
        let ray = Ray::new(DVec3::new(0.0, -1.0, 0.0), DVec3::Y);
        let hit = hit_at(1.0, DVec3::Y);

        for _ in 0..100 {
            let next = diffuse_ray(&ray, &hit, &mut rng);
            assert!(next.direction().y <= 0.0);
            assert!((next.direction().length() - 1.0).abs() < 1e-9);
            assert!(next.origin().length() < 1e-12);
        }
    }

    #[test]
    fn test_diffuse_ray_is_cosine_weighted() {
        let mut rng = StdRng::seed_from_u64(7);
        let ray = Ray::new(DVec3::new(0.0, 1.0, 0.0), -DVec3::Y);
        let hit = hit_at(1.0, DVec3::Y);

        // E[cos] = 2/3 for a cosine-weighted hemisphere
        let n = 20_000;
        let mean: f64 = (0..n).map(|_| diffuse_ray(&ray, &hit, &mut rng).direction().y).sum::<f64>() / n as f64;
        assert!((mean - 2.0 / 3.0).abs() < 0.01);
    }

    #[test]
    fn test_specular_ray() {
        let ray = Ray::new(DVec3::new(-1.0, 1.0, 0.0), DVec3::new(1.0, -1.0, 0.0));
        let next = specular_ray(&ray, &hit_at(1.0, DVec3::Y));
        assert!(next.origin().length() < 1e-12);
        assert!((next.direction() - DVec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-12);
    }

    #[test]
    fn test_material_color_at() {
        let plain = Material::diffuse(Color::new(0.5, 0.25, 0.0));
        assert_eq!(plain.color_at(DVec2::new(0.3, 0.3)), Color::new(0.5, 0.25, 0.0));
        assert!(!plain.is_emissive());

        let textured = Material::diffuse(Color::ONE).with_texture(Arc::new(Texture::checkerboard(4, 2, Color::X, Color::Y)));
        assert_eq!(textured.color_at(DVec2::new(0.1, 0.1)), Color::X);
        assert_eq!(textured.color_at(DVec2::new(0.9, 0.1)), Color::Y);

        assert!(Material::light(Color::splat(12.0)).is_emissive());
    }
}
