//! Image textures for material color lookup.
//!
//! Textures are stored as linear float RGB and sampled with nearest-pixel
//! lookup. Row 0 is the first row stored in the image file.

use std::path::Path;

use lathe_math::DVec3;
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture '{path}': {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture has zero size ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("Expected {expected} pixels for a {width}x{height} texture, got {got}")]
    PixelCountMismatch {
        width: u32,
        height: u32,
        expected: usize,
        got: usize,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A texture with pixel data.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Pixel data in RGB, row-major order, channels in 0-1
    pub pixels: Vec<DVec3>,

    /// Where the pixels came from (for debugging)
    pub path: String,
}

impl Texture {
    /// Create a new texture from pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<DVec3>, path: impl Into<String>) -> TextureResult<Self> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty { width, height });
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(TextureError::PixelCountMismatch {
                width,
                height,
                expected,
                got: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            path: path.into(),
        })
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: DVec3) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![color],
            path: "<solid>".to_string(),
        }
    }

    /// Create a checkerboard with `cells` squares along each side.
    pub fn checkerboard(size: u32, cells: u32, even: DVec3, odd: DVec3) -> Self {
        let size = size.max(1);
        let cell = (size / cells.max(1)).max(1);
        let pixels = (0..size)
            .flat_map(|y| (0..size).map(move |x| if (x / cell + y / cell) % 2 == 0 { even } else { odd }))
            .collect();
        Self {
            width: size,
            height: size,
            pixels,
            path: "<checkerboard>".to_string(),
        }
    }

    /// Color of the pixel under `(u, v)`.
    ///
    /// `u` runs across columns and `v` down rows. Coordinates outside [0, 1]
    /// are clamped to the edge pixels.
    pub fn sample_nearest(&self, u: f64, v: f64) -> DVec3 {
        let x = Self::pixel_index(u, self.width);
        let y = Self::pixel_index(v, self.height);
        self.get_pixel(x, y)
    }

    fn pixel_index(coord: f64, size: u32) -> u32 {
        let scaled = (coord * size as f64).floor();
        if scaled.is_nan() || scaled < 0.0 {
            0
        } else {
            (scaled as u32).min(size - 1)
        }
    }

    /// Get pixel at integer coordinates.
    fn get_pixel(&self, x: u32, y: u32) -> DVec3 {
        let idx = (y * self.width + x) as usize;
        self.pixels.get(idx).copied().unwrap_or(DVec3::ZERO)
    }
}

/// Load a texture from a file path.
///
/// Channel bytes are scaled by 1/255 with no color-space conversion.
pub fn load_texture(path: impl AsRef<Path>) -> TextureResult<Texture> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| TextureError::Load {
        path: path.display().to_string(),
        source,
    })?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let pixels = rgb
        .pixels()
        .map(|p| DVec3::new(p[0] as f64, p[1] as f64, p[2] as f64) / 255.0)
        .collect();

    log::debug!("Loaded texture: {} ({}x{})", path.display(), width, height);

    Texture::new(width, height, pixels, path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> Texture {
        // 2x2: red, green / blue, white
        Texture::new(
            2,
            2,
            vec![DVec3::X, DVec3::Y, DVec3::Z, DVec3::ONE],
            "<test>",
        )
        .unwrap()
    }

    #[test]
    fn test_solid_color_texture() {
        let tex = Texture::solid_color(DVec3::new(1.0, 0.5, 0.0));
        assert_eq!(tex.width, 1);
        assert_eq!(tex.height, 1);
        assert_eq!(tex.sample_nearest(0.5, 0.5), DVec3::new(1.0, 0.5, 0.0));
        assert_eq!(tex.sample_nearest(7.0, -3.0), DVec3::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_sample_nearest() {
        let tex = gradient();
        assert_eq!(tex.sample_nearest(0.25, 0.25), DVec3::X);
        assert_eq!(tex.sample_nearest(0.75, 0.25), DVec3::Y);
        assert_eq!(tex.sample_nearest(0.25, 0.75), DVec3::Z);
        assert_eq!(tex.sample_nearest(0.75, 0.75), DVec3::ONE);
    }

    #[test]
    fn test_sample_clamps_to_edges() {
        let tex = gradient();
        // u = 1.0 would index one past the last column
        assert_eq!(tex.sample_nearest(1.0, 0.0), DVec3::Y);
        assert_eq!(tex.sample_nearest(-0.5, 2.0), DVec3::Z);
        assert_eq!(tex.sample_nearest(f64::NAN, 0.0), DVec3::X);
    }

    #[test]
    fn test_checkerboard() {
        let tex = Texture::checkerboard(8, 2, DVec3::ONE, DVec3::ZERO);
        assert_eq!(tex.pixels.len(), 64);
        assert_eq!(tex.sample_nearest(0.1, 0.1), DVec3::ONE);
        assert_eq!(tex.sample_nearest(0.9, 0.1), DVec3::ZERO);
        assert_eq!(tex.sample_nearest(0.9, 0.9), DVec3::ONE);
    }

    #[test]
    fn test_invalid_textures() {
        assert!(matches!(
            Texture::new(0, 4, vec![], "<test>"),
            Err(TextureError::Empty { .. })
        ));
        assert!(matches!(
            Texture::new(2, 2, vec![DVec3::ZERO; 3], "<test>"),
            Err(TextureError::PixelCountMismatch { expected: 4, got: 3, .. })
        ));
    }

    #[test]
    fn test_load_texture() {
        let path = std::env::temp_dir().join(format!("lathe_texture_test_{}.png", std::process::id()));
        let img = image::RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([0, 51, 255])
            }
        });
        img.save(&path).unwrap();

        let tex = load_texture(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!((tex.width, tex.height), (2, 1));
        assert_eq!(tex.sample_nearest(0.0, 0.0), DVec3::X);
        let right = tex.sample_nearest(0.9, 0.5);
        assert!((right - DVec3::new(0.0, 0.2, 1.0)).length() < 1e-12);
    }

    #[test]
    fn test_load_missing_texture() {
        assert!(matches!(
            load_texture("/nonexistent/lathe/texture.png"),
            Err(TextureError::Load { .. })
        ));
    }
}
