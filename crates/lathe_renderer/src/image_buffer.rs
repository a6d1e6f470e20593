//! Linear color image buffer and the file sink.

use crate::Color;
use std::path::Path;
use thiserror::Error;

/// Display gamma applied when encoding to 8 bits.
pub const GAMMA: f64 = 2.2;

/// Errors that can occur while writing an image.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to write image {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Result type for image output.
pub type ImageResult<T> = Result<T, ImageError>;

/// Image buffer of linear colors, row 0 at the top.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let i = self.index(x, y);
        self.pixels[i] = color;
    }

    /// Add to the pixel at (x, y).
    pub fn increment(&mut self, x: u32, y: u32, color: Color) {
        let i = self.index(x, y);
        self.pixels[i] += color;
    }

    /// Clamp, gamma encode and quantize every pixel to RGB bytes.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb8(*color));
        }
        bytes
    }

    /// Write the image, format chosen by the file extension (png, bmp, ppm, ...).
    pub fn save(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        let path = path.as_ref();
        image::save_buffer(path, &self.to_rgb8(), self.width, self.height, image::ColorType::Rgb8).map_err(
            |source| ImageError::Write {
                path: path.display().to_string(),
                source,
            },
        )?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// Encode one linear channel value to a byte.
#[inline]
pub fn encode_channel(linear: f64) -> u8 {
    let v = if linear.is_nan() { 0.0 } else { linear.clamp(0.0, 1.0) };
    (255.0 * v.powf(1.0 / GAMMA) + 0.5) as u8
}

/// Convert a color to 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    [encode_channel(color.x), encode_channel(color.y), encode_channel(color.z)]
}
