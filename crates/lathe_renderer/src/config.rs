//! Render configuration, loadable from JSON.

use crate::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for the radiance estimator and the pixel sampler.
///
/// Missing JSON fields take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples drawn in each sub-pixel cell
    pub samples_per_cell: u32,
    /// Sub-pixel cells along each side of a pixel
    pub subpixel_grid: u32,
    /// Recursion depth at which paths are terminated
    pub max_depth: u32,
    /// Refraction evaluates both branches below this depth
    pub branch_depth: u32,
    /// Hits closer than this are ignored to avoid self-intersection
    pub t_min: f64,
    /// Radiance returned for rays that escape the scene
    pub background: Color,
    /// Base seed for the per-row generators
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_cell: 4,
            subpixel_grid: 2,
            max_depth: 5,
            branch_depth: 2,
            t_min: 1e-4,
            background: Color::ZERO,
            seed: 0,
        }
    }
}

impl RenderConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("Loaded render config from {}", path.display());
        Self::from_json_str(&json)
    }

    /// Check the settings can drive a render.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.samples_per_cell == 0 {
            return Err(ConfigError::Invalid("samples_per_cell must be at least 1".into()));
        }
        if self.subpixel_grid == 0 {
            return Err(ConfigError::Invalid("subpixel_grid must be at least 1".into()));
        }
        if !(self.t_min >= 0.0 && self.t_min.is_finite()) {
            return Err(ConfigError::Invalid(format!("t_min must be finite and non-negative, got {}", self.t_min)));
        }
        Ok(())
    }

    /// Total samples taken per pixel.
    pub fn samples_per_pixel(&self) -> u32 {
        self.subpixel_grid * self.subpixel_grid * self.samples_per_cell
    }
}
