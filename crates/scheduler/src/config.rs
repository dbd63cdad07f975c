//! Tile scheduler configuration.
//!
//! Values can be loaded from a TOML file, from environment variables, or built
//! programmatically. Pixel values are device pixels.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

/// Edge length of one render cell.
pub const DEFAULT_TILE_SIZE: f32 = 256.0;

/// Thumbnail size relative to the on-screen page size.
pub const DEFAULT_THUMBNAIL_RATIO: f32 = 0.3;

/// Render requests allowed per scheduling pass.
pub const DEFAULT_PASS_BUDGET: usize = 120;

/// Lookahead margin around the viewport.
pub const DEFAULT_PRELOAD_OFFSET: f32 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Render cell edge length in pixels
    pub tile_size: f32,
    /// Thumbnail scale relative to the page size at zoom 1
    pub thumbnail_ratio: f32,
    /// Maximum number of tiles submitted in one pass
    pub pass_budget: usize,
    /// Margin scheduled beyond each viewport edge
    pub preload_offset: f32,
    /// Forwarded to every render task
    pub best_quality: bool,
    /// Forwarded to every render task
    pub annotation_rendering: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            thumbnail_ratio: DEFAULT_THUMBNAIL_RATIO,
            pass_budget: DEFAULT_PASS_BUDGET,
            preload_offset: DEFAULT_PRELOAD_OFFSET,
            best_quality: false,
            annotation_rendering: false,
        }
    }
}

impl SchedulerConfig {
    pub fn with_tile_size(mut self, tile_size: f32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_thumbnail_ratio(mut self, ratio: f32) -> Self {
        self.thumbnail_ratio = ratio;
        self
    }

    pub fn with_pass_budget(mut self, budget: usize) -> Self {
        self.pass_budget = budget;
        self
    }

    pub fn with_preload_offset(mut self, offset: f32) -> Self {
        self.preload_offset = offset;
        self
    }

    pub fn with_best_quality(mut self, enabled: bool) -> Self {
        self.best_quality = enabled;
        self
    }

    pub fn with_annotation_rendering(mut self, enabled: bool) -> Self {
        self.annotation_rendering = enabled;
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PAGESTRIP_TILE_SIZE` (default: 256)
    /// - `PAGESTRIP_THUMBNAIL_RATIO` (default: 0.3)
    /// - `PAGESTRIP_PASS_BUDGET` (default: 120)
    /// - `PAGESTRIP_PRELOAD_OFFSET` (default: 20)
    /// - `PAGESTRIP_BEST_QUALITY`: `true` or `false`
    /// - `PAGESTRIP_ANNOTATION_RENDERING`: `true` or `false`
    ///
    /// # Errors
    /// Returns an error if any variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(val) = env_value("PAGESTRIP_TILE_SIZE")? {
            config.tile_size = val;
        }
        if let Some(val) = env_value("PAGESTRIP_THUMBNAIL_RATIO")? {
            config.thumbnail_ratio = val;
        }
        if let Some(val) = env_value("PAGESTRIP_PASS_BUDGET")? {
            config.pass_budget = val;
        }
        if let Some(val) = env_value("PAGESTRIP_PRELOAD_OFFSET")? {
            config.preload_offset = val;
        }
        if let Some(val) = env_value("PAGESTRIP_BEST_QUALITY")? {
            config.best_quality = val;
        }
        if let Some(val) = env_value("PAGESTRIP_ANNOTATION_RENDERING")? {
            config.annotation_rendering = val;
        }

        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// Expected file format:
    /// ```toml
    /// tile_size = 256.0
    /// thumbnail_ratio = 0.3
    /// pass_budget = 120
    /// preload_offset = 20.0
    /// best_quality = false
    /// annotation_rendering = false
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&contents)
    }

    /// Parses configuration from a TOML string. Missing keys keep their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path.as_ref(), self.to_toml()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(ConfigError::InvalidValue("tile_size".to_string()));
        }
        if !(self.thumbnail_ratio.is_finite()
            && self.thumbnail_ratio > 0.0
            && self.thumbnail_ratio <= 1.0)
        {
            return Err(ConfigError::InvalidValue("thumbnail_ratio".to_string()));
        }
        if self.pass_budget == 0 {
            return Err(ConfigError::InvalidValue("pass_budget".to_string()));
        }
        if !(self.preload_offset.is_finite() && self.preload_offset >= 0.0) {
            return Err(ConfigError::InvalidValue("preload_offset".to_string()));
        }
        Ok(())
    }
}

fn env_value<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        Err(_) => Ok(None),
    }
}

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for configuration key: {0}")]
    InvalidValue(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}
