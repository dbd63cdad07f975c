//! Cache configuration.
//!
//! Capacities can be loaded from a TOML file, from environment variables, or
//! built programmatically.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Number of rendered parts kept across the active and passive sets.
pub const DEFAULT_PART_CAPACITY: usize = 120;

/// Number of whole-page thumbnails kept.
pub const DEFAULT_THUMBNAIL_CAPACITY: usize = 8;

/// Configuration for the part cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached page parts
    pub part_capacity: usize,
    /// Maximum number of cached thumbnails
    pub thumbnail_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            part_capacity: DEFAULT_PART_CAPACITY,
            thumbnail_capacity: DEFAULT_THUMBNAIL_CAPACITY,
        }
    }
}

impl CacheConfig {
    pub fn new(part_capacity: usize, thumbnail_capacity: usize) -> Self {
        Self {
            part_capacity,
            thumbnail_capacity,
        }
    }

    pub fn with_part_capacity(mut self, capacity: usize) -> Self {
        self.part_capacity = capacity;
        self
    }

    pub fn with_thumbnail_capacity(mut self, capacity: usize) -> Self {
        self.thumbnail_capacity = capacity;
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PAGESTRIP_CACHE_PARTS`: part capacity (default: 120)
    /// - `PAGESTRIP_CACHE_THUMBNAILS`: thumbnail capacity (default: 8)
    ///
    /// # Errors
    /// Returns an error if any variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("PAGESTRIP_CACHE_PARTS") {
            config.part_capacity = val
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidValue("PAGESTRIP_CACHE_PARTS".to_string()))?;
        }

        if let Ok(val) = std::env::var("PAGESTRIP_CACHE_THUMBNAILS") {
            config.thumbnail_capacity = val.parse::<usize>().map_err(|_| {
                ConfigError::InvalidValue("PAGESTRIP_CACHE_THUMBNAILS".to_string())
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// Expected file format:
    /// ```toml
    /// part_capacity = 120
    /// thumbnail_capacity = 8
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

    /// Rejects capacities that would make the cache unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.part_capacity == 0 {
            return Err(ConfigError::InvalidValue("part_capacity".to_string()));
        }
        Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.part_capacity, 120);
        assert_eq!(config.thumbnail_capacity, 8);
    }

    #[test]
    fn test_builder_methods() {
        let config = CacheConfig::default()
            .with_part_capacity(64)
            .with_thumbnail_capacity(4);
        assert_eq!(config, CacheConfig::new(64, 4));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        let _guard = EnvGuard::new(&["PAGESTRIP_CACHE_PARTS", "PAGESTRIP_CACHE_THUMBNAILS"]);

        env::set_var("PAGESTRIP_CACHE_PARTS", "200");
        env::set_var("PAGESTRIP_CACHE_THUMBNAILS", "16");

        let config = CacheConfig::from_env().unwrap();
        assert_eq!(config.part_capacity, 200);
        assert_eq!(config.thumbnail_capacity, 16);
    }

    #[test]
    #[serial]
    fn test_from_env_partial() {
        let _guard = EnvGuard::new(&["PAGESTRIP_CACHE_PARTS", "PAGESTRIP_CACHE_THUMBNAILS"]);

        env::remove_var("PAGESTRIP_CACHE_THUMBNAILS");
        env::set_var("PAGESTRIP_CACHE_PARTS", "32");

        let config = CacheConfig::from_env().unwrap();
        assert_eq!(config.part_capacity, 32);
        assert_eq!(config.thumbnail_capacity, 8);
    }

    #[test]
    #[serial]
    fn test_from_env_invalid() {
        let _guard = EnvGuard::new(&["PAGESTRIP_CACHE_PARTS"]);

        env::set_var("PAGESTRIP_CACHE_PARTS", "lots");
        assert!(matches!(
            CacheConfig::from_env(),
            Err(ConfigError::InvalidValue(key)) if key == "PAGESTRIP_CACHE_PARTS"
        ));

        env::set_var("PAGESTRIP_CACHE_PARTS", "0");
        assert!(CacheConfig::from_env().is_err());
    }

    // Saves and restores environment variables around a test.
    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new(var_names: &[&str]) -> Self {
            let vars = var_names
                .iter()
                .map(|name| (name.to_string(), env::var(name).ok()))
                .collect();
            Self { vars }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (name, value) in &self.vars {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    #[test]
    fn test_from_toml_partial() {
        let config = CacheConfig::from_toml("thumbnail_capacity = 2\n").unwrap();
        assert_eq!(config.thumbnail_capacity, 2);
        assert_eq!(config.part_capacity, 120);
    }

    #[test]
    fn test_from_toml_rejects_bad_types() {
        assert!(matches!(
            CacheConfig::from_toml("part_capacity = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_file_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.toml");

        let config = CacheConfig::new(48, 3);
        config.save_to_file(&path).unwrap();

        let loaded = CacheConfig::from_file(&path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            CacheConfig::from_file(dir.path().join("absent.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
