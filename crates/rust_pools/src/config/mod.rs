//! Configuration system
//!
//! Pool tuning lives in [`PoolSettings`], which can be loaded from or saved to
//! TOML and RON files through the [`Config`] trait.

pub use serde::{Serialize, Deserialize};

/// Capacity reserved for each new free list.
pub const DEFAULT_INITIAL_CAPACITY: usize = 32;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_str_with_format(&contents, path)
    }

    /// Parse configuration text, picking the format from the path extension
    fn from_str_with_format(contents: &str, path: &str) -> Result<Self, ConfigError> {
        if path.ends_with(".toml") {
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Serialize configuration, picking the format from the path extension
    fn to_string_with_format(&self, path: &str) -> Result<String, ConfigError> {
        if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = self.to_string_with_format(path)?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Tuning shared by every pool kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Capacity reserved for each free list when its pool is created
    pub initial_capacity: usize,

    /// Instances the shared registry creates up front when it lazily
    /// creates the pool for a new prototype
    pub registry_prewarm: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            registry_prewarm: 0,
        }
    }
}

impl Config for PoolSettings {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = PoolSettings::default();
        assert_eq!(settings.initial_capacity, 32);
        assert_eq!(settings.registry_prewarm, 0);
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = PoolSettings {
            initial_capacity: 8,
            registry_prewarm: 2,
        };

        let text = settings.to_string_with_format("pools.toml").unwrap();
        let parsed = PoolSettings::from_str_with_format(&text, "pools.toml").unwrap();

        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_ron_missing_fields_use_defaults() {
        let parsed = PoolSettings::from_str_with_format("(registry_prewarm: 4)", "pools.ron").unwrap();

        assert_eq!(parsed.initial_capacity, DEFAULT_INITIAL_CAPACITY);
        assert_eq!(parsed.registry_prewarm, 4);
    }

    #[test]
    fn test_unsupported_format() {
        let result = PoolSettings::from_str_with_format("", "pools.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("rust_pools_settings_{}.toml", std::process::id()));
        let path = path.to_string_lossy().into_owned();
        let settings = PoolSettings {
            initial_capacity: 64,
            registry_prewarm: 1,
        };

        settings.save_to_file(&path).unwrap();
        let loaded = PoolSettings::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, settings);
    }
}
