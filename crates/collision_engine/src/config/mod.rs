//! Configuration system

pub use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use crate::spatial::OctreeConfig;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

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

/// Region and tuning of the broad-phase octree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OctreeSettings {
    /// Minimum corner of the world region
    pub world_min: Vec3,
    /// Maximum corner of the world region
    pub world_max: Vec3,
    /// Subdivision tuning
    #[serde(default)]
    pub config: OctreeConfig,
}

/// Collision system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// `env_logger` filter applied by [`crate::foundation::logging::init_with_filter`]
    pub log_level: String,

    /// Re-test entities moved by resolution once more in the same tick
    pub settle_pass: bool,

    /// Broad-phase octree; `None` sweeps all pairs
    pub octree: Option<OctreeSettings>,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            settle_pass: true,
            octree: None,
        }
    }
}

impl CollisionConfig {
    /// Install the logger with this configuration's filter
    ///
    /// Returns `false` if a logger was already installed.
    pub fn init_logging(&self) -> bool {
        crate::foundation::logging::init_with_filter(&self.log_level)
    }
}

impl Config for CollisionConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_octree() -> CollisionConfig {
        CollisionConfig {
            log_level: "debug".to_string(),
            settle_pass: false,
            octree: Some(OctreeSettings {
                world_min: Vec3::new(-64.0, -8.0, -64.0),
                world_max: Vec3::new(64.0, 56.0, 64.0),
                config: OctreeConfig {
                    split_threshold: 4,
                    max_depth: 6,
                    min_radius: 2.0,
                },
            }),
        }
    }

    #[test]
    fn test_toml_round_trip() {
        let config = with_octree();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: CollisionConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_ron_round_trip() {
        let config = with_octree();
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let parsed: CollisionConfig = ron::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let parsed: CollisionConfig = toml::from_str("settle_pass = false").unwrap();
        assert_eq!(parsed.log_level, "info");
        assert!(!parsed.settle_pass);
        assert!(parsed.octree.is_none());

        let parsed: CollisionConfig = toml::from_str(
            "[octree]\nworld_min = [-1.0, -1.0, -1.0]\nworld_max = [1.0, 1.0, 1.0]\n",
        ).unwrap();
        let octree = parsed.octree.unwrap();
        assert_eq!(octree.config, OctreeConfig::default());
        assert_eq!(octree.world_max, Vec3::repeat(1.0));
    }

    #[test]
    fn test_file_round_trip_and_unsupported_format() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("collision_engine_config_{}.ron", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let config = with_octree();
        config.save_to_file(&path).unwrap();
        let loaded = CollisionConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);

        assert!(matches!(
            config.save_to_file("collision.yaml"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
