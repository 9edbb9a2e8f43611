//! Engine configuration
//!
//! All tunable engine behavior lives here: world bounds, spatial partition
//! thresholds, and protocol buffer sizing. Configs are plain serde structs
//! loadable from TOML or RON through the [`Config`] trait.

use serde::{Serialize, Deserialize};

use crate::foundation::math::Vec2;

/// Configuration trait for file-backed settings
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

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
            ron::ser::to_string_pretty(self, Default::default())
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

/// Spatial partition tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Maximum bodies per leaf before subdivision
    pub max_bodies_per_node: usize,

    /// Maximum subdivision depth
    pub max_depth: u32,

    /// Minimum node size (prevents excessive subdivision)
    pub min_node_size: f32,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            max_bodies_per_node: 8,
            max_depth: 8,
            min_node_size: 1.0,
        }
    }
}

/// Physics subsystem configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Half-size of the simulated world, centered on the origin
    pub world_extent: (f32, f32),

    /// Spatial partition tuning
    pub partition: PartitionConfig,
}

impl PhysicsConfig {
    /// World half-extents as a vector
    pub fn world_extents(&self) -> Vec2 {
        Vec2::new(self.world_extent.0, self.world_extent.1)
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            world_extent: (1024.0, 1024.0),
            partition: PartitionConfig::default(),
        }
    }
}

/// Protocol subsystem configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Initial capacity of outbound wire buffers in bytes
    pub initial_buffer_capacity: usize,

    /// Grace period for connection state changes, in seconds
    pub connection_grace_seconds: f32,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            initial_buffer_capacity: 512,
            connection_grace_seconds: 5.0,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Physics subsystem settings
    pub physics: PhysicsConfig,

    /// Protocol subsystem settings
    pub protocol: ProtocolConfig,
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roundtrips_through_toml() {
        let config = EngineConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: EngineConfig = toml::from_str(&text).unwrap();

        assert_eq!(back.physics.partition.max_depth, config.physics.partition.max_depth);
        assert_eq!(back.protocol.initial_buffer_capacity, config.protocol.initial_buffer_capacity);
    }

    #[test]
    fn test_unsupported_format_rejected() {
        let config = EngineConfig::default();
        assert!(matches!(
            config.save_to_file("settings.yaml"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
