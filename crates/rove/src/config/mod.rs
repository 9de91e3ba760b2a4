//! Configuration system
//!
//! Tunables are plain serde structs that can be loaded from TOML or RON
//! files. [`OctreeConfig`] carries the octree subdivision thresholds.

pub use serde::{Serialize, Deserialize};

use log::warn;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Reject values that parse but cannot be used
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Load and validate configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;

        let config: Self = if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };
        config.validate()?;
        Ok(config)
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

    /// Values that parse but cannot be used
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Subdivision thresholds for [`crate::spatial::Octree`]
///
/// A node stops subdividing when it holds fewer than
/// `leaf_items_threshold` items, or when the squared length of its
/// diagonal drops below `min_subcluster_diagonal_sq`. The two conditions
/// are independent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Item count below which a node becomes a leaf
    pub leaf_items_threshold: usize,

    /// Squared diagonal length below which a node becomes a leaf
    pub min_subcluster_diagonal_sq: f32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            leaf_items_threshold: 8,
            min_subcluster_diagonal_sq: 1.0,
        }
    }
}

impl Config for OctreeConfig {
    /// Check that both thresholds are usable
    fn validate(&self) -> Result<(), ConfigError> {
        if self.leaf_items_threshold == 0 {
            warn!("leaf_items_threshold of 0 behaves like 1");
        }
        if !self.min_subcluster_diagonal_sq.is_finite() || self.min_subcluster_diagonal_sq < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_subcluster_diagonal_sq must be finite and non-negative, got {}",
                self.min_subcluster_diagonal_sq
            )));
        }
        Ok(())
    }
}

impl OctreeConfig {
    /// Create a config from both thresholds
    pub const fn new(leaf_items_threshold: usize, min_subcluster_diagonal_sq: f32) -> Self {
        Self {
            leaf_items_threshold,
            min_subcluster_diagonal_sq,
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a RON document
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
