//! Engine configuration
//!
//! Loaded from TOML or built in code:
//!
//! ```toml
//! averaging = "count_weighted"
//! serialize_writes = true
//! conditional_writes = true
//! max_rating = 5.0
//! audit_tolerance = 0.05
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tally_core::AveragingMode;
use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {reason}")]
    Invalid { reason: String },
}

/// Options controlling the consistency coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How new ratings are folded into existing averages
    pub averaging: AveragingMode,
    /// Serialize AddReview/RemoveReview per venue inside this process
    pub serialize_writes: bool,
    /// Make venue writes conditional on the version read earlier
    pub conditional_writes: bool,
    /// Upper bound of a category rating; the lower bound is 0
    pub max_rating: f64,
    /// Largest average deviation the audit tolerates in count-weighted mode
    pub audit_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            averaging: AveragingMode::Pairwise,
            serialize_writes: true,
            conditional_writes: true,
            max_rating: 5.0,
            audit_tolerance: 0.05,
        }
    }
}

impl EngineConfig {
    /// Create a config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the averaging mode
    pub fn averaging(mut self, mode: AveragingMode) -> Self {
        self.averaging = mode;
        self
    }

    /// Enable or disable per-venue write serialization
    pub fn serialize_writes(mut self, enabled: bool) -> Self {
        self.serialize_writes = enabled;
        self
    }

    /// Enable or disable conditional venue writes
    pub fn conditional_writes(mut self, enabled: bool) -> Self {
        self.conditional_writes = enabled;
        self
    }

    /// Set the maximum rating value
    pub fn max_rating(mut self, max: f64) -> Self {
        self.max_rating = max;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_rating.is_finite() || self.max_rating <= 0.0 {
            return Err(ConfigError::Invalid {
                reason: format!("max_rating must be positive, got {}", self.max_rating),
            });
        }
        if !self.audit_tolerance.is_finite() || self.audit_tolerance < 0.0 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "audit_tolerance must be non-negative, got {}",
                    self.audit_tolerance
                ),
            });
        }
        Ok(())
    }
}
