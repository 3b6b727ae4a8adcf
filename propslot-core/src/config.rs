//! Engine configuration (`propslot.yml`)

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// First record type registered when the engine starts
    #[serde(default = "default_record_type")]
    pub record_type: String,

    /// Host location of the active record
    #[serde(default = "default_active_attr")]
    pub active_attr: String,

    /// Log coercion fallbacks at WARN instead of DEBUG
    #[serde(default = "default_true")]
    pub warn_on_fallback: bool,

    #[serde(default = "default_true")]
    pub allow_pass_through: bool,
}

fn default_record_type() -> String {
    String::from("PyCustomProperty")
}

fn default_active_attr() -> String {
    String::from("custom_props")
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            record_type: default_record_type(),
            active_attr: default_active_attr(),
            warn_on_fallback: true,
            allow_pass_through: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        // An empty document means "all defaults"
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: EngineConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("record_type", &self.record_type),
            ("active_attr", &self.active_attr),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}
