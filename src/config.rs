//! Configuration: global settings plus the rule list
//!
//! Read from:
//! - `.fieldsense.yaml` / `.fieldsense.yml` (project-level, hidden)
//! - `fieldsense.yaml` / `fieldsense.json` (project-level)
//!
//! ```yaml
//! settings:
//!   max_suggestions: 20
//!   case_sensitive: false
//!
//! rules:
//!   - field: Exercises
//!     multi_select: true
//!     options:
//!       - "hiking: number | km, mi"
//!       - "running: number | km"
//!       - "yoga|Stretching|🧘"
//!   - field: Mood
//!     value:
//!       type: enum
//!       values: [happy, sad]
//! ```

use crate::context::DEFAULT_DELIMITER;
use crate::rules::Rule;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Global settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minimum typed query length before suggestions appear
    pub min_query_length: usize,

    /// Maximum suggestions returned
    pub max_suggestions: usize,

    /// Case-sensitive query filtering
    pub case_sensitive: bool,

    /// Indent inserted keys one step under their parent
    pub auto_indent: bool,

    /// Debounce delay before a line is re-validated
    pub validation_delay_ms: u64,

    /// Enable value validation
    pub validate: bool,

    /// Block delimiter line
    pub delimiter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_query_length: 0,
            max_suggestions: 20,
            case_sensitive: false,
            auto_indent: true,
            validation_delay_ms: 500,
            validate: true,
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub settings: Settings,
    pub rules: Vec<Rule>,
}

impl Config {
    /// Default config file names, in lookup order
    pub const FILE_NAMES: [&'static str; 4] = [
        ".fieldsense.yaml",
        ".fieldsense.yml",
        "fieldsense.yaml",
        "fieldsense.json",
    ];

    /// Load configuration from a YAML or JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;

        let config: Config = if path.extension().map_or(false, |e| e == "json") {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations in `dir`
    pub fn load_default(dir: &Path) -> Self {
        match Self::find(dir) {
            Some(path) => match Self::load(&path) {
                Ok(config) => {
                    log::debug!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Ignoring {}: {}", path.display(), e);
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    /// First existing default config file in `dir`
    pub fn find(dir: &Path) -> Option<PathBuf> {
        Self::FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.exists())
    }

    /// Check structural consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settings.max_suggestions == 0 {
            return Err(ConfigError::Invalid(
                "settings.max_suggestions must be greater than 0".to_string(),
            ));
        }

        if self.settings.delimiter.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "settings.delimiter must not be empty".to_string(),
            ));
        }

        for rule in &self.rules {
            if crate::rules::depth(&rule.declared_path()) == 0 {
                return Err(ConfigError::Invalid(format!(
                    "rule '{}' has an empty field path",
                    rule.id
                )));
            }
        }

        Ok(())
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
