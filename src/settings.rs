//! File-backed settings. Environment overrides are applied on top of these
//! by [`crate::config::PracticeConfig::resolve`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub advisory: AdvisorySettings,
    pub interchange: InterchangeSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorySettings {
    pub enabled: bool,
    pub endpoint: String,
    pub summary_model: String,
    pub strategy_model: String,
    pub summary_temperature: f32,
    pub strategy_temperature: f32,
    pub timeout_secs: u64,
}

impl Default for AdvisorySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            summary_model: "gemini-3-flash-preview".to_string(),
            strategy_model: "gemini-3-pro-preview".to_string(),
            summary_temperature: 0.2,
            strategy_temperature: 0.5,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterchangeSettings {
    pub delimiter: String,
    pub write_bom: bool,
}

impl Default for InterchangeSettings {
    fn default() -> Self {
        Self {
            delimiter: ";".to_string(),
            write_bom: true,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            Ok(Self::default())
        }
    }
}
