//! Configuration types and loading for chatrospect.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::error::Result;

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Metrics engine settings.
    pub analysis: AnalysisConfig,

    /// HTTP API settings.
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from the default config file, layered with
    /// `CHATROSPECT_*` environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_config_path())
    }

    /// Load configuration from a specific file, layered with environment
    /// overrides. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let path = Self::expand_path(&path.to_string_lossy());
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(&crate::env_prefix())
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("analysis.extra_stop_words"),
            )
            .build()?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?;
        config.analysis.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::APP_NAME)
            .join("config.toml")
    }

    /// Save configuration to a specific file path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Ensure config exists at the given path, creating defaults if missing.
    pub fn ensure_at(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_path(path)
        } else {
            let config = Self::default();
            config.save_to_path(path)?;
            Self::load_from_path(path)
        }
    }

    /// Expand a path, replacing ~ with home directory.
    pub fn expand_path(path: &str) -> PathBuf {
        let expanded = shellexpand::full(path)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| path.to_string());
        PathBuf::from(expanded)
    }
}

/// Tunables for the metrics engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of ranked words kept per participant.
    pub top_words: usize,

    /// Number of ranked emojis kept per participant.
    pub top_emojis: usize,

    /// Silence longer than this (in hours) is reported as ghosting.
    pub ghosting_threshold_hours: u32,

    /// Words filtered in addition to the built-in stop-word list.
    pub extra_stop_words: Vec<String>,

    /// Rule-based transcript parser settings.
    pub normalizer: NormalizerConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_words: 7,
            top_emojis: 7,
            ghosting_threshold_hours: 72,
            extra_stop_words: Vec::new(),
            normalizer: NormalizerConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Reject settings the engine cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.top_words == 0 {
            return Err(Error::Config("top_words must be at least 1".to_string()));
        }
        if self.top_emojis == 0 {
            return Err(Error::Config("top_emojis must be at least 1".to_string()));
        }
        if self.ghosting_threshold_hours == 0 {
            return Err(Error::Config(
                "ghosting_threshold_hours must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Ghosting threshold as a duration.
    pub fn ghosting_threshold(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.ghosting_threshold_hours))
    }
}

/// Settings for the plain-text transcript parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Read ambiguous numeric dates (`1/2/24`) as day/month instead of month/day.
    pub day_first: bool,
}

/// HTTP API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Port to listen on.
    pub port: u16,

    /// Maximum accepted request body size.
    pub max_body_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            max_body_bytes: 5 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
