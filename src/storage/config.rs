//! Configuration handling for the node manager
//!
//! Configuration is read from `manu.toml` in the working directory (local)
//! and `~/.config/manu-node/config.toml` (global). Command-line flags take
//! precedence over both.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::json::DEFAULT_FILE_NAME;

/// Name of the local configuration file
pub const LOCAL_CONFIG_FILE: &str = "manu.toml";

/// Data directory used when none is configured
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Settings for the working directory (`manu.toml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Directory holding the node file
    pub data_dir: PathBuf,

    /// Name of the node file inside `data_dir`
    pub file_name: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Colored terminal output
    pub color: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_format: OutputFormat::Text,
            color: true,
        }
    }
}

/// Combined configuration (global + local)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub local: LocalConfig,
    pub global: GlobalConfig,
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine working directory")?;
        Ok(Self {
            local: Self::load_local(&cwd)?,
            global: Self::load_global()?,
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "manu", "manu-node").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads `manu.toml` from `dir`, falling back to defaults
    pub fn load_local(dir: &Path) -> Result<LocalConfig> {
        let config_path = dir.join(LOCAL_CONFIG_FILE);

        if !config_path.exists() {
            return Ok(LocalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

        let config: LocalConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse local config")?;

        config.validate()?;
        Ok(config)
    }

    /// Resolves the data directory, letting `override_dir` win
    pub fn data_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        override_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.local.data_dir.clone())
    }

    /// Returns the node file name
    pub fn file_name(&self) -> &str {
        &self.local.file_name
    }
}

impl LocalConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let name = Path::new(&self.file_name);
        if self.file_name.trim().is_empty() || name.components().count() != 1 {
            return Err(ConfigError::Invalid(format!(
                "file_name must be a plain file name, got '{}'",
                self.file_name
            )));
        }
        Ok(())
    }
}
