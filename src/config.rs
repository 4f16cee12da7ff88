use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{Result, RetrievalError};
use crate::retrieval::{BatchConfig, RetrievalConfig};

/// File-level configuration for the command line
///
/// The library only takes the structured `RetrievalConfig` and
/// `BatchConfig`; this wrapper reads and writes them as TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    /// when no file exists
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            return Ok(Config::default());
        }
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`; missing sections use defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents).map_err(|e| {
            RetrievalError::ConfigError(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::config_path()?)
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_string = self.to_toml()?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| RetrievalError::ConfigError(format!("Failed to serialize config: {}", e)))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| {
            RetrievalError::ConfigError("Could not determine home directory".to_string())
        })?;

        Ok(home.join(".subgraph-retriever").join("config.toml"))
    }
}
