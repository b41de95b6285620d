use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::{DEFAULT_API_URL, DEFAULT_MODEL};
use crate::api::retry::DEFAULT_MAX_ATTEMPTS;

/// Environment variable that overrides the stored API key
pub const API_KEY_ENV: &str = "SKETCHBUDDY_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Chat completions endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer token for the endpoint
    #[serde(default)]
    pub api_key: Option<String>,

    /// Attempt budget for buffered requests
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Load configuration from a specific path, creating a default file
    /// there when none exists
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(path, toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Could not determine home directory")?;

        Ok(home.join(".sketchbuddy").join("config.toml"))
    }

    /// Resolve the API key, preferring the environment variable over the
    /// stored value; empty strings count as absent
    pub fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| self.api_key.clone().filter(|key| !key.is_empty()))
    }

    /// True if an API key is available from any source
    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: default_api_url(),
            model: default_model(),
            api_key: None,
            max_attempts: default_max_attempts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.api_key.is_none());
        assert_eq!(config.max_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("api_key = \"sk-test\"").unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.max_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.model = "another/model".to_string();
        config.api_key = Some("sk-test".to_string());

        let toml_string = toml::to_string(&config).unwrap();
        assert!(toml_string.contains("another/model"));

        let deserialized: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(deserialized.model, "another/model");
        assert_eq!(deserialized.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_load_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.api_key = Some("sk-round-trip".to_string());
        config.max_attempts = 5;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("sk-round-trip"));
        assert_eq!(loaded.max_attempts, 5);
    }

    // Sole test touching the key environment variable, so resolution
    // results stay deterministic under the parallel test runner
    #[test]
    fn test_api_key_resolution_order() {
        std::env::remove_var(API_KEY_ENV);

        let mut config = Config::default();
        assert!(!config.has_api_key());

        config.api_key = Some(String::new());
        assert!(config.api_key().is_none());

        config.api_key = Some("sk-stored".to_string());
        assert_eq!(config.api_key().as_deref(), Some("sk-stored"));

        std::env::set_var(API_KEY_ENV, "sk-env");
        assert_eq!(config.api_key().as_deref(), Some("sk-env"));

        std::env::set_var(API_KEY_ENV, "");
        assert_eq!(config.api_key().as_deref(), Some("sk-stored"));

        std::env::remove_var(API_KEY_ENV);
        assert_eq!(config.api_key().as_deref(), Some("sk-stored"));
    }
}
