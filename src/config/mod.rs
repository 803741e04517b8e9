//! Configuration management for the Tornado client
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use tornado::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Talking to: {}", config.api.base_url);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `TORNADO__<section>__<key>`
//!
//! Examples:
//! - `TORNADO__API__BASE_URL=http://localhost:9000`
//! - `TORNADO__POLL__INTERVAL=10s`
//! - `TORNADO__WEBHOOK__EVENT=failed`
//!
//! The API key is only ever read from `TORNADO_API_KEY`.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/tornado.toml`.
//! This can be overridden using the `TORNADO_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{ApiConfig, Config, PollConfig, TelemetryConfig, WebhookConfig};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Missing API key: set TORNADO_API_KEY")]
    MissingApiKey,
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// API key required by every outbound call
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[api]\nbase_url = \"http://127.0.0.1:3000\"\n").unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:3000");
    }

    #[test]
    fn test_validation_catches_bad_interval() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[poll]\ninterval = \"0s\"\n").unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::ZeroPollInterval)
        ));
    }

    #[test]
    fn test_malformed_duration_is_load_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[poll]\ntimeout = \"ten minutes\"\n").unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(result.unwrap_err(), ConfigError::LoadError(_)));
    }

    #[test]
    fn test_api_key_required() {
        let mut config = Config::default();
        assert!(matches!(config.api_key(), Err(ConfigError::MissingApiKey)));

        config.api.api_key = Some("sk_test".to_string());
        assert_eq!(config.api_key().unwrap(), "sk_test");
    }
}
