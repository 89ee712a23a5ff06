//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PBL_PLANNER` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use pbl_planner::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Generation provider: {:?}", config.generation.provider);
//! ```

mod error;
mod generation;
mod logging;
mod pipeline;
mod storage;

pub use error::{ConfigError, ConfigValidationError};
pub use generation::{GenerationConfig, GenerationProvider};
pub use logging::{LogFormat, LoggingConfig};
pub use pipeline::PipelineConfig;
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields an offline
/// configuration (mock generation, in-memory storage).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Generation service (provider, credentials, timeouts)
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Conversation pipeline tunables
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Document storage backend
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log filter and output format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PBL_PLANNER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PBL_PLANNER__GENERATION__PROVIDER=anthropic` -> `generation.provider = anthropic`
    /// - `PBL_PLANNER__STORAGE__DATA_DIR=...` -> `storage.data_dir = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PBL_PLANNER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` for the first invalid section. A
    /// missing API key for the Anthropic provider is reported here.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.generation.validate()?;
        self.pipeline.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Language;
    use std::env;
    use std::path::PathBuf;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "PBL_PLANNER__GENERATION__PROVIDER",
        "PBL_PLANNER__GENERATION__API_KEY",
        "PBL_PLANNER__PIPELINE__OPTION_COUNT",
        "PBL_PLANNER__PIPELINE__DEFAULT_LANGUAGE",
        "PBL_PLANNER__STORAGE__BACKEND",
        "PBL_PLANNER__STORAGE__DATA_DIR",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_empty_environment_is_offline_default() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        let config = result.unwrap();
        assert_eq!(config.generation.provider, GenerationProvider::Mock);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.pipeline.option_count, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_nested_values() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PBL_PLANNER__PIPELINE__OPTION_COUNT", "4");
        env::set_var("PBL_PLANNER__PIPELINE__DEFAULT_LANGUAGE", "es");
        env::set_var("PBL_PLANNER__STORAGE__BACKEND", "file");
        env::set_var("PBL_PLANNER__STORAGE__DATA_DIR", "/tmp/pbl-docs");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.pipeline.option_count, 4);
        assert_eq!(config.pipeline.default_language, Language::Spanish);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/pbl-docs"));
    }

    #[test]
    fn test_anthropic_without_key_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PBL_PLANNER__GENERATION__PROVIDER", "anthropic");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::MissingRequired("GENERATION__API_KEY"))
        );
    }

    #[test]
    fn test_anthropic_with_key_validates() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PBL_PLANNER__GENERATION__PROVIDER", "anthropic");
        env::set_var("PBL_PLANNER__GENERATION__API_KEY", "sk-ant-xxx");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.validate().is_ok());
        assert!(config.generation.anthropic().is_some());
    }
}
