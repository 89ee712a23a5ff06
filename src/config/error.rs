//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ConfigValidationError),

    #[error("Logging initialization failed: {0}")]
    Logging(String),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid generation timeout")]
    InvalidTimeout,

    #[error("Invalid generation base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Option count must be between 1 and {max}")]
    InvalidOptionCount { max: usize },

    #[error("Step budget must be at least {min}")]
    StepBudgetTooSmall { min: usize },

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}
