//! Conversation pipeline configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ConfigValidationError;
use crate::application::PipelineSettings;
use crate::domain::foundation::Language;

/// Ordinal words are recognized up to this many options.
const MAX_OPTIONS: usize = 5;

/// Steps needed to get from a fresh thread to its first suspension.
const MIN_STEPS_PER_RUN: usize = 6;

/// Conversation pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Minimum gap between streamed emissions, in milliseconds
    #[serde(default = "default_debounce")]
    pub stream_debounce_ms: u64,

    /// Number of project options generated
    #[serde(default = "default_option_count")]
    pub option_count: usize,

    /// Language for new threads
    #[serde(default)]
    pub default_language: Language,

    /// Upper bound on steps one message may drive
    #[serde(default = "default_max_steps")]
    pub max_steps_per_run: usize,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.option_count == 0 || self.option_count > MAX_OPTIONS {
            return Err(ConfigValidationError::InvalidOptionCount { max: MAX_OPTIONS });
        }
        if self.max_steps_per_run < MIN_STEPS_PER_RUN {
            return Err(ConfigValidationError::StepBudgetTooSmall {
                min: MIN_STEPS_PER_RUN,
            });
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stream_debounce_ms: default_debounce(),
            option_count: default_option_count(),
            default_language: Language::default(),
            max_steps_per_run: default_max_steps(),
        }
    }
}

impl From<&PipelineConfig> for PipelineSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            stream_debounce: Duration::from_millis(config.stream_debounce_ms),
            option_count: config.option_count,
            max_steps_per_run: config.max_steps_per_run,
        }
    }
}

fn default_debounce() -> u64 {
    10
}

fn default_option_count() -> usize {
    3
}

fn default_max_steps() -> usize {
    16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pipeline_settings() {
        let settings = PipelineSettings::from(&PipelineConfig::default());
        assert_eq!(settings, PipelineSettings::default());
    }

    #[test]
    fn test_option_count_bounds() {
        for option_count in [0, 6] {
            let config = PipelineConfig {
                option_count,
                ..Default::default()
            };
            assert_eq!(
                config.validate(),
                Err(ConfigValidationError::InvalidOptionCount { max: 5 })
            );
        }
    }

    #[test]
    fn test_step_budget_minimum() {
        let config = PipelineConfig {
            max_steps_per_run: 3,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
