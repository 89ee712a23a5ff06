//! Error types for the domain layer.

use std::fmt;

use thiserror::Error;

/// Errors raised while parsing domain values or moving between steps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Unsupported language '{0}'")]
    UnsupportedLanguage(String),
}

impl ValidationError {
    pub fn invalid_transition(from: impl fmt::Debug, to: impl fmt::Debug) -> Self {
        ValidationError::InvalidTransition {
            from: format!("{:?}", from),
            to: format!("{:?}", to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_error_names_both_steps() {
        #[derive(Debug)]
        enum Step {
            ApplyEdit,
            Done,
        }

        let err = ValidationError::invalid_transition(Step::Done, Step::ApplyEdit);

        assert_eq!(err.to_string(), "Cannot transition from Done to ApplyEdit");
    }

    #[test]
    fn unsupported_language_quotes_the_input() {
        let err = ValidationError::UnsupportedLanguage("xx".into());
        assert_eq!(err.to_string(), "Unsupported language 'xx'");
    }
}
