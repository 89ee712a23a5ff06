//! Conversation graph errors.

use thiserror::Error;

use super::ConversationStep;
use crate::domain::foundation::{ThreadId, ValidationError};

/// Errors raised by the conversation graph itself.
///
/// Step failures never appear here; steps substitute fallbacks instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversationError {
    #[error("Invalid step transition: {0}")]
    InvalidTransition(#[from] ValidationError),

    #[error("Thread {thread_id} is not suspended (current step: {step})")]
    NotSuspended {
        thread_id: ThreadId,
        step: ConversationStep,
    },

    #[error("Run exceeded the budget of {limit} steps")]
    StepBudgetExceeded { limit: usize },
}

impl ConversationError {
    pub fn not_suspended(thread_id: ThreadId, step: ConversationStep) -> Self {
        ConversationError::NotSuspended { thread_id, step }
    }
}
