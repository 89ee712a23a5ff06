//! Checkpoint Store Port - Conversation state between runs.
//!
//! A checkpoint holds a suspended thread's state until its next message.
//! No durability beyond the process lifetime is required.

use async_trait::async_trait;

use crate::domain::conversation::ConversationState;
use crate::domain::foundation::ThreadId;

/// Errors that can occur during checkpoint operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CheckpointError {
    #[error("Checkpoint store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to serialize checkpoint: {0}")]
    Serialization(String),
}

/// Port for saving and loading checkpoints by thread.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Saves (or replaces) the checkpoint for the state's thread.
    async fn save(&self, state: &ConversationState) -> Result<(), CheckpointError>;

    /// Loads the checkpoint for `thread_id`, if any.
    async fn load(&self, thread_id: ThreadId) -> Result<Option<ConversationState>, CheckpointError>;

    /// Drops the checkpoint for `thread_id`.
    async fn remove(&self, thread_id: ThreadId) -> Result<(), CheckpointError>;
}
