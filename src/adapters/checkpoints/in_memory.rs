//! In-memory checkpoint store.
//!
//! Checkpoints live only as long as the process, which is all a suspended
//! conversation needs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::conversation::ConversationState;
use crate::domain::foundation::ThreadId;
use crate::ports::{CheckpointError, CheckpointStore};

/// In-memory implementation of CheckpointStore.
#[derive(Clone)]
pub struct InMemoryCheckpointStore {
    states: Arc<RwLock<HashMap<ThreadId, ConversationState>>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self {
            states: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clears all checkpoints (useful for tests).
    pub async fn clear(&self) {
        self.states.write().await.clear();
    }

    /// Returns the number of saved checkpoints.
    pub async fn checkpoint_count(&self) -> usize {
        self.states.read().await.len()
    }
}

impl Default for InMemoryCheckpointStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn save(&self, state: &ConversationState) -> Result<(), CheckpointError> {
        self.states
            .write()
            .await
            .insert(state.thread_id(), state.clone());
        Ok(())
    }

    async fn load(
        &self,
        thread_id: ThreadId,
    ) -> Result<Option<ConversationState>, CheckpointError> {
        Ok(self.states.read().await.get(&thread_id).cloned())
    }

    async fn remove(&self, thread_id: ThreadId) -> Result<(), CheckpointError> {
        self.states.write().await.remove(&thread_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Language, SessionId};

    fn state(thread_id: ThreadId) -> ConversationState {
        ConversationState::new(
            thread_id,
            SessionId::new(),
            Language::French,
            "",
            "projet sur l'eau".into(),
        )
    }

    #[tokio::test]
    async fn save_then_load_returns_same_state() {
        let store = InMemoryCheckpointStore::new();
        let thread_id = ThreadId::new();
        let saved = state(thread_id);

        store.save(&saved).await.unwrap();

        assert_eq!(store.load(thread_id).await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn save_replaces_previous_checkpoint() {
        let store = InMemoryCheckpointStore::new();
        let thread_id = ThreadId::new();
        store.save(&state(thread_id)).await.unwrap();
        let newer = state(thread_id);

        store.save(&newer).await.unwrap();

        assert_eq!(store.checkpoint_count().await, 1);
        assert_eq!(store.load(thread_id).await.unwrap(), Some(newer));
    }

    #[tokio::test]
    async fn remove_forgets_thread() {
        let store = InMemoryCheckpointStore::new();
        let thread_id = ThreadId::new();
        store.save(&state(thread_id)).await.unwrap();

        store.remove(thread_id).await.unwrap();

        assert!(store.load(thread_id).await.unwrap().is_none());
    }
}
