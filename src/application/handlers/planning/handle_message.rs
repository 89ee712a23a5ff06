//! SessionRunner - Maps `(thread, message)` onto a fresh or resumed
//! conversation and drives it to the next stopping point.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::application::emitter::Emitter;
use crate::application::graph::ConversationGraph;
use crate::application::steps::StepContext;
use crate::domain::conversation::{
    ConversationError, ConversationState, ConversationStep, RunOutcome,
};
use crate::domain::foundation::{Language, SessionId, ThreadId};
use crate::domain::planning::UserInput;
use crate::ports::{CheckpointError, CheckpointStore};

/// Command carrying one inbound message for a thread.
#[derive(Debug, Clone)]
pub struct HandleMessageCommand {
    pub thread_id: ThreadId,
    /// Session for a brand-new thread. Ignored when resuming.
    pub session_id: Option<SessionId>,
    pub input: UserInput,
    pub language: Language,
    pub class_profile: String,
}

impl HandleMessageCommand {
    pub fn new(thread_id: ThreadId, input: impl Into<UserInput>) -> Self {
        Self {
            thread_id,
            session_id: None,
            input: input.into(),
            language: Language::default(),
            class_profile: String::new(),
        }
    }

    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_class_profile(mut self, class_profile: impl Into<String>) -> Self {
        self.class_profile = class_profile.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HandleMessageError {
    #[error(transparent)]
    Conversation(#[from] ConversationError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}

/// Handler for inbound conversation messages.
///
/// Messages for the same thread are processed one at a time; distinct
/// threads run concurrently. A per-thread lock lives only while some
/// message for that thread is in flight. Finished threads drop their
/// checkpoint and leave only their id behind.
pub struct SessionRunner {
    graph: ConversationGraph,
    checkpoints: Arc<dyn CheckpointStore>,
    thread_locks: Mutex<HashMap<ThreadId, Arc<Mutex<()>>>>,
    finished: Mutex<HashSet<ThreadId>>,
}

impl SessionRunner {
    pub fn new(ctx: StepContext, checkpoints: Arc<dyn CheckpointStore>) -> Self {
        Self {
            graph: ConversationGraph::new(ctx),
            checkpoints,
            thread_locks: Mutex::new(HashMap::new()),
            finished: Mutex::new(HashSet::new()),
        }
    }

    async fn thread_lock(&self, thread_id: ThreadId) -> Arc<Mutex<()>> {
        self.thread_locks
            .lock()
            .await
            .entry(thread_id)
            .or_default()
            .clone()
    }

    /// Drops the map entry when `lock` is held only by the map and the caller.
    async fn release_lock(&self, thread_id: ThreadId, lock: Arc<Mutex<()>>) {
        let mut locks = self.thread_locks.lock().await;
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&thread_id);
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleMessageCommand,
        emit: &Emitter,
    ) -> Result<RunOutcome, HandleMessageError> {
        let thread_id = cmd.thread_id;
        let lock = self.thread_lock(thread_id).await;
        let outcome = {
            let _guard = lock.lock().await;
            self.handle_locked(cmd, emit).await
        };
        self.release_lock(thread_id, lock).await;
        outcome
    }

    async fn handle_locked(
        &self,
        cmd: HandleMessageCommand,
        emit: &Emitter,
    ) -> Result<RunOutcome, HandleMessageError> {
        let thread_id = cmd.thread_id;
        if self.finished.lock().await.contains(&thread_id) {
            return Err(ConversationError::not_suspended(thread_id, ConversationStep::Done).into());
        }

        // 1. Resume the suspended thread or start a new one
        let mut state = match self.checkpoints.load(cmd.thread_id).await? {
            Some(mut state) => {
                debug!(thread_id = %cmd.thread_id, step = %state.step(), "resuming thread");
                state.resume_with(cmd.input)?;
                state
            }
            None => {
                info!(thread_id = %cmd.thread_id, language = %cmd.language, "starting thread");
                ConversationState::new(
                    cmd.thread_id,
                    cmd.session_id.unwrap_or_default(),
                    cmd.language,
                    cmd.class_profile,
                    cmd.input,
                )
            }
        };

        // 2. Drive to the next suspend point or to completion
        let outcome = self.graph.run(&mut state, emit).await?;

        // 3. Checkpoint a suspended thread, retire a finished one
        if outcome.is_done() {
            self.checkpoints.remove(thread_id).await?;
            self.finished.lock().await.insert(thread_id);
            debug!(thread_id = %thread_id, "thread finished; checkpoint dropped");
        } else {
            self.checkpoints.save(&state).await?;
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryCheckpointStore, InMemoryDocumentStore, MockGenerationClient};
    use crate::application::steps::test_support::context;

    fn runner(checkpoints: InMemoryCheckpointStore) -> SessionRunner {
        let ctx = context(MockGenerationClient::demo(), InMemoryDocumentStore::new());
        SessionRunner::new(ctx, Arc::new(checkpoints))
    }

    #[tokio::test]
    async fn first_message_starts_and_checkpoints_thread() {
        let checkpoints = InMemoryCheckpointStore::new();
        let runner = runner(checkpoints.clone());
        let thread_id = ThreadId::new();
        let (emit, _rx) = Emitter::channel();

        let outcome = runner
            .handle(HandleMessageCommand::new(thread_id, "solar system, grade 5, 2 weeks"), &emit)
            .await
            .unwrap();

        assert!(outcome.is_suspended());
        let saved = checkpoints.load(thread_id).await.unwrap().unwrap();
        assert_eq!(saved.step(), ConversationStep::AwaitSelection);
    }

    #[tokio::test]
    async fn second_message_resumes_to_done() {
        let runner = runner(InMemoryCheckpointStore::new());
        let thread_id = ThreadId::new();
        let (emit, _rx) = Emitter::channel();
        runner
            .handle(HandleMessageCommand::new(thread_id, "solar system, grade 5, 2 weeks"), &emit)
            .await
            .unwrap();

        let outcome = runner
            .handle(HandleMessageCommand::new(thread_id, "3"), &emit)
            .await
            .unwrap();

        assert!(outcome.is_done());
        assert_eq!(outcome.thread_id(), thread_id);
    }

    #[tokio::test]
    async fn message_after_done_is_rejected() {
        let runner = runner(InMemoryCheckpointStore::new());
        let thread_id = ThreadId::new();
        let (emit, _rx) = Emitter::channel();
        for message in ["solar system, grade 5, 2 weeks", "1"] {
            runner
                .handle(HandleMessageCommand::new(thread_id, message), &emit)
                .await
                .unwrap();
        }

        let err = runner
            .handle(HandleMessageCommand::new(thread_id, "again"), &emit)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            HandleMessageError::Conversation(ConversationError::NotSuspended { .. })
        ));
    }

    #[tokio::test]
    async fn finished_thread_releases_lock_and_checkpoint() {
        let checkpoints = InMemoryCheckpointStore::new();
        let runner = runner(checkpoints.clone());
        let (done, open) = (ThreadId::new(), ThreadId::new());
        let (emit, _rx) = Emitter::channel();
        for (thread_id, message) in [
            (done, "solar system, grade 5, 2 weeks"),
            (done, "2"),
            (open, "solar system, grade 5, 2 weeks"),
        ] {
            runner
                .handle(HandleMessageCommand::new(thread_id, message), &emit)
                .await
                .unwrap();
        }

        assert!(runner.thread_locks.lock().await.is_empty());
        assert_eq!(checkpoints.checkpoint_count().await, 1);
        assert!(checkpoints.load(done).await.unwrap().is_none());
        assert!(checkpoints.load(open).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn waiting_message_keeps_thread_lock_alive() {
        let runner = runner(InMemoryCheckpointStore::new());
        let thread_id = ThreadId::new();
        let held = runner.thread_lock(thread_id).await;

        runner.release_lock(thread_id, runner.thread_lock(thread_id).await).await;

        assert!(runner.thread_locks.lock().await.contains_key(&thread_id));
        runner.release_lock(thread_id, held).await;
        assert!(runner.thread_locks.lock().await.is_empty());
    }

    #[tokio::test]
    async fn distinct_threads_do_not_share_state() {
        let runner = Arc::new(runner(InMemoryCheckpointStore::new()));
        let (a, b) = (ThreadId::new(), ThreadId::new());

        let handles: Vec<_> = [a, b]
            .into_iter()
            .map(|thread_id| {
                let runner = Arc::clone(&runner);
                tokio::spawn(async move {
                    let (emit, _rx) = Emitter::channel();
                    runner
                        .handle(HandleMessageCommand::new(thread_id, "solar system"), &emit)
                        .await
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().unwrap().is_suspended());
        }
    }
}
