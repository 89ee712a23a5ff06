//! The typed record threaded through every step.

use serde::{Deserialize, Serialize};

use super::{ConversationError, ConversationStep, ConversationTurn};
use crate::domain::foundation::{Language, SessionId, StateMachine, ThreadId, Timestamp};
use crate::domain::planning::{
    CollectedRequirements, KnowledgeGraph, OptionSet, ProjectDetails, RequiredSlot,
    StandardsAlignment, UserInput,
};

/// State of one conversation thread.
///
/// Steps never mutate this directly. They return a [`StateUpdate`] and the
/// graph applies it, so each field has exactly one merge rule.
///
/// # Invariants
///
/// - `thread_id`, `session_id`, `language` and `locale_profile` never change
///   after construction
/// - `message_log` is append-only
/// - `step` only moves along edges of [`ConversationStep`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    thread_id: ThreadId,
    session_id: SessionId,
    language: Language,
    locale_profile: String,
    user_input: UserInput,
    message_log: Vec<String>,
    requirements: CollectedRequirements,
    alignment: Option<StandardsAlignment>,
    enrichment: Option<KnowledgeGraph>,
    option_set: Option<OptionSet>,
    step: ConversationStep,
    last_prompt: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl ConversationState {
    /// Starts a new conversation with the teacher's first message.
    pub fn new(
        thread_id: ThreadId,
        session_id: SessionId,
        language: Language,
        locale_profile: impl Into<String>,
        first_input: UserInput,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            thread_id,
            session_id,
            language,
            locale_profile: locale_profile.into(),
            user_input: first_input,
            message_log: Vec::new(),
            requirements: CollectedRequirements::new(),
            alignment: None,
            enrichment: None,
            option_set: None,
            step: ConversationStep::CollectRequirements,
            last_prompt: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn locale_profile(&self) -> &str {
        &self.locale_profile
    }

    pub fn user_input(&self) -> &UserInput {
        &self.user_input
    }

    pub fn message_log(&self) -> &[String] {
        &self.message_log
    }

    /// Decoded message log, oldest first.
    pub fn turns(&self) -> Vec<ConversationTurn> {
        self.message_log
            .iter()
            .map(|entry| ConversationTurn::decode(entry))
            .collect()
    }

    pub fn requirements(&self) -> &CollectedRequirements {
        &self.requirements
    }

    pub fn missing_slots(&self) -> Vec<RequiredSlot> {
        self.requirements.missing()
    }

    pub fn alignment(&self) -> Option<&StandardsAlignment> {
        self.alignment.as_ref()
    }

    pub fn enrichment(&self) -> Option<&KnowledgeGraph> {
        self.enrichment.as_ref()
    }

    pub fn option_set(&self) -> Option<&OptionSet> {
        self.option_set.as_ref()
    }

    pub fn step(&self) -> ConversationStep {
        self.step
    }

    /// Prompt shown at the most recent suspension.
    pub fn last_prompt(&self) -> Option<&str> {
        self.last_prompt.as_deref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn is_suspended(&self) -> bool {
        self.step.is_suspend_point()
    }

    /// Moves to `next` if the graph has that edge.
    pub fn advance(&mut self, next: ConversationStep) -> Result<(), ConversationError> {
        self.step = self.step.transition_to(next)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Substitutes new input and re-enters the step that suspended.
    ///
    /// # Errors
    ///
    /// `NotSuspended` if the thread is not at a suspend point. The state is
    /// left untouched in that case.
    pub fn resume_with(&mut self, input: UserInput) -> Result<(), ConversationError> {
        let target = self
            .step
            .resume_target()
            .ok_or_else(|| ConversationError::not_suspended(self.thread_id, self.step))?;

        self.advance(target)?;
        self.user_input = input;
        Ok(())
    }

    /// Merges a step's partial update.
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(details) = update.requirements {
            self.requirements.merge(&details);
        }
        self.message_log
            .extend(update.turns.iter().map(ConversationTurn::encode));
        if let Some(alignment) = update.alignment {
            self.alignment = Some(alignment);
        }
        if let Some(enrichment) = update.enrichment {
            self.enrichment = Some(enrichment);
        }
        if let Some(option_set) = update.option_set {
            self.option_set = Some(option_set);
        }
        if let Some(prompt) = update.prompt {
            self.last_prompt = Some(prompt);
        }
        self.updated_at = Timestamp::now();
    }
}

/// Fields a step wants merged back into the state.
///
/// `requirements` is merged last-non-empty-wins, `turns` are appended, and
/// every other present field replaces the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub requirements: Option<ProjectDetails>,
    pub turns: Vec<ConversationTurn>,
    pub alignment: Option<StandardsAlignment>,
    pub enrichment: Option<KnowledgeGraph>,
    pub option_set: Option<OptionSet>,
    pub prompt: Option<String>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_requirements(mut self, details: ProjectDetails) -> Self {
        self.requirements = Some(details);
        self
    }

    pub fn with_turn(mut self, turn: ConversationTurn) -> Self {
        self.turns.push(turn);
        self
    }

    pub fn with_alignment(mut self, alignment: StandardsAlignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn with_enrichment(mut self, enrichment: KnowledgeGraph) -> Self {
        self.enrichment = Some(enrichment);
        self
    }

    pub fn with_option_set(mut self, option_set: OptionSet) -> Self {
        self.option_set = Some(option_set);
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }
}
