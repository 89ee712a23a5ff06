//! Step functions of the conversation graph.
//!
//! Every step has the shape `(context, state, emitter) -> StateUpdate`.
//! Steps read only the fields they need, never fail, and substitute the
//! documented fallback payload when generation does.

mod align_standards;
mod collect_requirements;
mod enrich;
mod generate_options;
mod render;
mod select_option;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::emitter::Emitter;
use super::streaming::collect_stream;
use crate::domain::conversation::ConversationState;
use crate::domain::foundation::Language;
use crate::domain::localization::Preset;
use crate::domain::planning::{PayloadError, StructuredPayload};
use crate::ports::{
    ContentStore, DocumentStore, GenerationClient, GenerationError, GenerationRequest,
    Localizer, RequestMetadata,
};

pub use align_standards::align_standards;
pub use collect_requirements::collect_requirements;
pub use enrich::enrich;
pub use generate_options::generate_options;
pub use select_option::select_option;

/// Tunables shared by every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Minimum gap between two streamed emissions.
    pub stream_debounce: Duration,
    /// Number of project options generated.
    pub option_count: usize,
    /// Upper bound on steps executed by one run.
    pub max_steps_per_run: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            stream_debounce: Duration::from_millis(10),
            option_count: 3,
            max_steps_per_run: 16,
        }
    }
}

/// Ports and settings the steps run against.
#[derive(Clone)]
pub struct StepContext {
    pub generation: Arc<dyn GenerationClient>,
    pub content: Arc<dyn ContentStore>,
    pub documents: Arc<dyn DocumentStore>,
    pub localizer: Arc<dyn Localizer>,
    pub settings: PipelineSettings,
}

/// Why a step fell back. Logged, never shown to the teacher.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepFailure {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Payload(#[from] PayloadError),
}

impl StepFailure {
    /// Entries for the fallback payload's `validation_issues`.
    pub fn issues(&self) -> Vec<String> {
        match self {
            StepFailure::Generation(err) => vec![err.to_string()],
            StepFailure::Payload(err) => err.issues(),
        }
    }
}

impl StepContext {
    pub fn new(
        generation: Arc<dyn GenerationClient>,
        content: Arc<dyn ContentStore>,
        documents: Arc<dyn DocumentStore>,
        localizer: Arc<dyn Localizer>,
    ) -> Self {
        Self {
            generation,
            content,
            documents,
            localizer,
            settings: PipelineSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Preset text in the session language.
    pub(crate) fn preset(&self, preset: Preset, language: Language) -> String {
        self.localizer.resolve(preset, language)
    }

    /// Generated (English) text shown in the session language.
    pub(crate) fn localize(&self, text: &str, language: Language) -> String {
        self.localizer.translate(text, Language::English, language)
    }

    pub(crate) fn metadata(&self, state: &ConversationState, step: &str) -> RequestMetadata {
        RequestMetadata::new(state.session_id(), step).with_thread(state.thread_id())
    }

    /// One-shot generation normalized into `P`.
    pub(crate) async fn generate<P: StructuredPayload>(
        &self,
        request: GenerationRequest,
    ) -> Result<P, StepFailure> {
        let result = self.generation.generate(request).await?;
        Ok(P::from_value(result.payload)?)
    }

    /// Streamed generation normalized into `P`. New preview text is emitted
    /// in the session language as it arrives.
    ///
    /// Returns the payload and whether any preview text was emitted.
    pub(crate) async fn stream<P: StructuredPayload>(
        &self,
        request: GenerationRequest,
        language: Language,
        emit: &Emitter,
    ) -> Result<(P, bool), StepFailure> {
        let schema = request.schema;
        let stream = self.generation.stream_generate(request).await?;
        let streamed = collect_stream(
            stream,
            schema.preview_field(),
            self.settings.stream_debounce,
            |delta| emit.emit(self.localize(&delta, language)),
        )
        .await?;
        let payload = P::from_value(streamed.payload)?;
        Ok((payload, !streamed.streamed_text.is_empty()))
    }
}
