//! ConversationGraph - Drives a thread from its current step to the next
//! suspend point or to completion.
//!
//! ```text
//! CollectRequirements ──complete──▶ AlignStandards ──▶ Enrich ──▶ GenerateOptions
//!        │  ▲                                                       │   ▲    │
//!   missing  resume                                       no choice │   │    │ chosen
//!        ▼  │                                                       ▼   │    ▼
//!     AwaitUser                                            AwaitSelection    Done
//! ```
//!
//! Entering `GenerateOptions` without an option set generates one; entering
//! it with an open set applies the new input as the teacher's choice.

use tracing::{debug, info};

use super::emitter::Emitter;
use super::steps::{
    align_standards, collect_requirements, enrich, generate_options, select_option,
    StepContext,
};
use crate::domain::conversation::{
    AwaitingInput, ConversationError, ConversationState, ConversationStep, RunOutcome,
};
use crate::domain::planning::OptionSet;

pub struct ConversationGraph {
    ctx: StepContext,
}

impl ConversationGraph {
    pub fn new(ctx: StepContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &StepContext {
        &self.ctx
    }

    /// Runs steps until the thread suspends or finishes.
    ///
    /// # Errors
    ///
    /// - `InvalidTransition` if the routing tried an edge the graph lacks
    /// - `StepBudgetExceeded` if no stopping point was reached within the
    ///   configured number of steps
    pub async fn run(
        &self,
        state: &mut ConversationState,
        emit: &Emitter,
    ) -> Result<RunOutcome, ConversationError> {
        let limit = self.ctx.settings.max_steps_per_run;

        for _ in 0..limit {
            let step = state.step();
            debug!(thread_id = %state.thread_id(), step = %step, "running step");

            match step {
                ConversationStep::CollectRequirements => {
                    let update = collect_requirements(&self.ctx, state, emit).await;
                    state.apply(update);
                    if state.requirements().is_complete() {
                        state.advance(ConversationStep::AlignStandards)?;
                    } else {
                        state.advance(ConversationStep::AwaitUser)?;
                    }
                }
                ConversationStep::AlignStandards => {
                    let update = align_standards(&self.ctx, state, emit).await;
                    state.apply(update);
                    state.advance(ConversationStep::Enrich)?;
                }
                ConversationStep::Enrich => {
                    let update = enrich(&self.ctx, state, emit).await;
                    state.apply(update);
                    state.advance(ConversationStep::GenerateOptions)?;
                }
                ConversationStep::GenerateOptions => {
                    let update = match state.option_set() {
                        None => Some(generate_options(&self.ctx, state, emit).await),
                        Some(set) if !set.selection_complete() => {
                            Some(select_option(&self.ctx, state, emit).await)
                        }
                        Some(_) => None,
                    };
                    if let Some(update) = update {
                        state.apply(update);
                    }

                    let chosen = state
                        .option_set()
                        .map(OptionSet::selection_complete)
                        .unwrap_or(false);
                    if chosen {
                        state.advance(ConversationStep::Done)?;
                    } else {
                        state.advance(ConversationStep::AwaitSelection)?;
                    }
                }
                ConversationStep::AwaitUser => {
                    info!(thread_id = %state.thread_id(), "suspended for requirements");
                    return Ok(RunOutcome::Suspended {
                        thread_id: state.thread_id(),
                        prompt_text: state.last_prompt().unwrap_or_default().to_string(),
                        awaiting: AwaitingInput::Requirements {
                            missing_slots: state.missing_slots(),
                        },
                    });
                }
                ConversationStep::AwaitSelection => {
                    info!(thread_id = %state.thread_id(), "suspended for selection");
                    return Ok(RunOutcome::Suspended {
                        thread_id: state.thread_id(),
                        prompt_text: state.last_prompt().unwrap_or_default().to_string(),
                        awaiting: AwaitingInput::Selection {
                            option_count: state.option_set().map(OptionSet::len).unwrap_or(0),
                        },
                    });
                }
                ConversationStep::Done => {
                    let result = state.option_set().cloned().unwrap_or_else(|| {
                        OptionSet::fallback(self.ctx.settings.option_count, Vec::new())
                    });
                    let document_id = result.saved_document_id();
                    info!(
                        thread_id = %state.thread_id(),
                        document_id = ?document_id,
                        "conversation complete"
                    );
                    return Ok(RunOutcome::Done {
                        thread_id: state.thread_id(),
                        result,
                        document_id,
                    });
                }
            }
        }

        Err(ConversationError::StepBudgetExceeded { limit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryDocumentStore, MockGenerationClient};
    use crate::application::steps::test_support::{context, state};
    use crate::application::steps::PipelineSettings;
    use crate::domain::planning::{RequiredSlot, SchemaRef, UserInput};
    use serde_json::json;

    #[tokio::test]
    async fn complete_request_runs_to_selection_prompt() {
        let client = MockGenerationClient::demo();
        let ctx = context(client.clone(), InMemoryDocumentStore::new());
        let graph = ConversationGraph::new(ctx);
        let mut state = state("2 week solar system project for grade 5");
        let (emit, mut rx) = Emitter::channel();

        let outcome = graph.run(&mut state, &emit).await.unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Suspended {
                thread_id: state.thread_id(),
                prompt_text: "Please choose an option from 1 to 3.".to_string(),
                awaiting: AwaitingInput::Selection { option_count: 3 },
            }
        );
        assert_eq!(state.step(), ConversationStep::AwaitSelection);
        assert_eq!(client.calls_for(SchemaRef::ProjectDetails), 1);
        assert_eq!(client.calls_for(SchemaRef::ProjectOptions), 1);
        let text = rx.drain_text();
        let standards = text.find("standards recommendations").unwrap();
        let insights = text.find("knowledge-graph insights").unwrap();
        let options = text.find("Creating Project Options").unwrap();
        assert!(standards < insights && insights < options);
    }

    #[tokio::test]
    async fn resumed_selection_finishes_with_document() {
        let documents = InMemoryDocumentStore::new();
        let ctx = context(MockGenerationClient::demo(), documents.clone());
        let graph = ConversationGraph::new(ctx);
        let mut state = state("2 week solar system project for grade 5");
        let (emit, _rx) = Emitter::channel();
        graph.run(&mut state, &emit).await.unwrap();

        state.resume_with(UserInput::selection(2)).unwrap();
        let outcome = graph.run(&mut state, &emit).await.unwrap();

        match outcome {
            RunOutcome::Done {
                result,
                document_id,
                ..
            } => {
                assert_eq!(result.selected_index(), Some(1));
                assert!(document_id.is_some());
            }
            other => panic!("expected done, got {:?}", other),
        }
        assert_eq!(documents.document_count().await, 1);
        assert_eq!(state.step(), ConversationStep::Done);
    }

    #[tokio::test]
    async fn incomplete_request_suspends_for_requirements() {
        let client = MockGenerationClient::new()
            .with_payload(SchemaRef::ProjectDetails, json!({ "topic": "bees" }));
        let ctx = context(client.clone(), InMemoryDocumentStore::new());
        let graph = ConversationGraph::new(ctx);
        let mut state = state("bees");
        let (emit, _rx) = Emitter::channel();

        let outcome = graph.run(&mut state, &emit).await.unwrap();

        assert_eq!(outcome.missing_slot_labels(), vec!["grade level", "duration"]);
        assert_eq!(
            state.missing_slots(),
            vec![RequiredSlot::GradeLevel, RequiredSlot::Duration]
        );
        assert_eq!(client.calls_for(SchemaRef::StandardsAlignment), 0);
    }

    #[tokio::test]
    async fn invalid_choice_suspends_again_without_regenerating() {
        let client = MockGenerationClient::demo();
        let ctx = context(client.clone(), InMemoryDocumentStore::new());
        let graph = ConversationGraph::new(ctx);
        let mut state = state("2 week solar system project for grade 5");
        let (emit, _rx) = Emitter::channel();
        graph.run(&mut state, &emit).await.unwrap();

        state.resume_with("the ninth one".into()).unwrap();
        let outcome = graph.run(&mut state, &emit).await.unwrap();

        assert!(outcome.is_suspended());
        assert_eq!(
            state.last_prompt(),
            Some("Please select an option between 1 and 3.")
        );
        assert_eq!(client.calls_for(SchemaRef::ProjectOptions), 1);
    }

    #[tokio::test]
    async fn step_budget_bounds_a_run() {
        let ctx = context(MockGenerationClient::demo(), InMemoryDocumentStore::new())
            .with_settings(PipelineSettings {
                max_steps_per_run: 2,
                ..PipelineSettings::default()
            });
        let graph = ConversationGraph::new(ctx);
        let mut state = state("2 week solar system project for grade 5");
        let (emit, _rx) = Emitter::channel();

        let err = graph.run(&mut state, &emit).await.unwrap_err();

        assert_eq!(err, ConversationError::StepBudgetExceeded { limit: 2 });
    }
}
