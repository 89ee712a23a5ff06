use serde_json::json;
use tracing::{debug, info, warn};

use super::{render, StepContext};
use crate::application::emitter::Emitter;
use crate::domain::catalog::{rank_templates, DimensionalConfiguration};
use crate::domain::conversation::{ConversationState, StateUpdate};
use crate::domain::localization::{fill, Preset};
use crate::domain::planning::{OptionSet, ProjectOptions, SchemaRef};
use crate::ports::GenerationRequest;

/// Generates the option set, shows it and asks for a choice.
///
/// Templates are ranked against the requirements first; the best fits are
/// handed to the generator as candidates.
pub async fn generate_options(
    ctx: &StepContext,
    state: &ConversationState,
    emit: &Emitter,
) -> StateUpdate {
    let language = state.language();
    let count = ctx.settings.option_count.max(1);
    emit.emit(ctx.preset(Preset::CreatingOptionsHeader, language));

    let details = state.requirements().details();
    let config = DimensionalConfiguration::from_requirements(details);
    let templates = ctx.content.list_templates();
    let candidates: Vec<_> = rank_templates(&templates, details, &config)
        .into_iter()
        .take(count)
        .filter_map(|fit| {
            let template = templates.iter().find(|t| t.template_id == fit.template_id)?;
            Some(json!({
                "template_id": fit.template_id,
                "template_name": fit.template_name,
                "description": template.description,
                "driving_question_template": template.driving_question_template,
                "fit_reasons": fit.reasons,
            }))
        })
        .collect();
    debug!(
        thread_id = %state.thread_id(),
        configuration = %config.describe(),
        candidates = candidates.len(),
        "ranked templates"
    );

    let prompt = format!(
        "Generate {} distinct project options for this class. Each option must \
         follow one of the candidate templates and explain why it fits.",
        count
    );
    let request = GenerationRequest::new(
        SchemaRef::ProjectOptions,
        prompt,
        ctx.metadata(state, "generate_options"),
    )
    .with_deps(json!({
        "project_details": details,
        "class_profile": state.locale_profile(),
        "standards": state.alignment(),
        "knowledge_graph": state.enrichment(),
        "dimensional_configuration": config.describe(),
        "candidate_templates": candidates,
    }));

    let option_set = match ctx.stream::<ProjectOptions>(request, language, emit).await {
        Ok((options, _)) => {
            info!(
                thread_id = %state.thread_id(),
                options = options.project_options.len(),
                "project options generated"
            );
            OptionSet::new(options.project_options, count)
        }
        Err(failure) => {
            warn!(
                thread_id = %state.thread_id(),
                error = %failure,
                "option generation failed; using placeholders"
            );
            emit.emit(ctx.preset(Preset::FallbackOptions, language));
            OptionSet::fallback(count, failure.issues())
        }
    };

    for block in render::options(ctx, option_set.options(), language) {
        emit.emit(block);
    }
    let prompt = fill(
        &ctx.preset(Preset::ChoicePrompt, language),
        &[("max", &option_set.len().to_string())],
    );
    emit.emit(prompt.clone());

    StateUpdate::new()
        .with_option_set(option_set)
        .with_prompt(prompt)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{context, state};
    use super::*;
    use crate::adapters::{InMemoryDocumentStore, MockError, MockGenerationClient, MockResponse};

    #[tokio::test]
    async fn demo_options_are_rendered_with_prompt() {
        let client = MockGenerationClient::demo();
        let ctx = context(client.clone(), InMemoryDocumentStore::new());
        let mut state = state("solar system");
        let (emit, mut rx) = Emitter::channel();

        let update = generate_options(&ctx, &state, &emit).await;
        state.apply(update);

        let set = state.option_set().unwrap();
        assert_eq!(set.len(), 3);
        assert!(!set.selection_complete());
        assert_eq!(state.last_prompt(), Some("Please choose an option from 1 to 3."));
        let text = rx.drain_text();
        assert!(text.contains("Star Light, Star Bright"));
        assert!(text.contains("---"));

        let request = &client.get_calls()[0];
        let candidates = request.deps["candidate_templates"].as_array().unwrap();
        assert_eq!(candidates.len(), 3);
    }

    #[tokio::test]
    async fn extra_options_are_truncated() {
        let options: Vec<_> = (1..=5)
            .map(|i| json!({ "title": format!("Option {}", i) }))
            .collect();
        let client = MockGenerationClient::new().with_payload(
            SchemaRef::ProjectOptions,
            json!({ "response": "Here you go", "project_options": options }),
        );
        let ctx = context(client, InMemoryDocumentStore::new());
        let mut state = state("anything");
        let (emit, _rx) = Emitter::channel();

        let update = generate_options(&ctx, &state, &emit).await;
        state.apply(update);

        assert_eq!(state.option_set().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn broken_stream_falls_back_to_placeholders() {
        let client = MockGenerationClient::new().with_response(
            SchemaRef::ProjectOptions,
            MockResponse::BrokenStream {
                partials: vec![json!({ "response": "Here are" })],
                error: MockError::Network {
                    message: "reset".into(),
                },
            },
        );
        let ctx = context(client, InMemoryDocumentStore::new());
        let mut state = state("anything");
        let (emit, mut rx) = Emitter::channel();

        let update = generate_options(&ctx, &state, &emit).await;
        state.apply(update);

        let set = state.option_set().unwrap();
        assert_eq!(set.len(), 3);
        assert!(!set.validation_issues().is_empty());
        assert!(rx
            .drain_text()
            .contains("Could not generate structured options"));
    }
}
