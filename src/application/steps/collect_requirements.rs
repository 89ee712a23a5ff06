//! Slot filling for topic, grade level and duration.

use serde_json::json;
use tracing::{debug, info, warn};

use super::StepContext;
use crate::application::emitter::Emitter;
use crate::domain::conversation::{ConversationState, ConversationTurn, StateUpdate};
use crate::domain::foundation::Language;
use crate::domain::localization::{fill, Preset};
use crate::domain::planning::{ProjectDetails, SchemaRef};
use crate::ports::{GenerationRequest, Message};

/// Extracts requirement slots from the latest input and asks for whatever
/// is still missing.
///
/// A failed extraction contributes nothing, so the merge keeps every value
/// already known and the graph simply asks again.
pub async fn collect_requirements(
    ctx: &StepContext,
    state: &ConversationState,
    emit: &Emitter,
) -> StateUpdate {
    let language = state.language();
    debug!(thread_id = %state.thread_id(), "collecting requirements");

    let raw = state.user_input().text();
    let english = ctx
        .localizer
        .translate(&state.user_input().prompt_text(), language, Language::English);

    let history: Vec<Message> = state
        .turns()
        .into_iter()
        .filter(|turn| !turn.content.trim().is_empty())
        .map(Message::from)
        .collect();
    let request = GenerationRequest::new(
        SchemaRef::ProjectDetails,
        english.clone(),
        ctx.metadata(state, "collect_requirements"),
    )
    .with_history(history)
    .with_deps(json!({
        "class_profile": state.locale_profile(),
        "known_details": state.requirements().details(),
    }));

    let mut details = match ctx.stream::<ProjectDetails>(request, language, emit).await {
        Ok((details, _)) => details,
        Err(failure) => {
            warn!(
                thread_id = %state.thread_id(),
                error = %failure,
                "requirement extraction failed; keeping known slots"
            );
            ProjectDetails::default()
        }
    };

    let mut merged = state.requirements().clone();
    merged.merge(&details);
    if let Some(grade) = merged.infer_grade_from_text(&raw) {
        debug!(grade = %grade, "inferred grade level from age mention");
        details.grade_level = Some(grade);
        if details.age_range.is_none() {
            details.age_range = merged.details().age_range;
        }
    }

    let missing = merged.missing();
    let prompt = if missing.is_empty() {
        ctx.preset(Preset::AllInfoReceived, language)
    } else {
        let slots = missing
            .iter()
            .map(|slot| ctx.localize(slot.label(), language))
            .collect::<Vec<_>>()
            .join(", ");
        info!(thread_id = %state.thread_id(), missing = %slots, "requirements incomplete");
        format!(
            "{} {}",
            ctx.preset(Preset::NeedMoreInfo, language),
            fill(
                &ctx.preset(Preset::ProvideMissingSlots, language),
                &[("slots", &slots)]
            )
        )
    };
    emit.emit(format!("\n{}", prompt));

    let mut update = StateUpdate::new().with_turn(ConversationTurn::user(english));
    if !details.response.trim().is_empty() {
        update = update.with_turn(ConversationTurn::assistant(details.response.clone()));
    }
    update.with_requirements(details).with_prompt(prompt)
}
