use serde_json::json;
use tracing::{info, warn};

use super::{render, StepContext};
use crate::application::emitter::Emitter;
use crate::domain::conversation::{ConversationState, StateUpdate};
use crate::domain::localization::Preset;
use crate::domain::planning::{RequiredSlot, SchemaRef, StandardsAlignment};
use crate::ports::GenerationRequest;

const DEFAULT_GRADE: &str = "5";

/// Recommends standards for the collected requirements.
///
/// Any failure substitutes `StandardsAlignment::fallback` for the grade, so
/// enrichment always has a standard to work from.
pub async fn align_standards(
    ctx: &StepContext,
    state: &ConversationState,
    emit: &Emitter,
) -> StateUpdate {
    let language = state.language();
    emit.emit(ctx.preset(Preset::GetStandardsHeader, language));

    let details = state.requirements().details();
    let grade = details.slot(RequiredSlot::GradeLevel).unwrap_or(DEFAULT_GRADE);
    let topic = details.slot(RequiredSlot::Topic).unwrap_or_default();
    let duration = details.slot(RequiredSlot::Duration).unwrap_or_default();

    let prompt = format!(
        "Find relevant educational standards for a grade {} project about {}. \
         Align them with the project's characteristics and {} duration.",
        grade, topic, duration
    );
    let request = GenerationRequest::new(
        SchemaRef::StandardsAlignment,
        prompt,
        ctx.metadata(state, "align_standards"),
    )
    .with_deps(json!({
        "project_details": details,
        "class_profile": state.locale_profile(),
    }));

    let alignment = match ctx.generate::<StandardsAlignment>(request).await {
        Ok(alignment) => {
            info!(
                thread_id = %state.thread_id(),
                standards = alignment.standards.len(),
                "standards aligned"
            );
            for block in render::standards(ctx, &alignment, language) {
                emit.emit(block);
            }
            alignment
        }
        Err(failure) => {
            warn!(
                thread_id = %state.thread_id(),
                error = %failure,
                "standards alignment failed; using fallback"
            );
            emit.emit(ctx.preset(Preset::StandardsFallback, language));
            StandardsAlignment::fallback(grade, failure.issues())
        }
    };

    StateUpdate::new().with_alignment(alignment)
}
