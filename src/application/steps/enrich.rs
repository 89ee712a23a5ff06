use serde_json::json;
use tracing::{info, warn};

use super::{render, StepContext};
use crate::application::emitter::Emitter;
use crate::domain::conversation::{ConversationState, StateUpdate};
use crate::domain::localization::Preset;
use crate::domain::planning::{
    KnowledgeGraph, RequiredSlot, SchemaRef, StandardsAlignment, FALLBACK_STANDARD_CODE,
};
use crate::ports::GenerationRequest;

/// Builds knowledge-graph insights around the primary standard.
pub async fn enrich(ctx: &StepContext, state: &ConversationState, emit: &Emitter) -> StateUpdate {
    let language = state.language();
    emit.emit(ctx.preset(Preset::GetKgHeader, language));

    let details = state.requirements().details();
    let grade = details.slot(RequiredSlot::GradeLevel).unwrap_or("5");
    let fallback_alignment;
    let alignment = match state.alignment() {
        Some(alignment) => alignment,
        None => {
            fallback_alignment = StandardsAlignment::fallback(grade, Vec::new());
            &fallback_alignment
        }
    };
    let (code, description) = alignment
        .primary()
        .map(|s| (s.code.as_str(), s.description.as_str()))
        .unwrap_or((FALLBACK_STANDARD_CODE, ""));

    emit.emit(format!(
        "{}{} — {}\n\n",
        ctx.preset(Preset::KgStandardPrefix, language),
        code,
        ctx.localize(description, language)
    ));

    let prompt = format!(
        "Generate knowledge-graph insights for standard {}: {}. \
         The project is about {} for grade {}. Suggest project topics, \
         cross-subject connections, real-world applications, curriculum \
         resources and PBL integration ideas.",
        code,
        description,
        details.slot(RequiredSlot::Topic).unwrap_or_default(),
        grade
    );
    let request = GenerationRequest::new(
        SchemaRef::KnowledgeGraph,
        prompt,
        ctx.metadata(state, "enrich"),
    )
    .with_deps(json!({
        "standard_code": code,
        "standard_description": description,
        "project_details": details,
        "class_profile": state.locale_profile(),
    }));

    let graph = match ctx.generate::<KnowledgeGraph>(request).await {
        Ok(graph) => {
            info!(
                thread_id = %state.thread_id(),
                standard = %code,
                topics = graph.project_topics.len(),
                "enrichment generated"
            );
            graph
        }
        Err(failure) => {
            warn!(
                thread_id = %state.thread_id(),
                error = %failure,
                "enrichment failed; using fallback"
            );
            emit.emit(ctx.preset(Preset::KgFallback, language));
            KnowledgeGraph::fallback(code, description, failure.issues())
        }
    };

    for block in render::enrichment(ctx, &graph, language) {
        emit.emit(block);
    }
    StateUpdate::new().with_enrichment(graph)
}
