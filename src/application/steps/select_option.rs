use tracing::{info, warn};

use super::{render, StepContext};
use crate::application::emitter::Emitter;
use crate::domain::conversation::{ConversationState, StateUpdate};
use crate::domain::document::{PersistedDocument, PlanContext};
use crate::domain::foundation::DocumentId;
use crate::domain::localization::{fill, Preset};
use crate::domain::planning::parse_selection;
use crate::ports::DocumentStoreError;

/// Applies the teacher's choice to the current option set and persists it.
///
/// An unrecognized or out-of-range choice leaves the set untouched and
/// re-asks. A store failure never fails the step: the selection stands
/// without a document id.
pub async fn select_option(
    ctx: &StepContext,
    state: &ConversationState,
    emit: &Emitter,
) -> StateUpdate {
    let language = state.language();
    let Some(current) = state.option_set() else {
        return StateUpdate::new();
    };
    let max = current.len();

    let index = match parse_selection(state.user_input(), max, language) {
        Ok(index) => index,
        Err(err) => {
            info!(thread_id = %state.thread_id(), error = %err, "selection not understood");
            let prompt = fill(
                &ctx.preset(Preset::InvalidChoice, language),
                &[("max", &max.to_string())],
            );
            emit.emit(format!("\n{}", prompt));
            return StateUpdate::new().with_prompt(prompt);
        }
    };

    let mut option_set = current.clone();
    let option = match option_set.select(index) {
        Ok(option) => option.clone(),
        Err(err) => {
            warn!(error = %err, "parsed selection rejected by option set");
            return StateUpdate::new();
        }
    };
    for block in render::selection(ctx, index + 1, &option, language) {
        emit.emit(block);
    }

    let context = PlanContext {
        class_profile: state.locale_profile().to_string(),
        requirements: Some(state.requirements().details().clone()),
        standards: state.alignment().cloned(),
        knowledge_graph: state.enrichment().cloned(),
    };
    let key = format!("{}:{}", state.thread_id(), index);
    let saved = match PersistedDocument::selection(
        state.session_id(),
        language,
        option_set.options(),
        index,
        context,
        Some(key),
    ) {
        Some(doc) => persist(ctx, doc).await,
        None => None,
    };

    match saved {
        Some(id) => emit.emit(fill(
            &ctx.preset(Preset::SelectionSaved, language),
            &[("id", &id.to_string())],
        )),
        None => emit.emit(ctx.preset(Preset::SaveFailed, language)),
    }
    option_set.record_saved_document(saved);
    info!(
        thread_id = %state.thread_id(),
        option = index + 1,
        document_id = ?saved,
        "project option selected"
    );

    StateUpdate::new().with_option_set(option_set)
}

async fn persist(ctx: &StepContext, doc: PersistedDocument) -> Option<DocumentId> {
    match ctx.documents.insert(doc).await {
        Ok(id) => Some(id),
        Err(DocumentStoreError::Duplicate { existing }) => Some(existing),
        Err(err) => {
            warn!(error = %err, "failed to persist selection");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{context, state};
    use super::super::generate_options;
    use super::*;
    use crate::adapters::{InMemoryDocumentStore, MockGenerationClient};
    use crate::domain::document::DocumentFilter;
    use crate::domain::planning::UserInput;
    use crate::ports::DocumentStore;

    async fn with_options(
        documents: InMemoryDocumentStore,
        choice: impl Into<UserInput>,
    ) -> (StepContext, ConversationState) {
        let ctx = context(MockGenerationClient::demo(), documents);
        let mut state = state(choice);
        let (emit, _rx) = Emitter::channel();
        let update = generate_options(&ctx, &state, &emit).await;
        state.apply(update);
        (ctx, state)
    }

    #[tokio::test]
    async fn valid_choice_selects_and_persists() {
        let documents = InMemoryDocumentStore::new();
        let (ctx, mut state) =
            with_options(documents.clone(), "I'll take the second one").await;
        let (emit, mut rx) = Emitter::channel();

        let update = select_option(&ctx, &state, &emit).await;
        state.apply(update);

        let set = state.option_set().unwrap();
        assert_eq!(set.selected_index(), Some(1));
        assert!(set.selection_complete());
        let id = set.saved_document_id().unwrap();
        let doc = documents.find_one(id).await.unwrap().unwrap();
        assert_eq!(doc.idempotency_key, Some(format!("{}:1", state.thread_id())));
        assert_eq!(doc.selected_option, set.options()[1]);
        let text = rx.drain_text();
        assert!(text.contains("Your project is ready."));
        assert!(text.contains(&id.to_string()));
    }

    #[tokio::test]
    async fn out_of_range_choice_reasks_without_change() {
        let (ctx, mut state) =
            with_options(InMemoryDocumentStore::new(), UserInput::selection(7)).await;
        let (emit, mut rx) = Emitter::channel();

        let update = select_option(&ctx, &state, &emit).await;
        state.apply(update);

        assert!(!state.option_set().unwrap().selection_complete());
        assert_eq!(
            state.last_prompt(),
            Some("Please select an option between 1 and 3.")
        );
        assert!(rx.drain_text().contains("between 1 and 3"));
    }

    #[tokio::test]
    async fn store_outage_still_completes_selection() {
        let documents = InMemoryDocumentStore::new();
        let (ctx, mut state) = with_options(documents.clone(), "1").await;
        documents.set_available(false);
        let (emit, mut rx) = Emitter::channel();

        let update = select_option(&ctx, &state, &emit).await;
        state.apply(update);

        let set = state.option_set().unwrap();
        assert!(set.selection_complete());
        assert_eq!(set.saved_document_id(), None);
        assert!(rx.drain_text().contains("could not be saved"));
    }

    #[tokio::test]
    async fn repeated_selection_reuses_existing_document() {
        let documents = InMemoryDocumentStore::new();
        let (ctx, state) = with_options(documents.clone(), "1").await;
        let (emit, _rx) = Emitter::channel();

        let first = select_option(&ctx, &state, &emit).await;
        let second = select_option(&ctx, &state, &emit).await;

        let first_id = first.option_set.as_ref().and_then(|s| s.saved_document_id());
        let second_id = second.option_set.as_ref().and_then(|s| s.saved_document_id());
        assert!(first_id.is_some());
        assert_eq!(first_id, second_id);
        assert_eq!(
            documents.find(DocumentFilter::new()).await.unwrap().len(),
            1
        );
    }
}
