//! Refinement flows on top of a completed conversation.
//!
//! A conversation is driven to a saved selection first, then refined.
//! Covers version chains, idempotent replays, no-op detection and the
//! file-backed store.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use pbl_planner::adapters::{
    FileDocumentStore, InMemoryCheckpointStore, InMemoryDocumentStore, MockError,
    MockGenerationClient, MockResponse, PresetLocalizer, StaticContentCatalog,
};
use pbl_planner::application::{
    Emitter, GetVersionHistoryError, GetVersionHistoryHandler, GetVersionHistoryQuery,
    HandleMessageCommand, PipelineSettings, RefineProjectCommand, RefineProjectHandler,
    RefineProjectResult, SessionRunner, StepContext,
};
use pbl_planner::domain::conversation::RunOutcome;
use pbl_planner::domain::document::{DocumentFilter, DocumentKind, PersistedDocument};
use pbl_planner::domain::foundation::{DocumentId, ThreadId};
use pbl_planner::domain::planning::SchemaRef;
use pbl_planner::domain::refinement::warnings;
use pbl_planner::ports::DocumentStore;

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    runner: SessionRunner,
    refiner: RefineProjectHandler,
    history: GetVersionHistoryHandler,
    client: MockGenerationClient,
    documents: Arc<dyn DocumentStore>,
}

impl Harness {
    fn new(documents: Arc<dyn DocumentStore>) -> Self {
        let client = MockGenerationClient::demo();
        let ctx = StepContext::new(
            Arc::new(client.clone()),
            Arc::new(StaticContentCatalog::new()),
            Arc::clone(&documents),
            Arc::new(PresetLocalizer::new()),
        )
        .with_settings(PipelineSettings {
            stream_debounce: Duration::ZERO,
            ..PipelineSettings::default()
        });

        Self {
            runner: SessionRunner::new(ctx.clone(), Arc::new(InMemoryCheckpointStore::new())),
            refiner: RefineProjectHandler::new(ctx),
            history: GetVersionHistoryHandler::new(Arc::clone(&documents)),
            client,
            documents,
        }
    }

    fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryDocumentStore::new()))
    }

    /// Runs a conversation to a saved selection of the first option.
    async fn saved_selection(&self) -> PersistedDocument {
        let thread_id = ThreadId::new();
        let (emit, _rx) = Emitter::channel();
        self.runner
            .handle(
                HandleMessageCommand::new(
                    thread_id,
                    "2 week project about the solar system for grade 5",
                ),
                &emit,
            )
            .await
            .unwrap();
        let outcome = self
            .runner
            .handle(HandleMessageCommand::new(thread_id, "1"), &emit)
            .await
            .unwrap();

        let RunOutcome::Done {
            document_id: Some(id),
            ..
        } = outcome
        else {
            panic!("selection was not saved: {:?}", outcome);
        };
        self.documents.find_one(id).await.unwrap().unwrap()
    }

    /// Queues an edit that rewrites the driving question of `doc`.
    fn script_edit(&self, doc: &PersistedDocument, question: &str) {
        let mut updated = doc.selected_option.clone();
        updated.driving_question = question.to_string();
        self.client.push(
            SchemaRef::Refinement,
            MockResponse::Payload(json!({
                "updated_selection": updated,
                "change_summary": "Rewrote the driving question",
                "affected_fields": ["driving_question"],
            })),
        );
    }

    async fn refine(&self, cmd: RefineProjectCommand) -> (RefineProjectResult, String) {
        let (emit, mut rx) = Emitter::channel();
        let result = self.refiner.handle(cmd, &emit).await.unwrap();
        (result, rx.drain_text())
    }

    async fn chain(&self, document_id: DocumentId) -> Vec<PersistedDocument> {
        self.history
            .handle(GetVersionHistoryQuery { document_id })
            .await
            .unwrap()
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn refinements_extend_the_selection_chain() {
    let harness = Harness::in_memory();
    let root = harness.saved_selection().await;

    harness.script_edit(&root, "How far away is the nearest star?");
    let (first, text) = harness
        .refine(
            RefineProjectCommand::new("Make the driving question about distance")
                .with_source(root.id)
                .with_idempotency_key("edit-1"),
        )
        .await;
    let v2 = first.updated_document_id.unwrap();
    assert_eq!(first.refine_result.affected_fields, vec!["driving_question"]);
    assert!(text.contains("Affected fields: driving_question"));

    let v2_doc = harness.documents.find_one(v2).await.unwrap().unwrap();
    harness.script_edit(&v2_doc, "How do astronomers measure distance?");
    let (second, _) = harness
        .refine(
            RefineProjectCommand::new("Focus the driving question on measurement")
                .with_source(v2)
                .with_idempotency_key("edit-2"),
        )
        .await;
    let v3 = second.updated_document_id.unwrap();

    let chain = harness.chain(v3).await;
    let versions: Vec<u32> = chain.iter().map(|doc| doc.version).collect();
    assert_eq!(versions, vec![1, 2, 3]);
    assert_eq!(chain[0].id, root.id);
    assert_eq!(chain[0].kind, DocumentKind::Selection);
    assert_eq!(chain[1].parent_id, Some(root.id));
    assert_eq!(chain[2].parent_id, Some(v2));
    assert_eq!(
        chain[2].selected_option.driving_question,
        "How do astronomers measure distance?"
    );
    assert_eq!(chain[2].context, root.context);
}

#[tokio::test]
async fn repeated_submission_stores_one_version() {
    let harness = Harness::in_memory();
    let root = harness.saved_selection().await;
    harness.script_edit(&root, "Why do stars twinkle?");
    let cmd = RefineProjectCommand::new("Change the driving question to twinkling")
        .with_source(root.id)
        .with_idempotency_key("same-key");

    let (first, _) = harness.refine(cmd.clone()).await;
    let calls_after_first = harness.client.calls_for(SchemaRef::Refinement);
    let (second, _) = harness.refine(cmd).await;

    assert_eq!(first.updated_document_id, second.updated_document_id);
    assert_eq!(first.refine_result.updated_selection, second.refine_result.updated_selection);
    assert_eq!(harness.client.calls_for(SchemaRef::Refinement), calls_after_first);
    let children = harness
        .documents
        .find(DocumentFilter::new().with_parent(root.id))
        .await
        .unwrap();
    assert_eq!(children.len(), 1);
}

#[tokio::test]
async fn failing_generator_leaves_selection_untouched() {
    let harness = Harness::in_memory();
    let root = harness.saved_selection().await;
    for _ in 0..2 {
        harness.client.push(
            SchemaRef::Refinement,
            MockResponse::Error(MockError::unavailable("overloaded")),
        );
    }

    let (result, text) = harness
        .refine(RefineProjectCommand::new("make it shorter").with_source(root.id))
        .await;

    let refined = result.refine_result;
    assert!(refined.affected_fields.is_empty());
    assert_eq!(refined.updated_selection, root.selected_option);
    assert!(refined.has_warning(warnings::NO_CHANGE_DETECTED));
    assert!(refined.has_warning(warnings::REFINING_AGENT_ERROR));
    assert!(text.contains("I could not find anything to change for that request."));
    assert!(!text.contains("overloaded"));

    let saved = harness
        .documents
        .find_one(result.updated_document_id.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.version, 2);
    assert!(saved.warnings.contains(&warnings::NO_CHANGE_DETECTED.to_string()));
}

#[tokio::test]
async fn unchanged_payloads_fall_back_to_keyword_patch() {
    let harness = Harness::in_memory();
    let root = harness.saved_selection().await;
    let unchanged = json!({
        "updated_selection": root.selected_option,
        "change_summary": "Looks good already",
        "affected_fields": [],
    });
    for _ in 0..2 {
        harness
            .client
            .push(SchemaRef::Refinement, MockResponse::Payload(unchanged.clone()));
    }

    let (result, _) = harness
        .refine(
            RefineProjectCommand::new("Make the driving question about comets")
                .with_source(root.id),
        )
        .await;

    let refined = result.refine_result;
    assert_eq!(refined.affected_fields, vec!["driving_question"]);
    assert!(refined.has_warning(warnings::FALLBACK_PATCH_APPLIED));
    assert!(!refined.has_warning(warnings::REFINING_AGENT_ERROR));
    assert_eq!(refined.updated_selection.title, root.selected_option.title);
}

#[tokio::test]
async fn history_of_unknown_document_is_not_found() {
    let harness = Harness::in_memory();
    let missing = DocumentId::new();

    let err = harness
        .history
        .handle(GetVersionHistoryQuery {
            document_id: missing,
        })
        .await
        .unwrap_err();

    assert_eq!(err, GetVersionHistoryError::NotFound(missing));
}

#[tokio::test]
async fn file_store_keeps_chain_across_instances() {
    let temp = TempDir::new().unwrap();
    let harness = Harness::new(Arc::new(FileDocumentStore::new(temp.path())));
    let root = harness.saved_selection().await;
    harness.script_edit(&root, "What makes a star shine?");
    let (result, _) = harness
        .refine(
            RefineProjectCommand::new("Driving question about starlight")
                .with_source(root.id)
                .with_idempotency_key("file-edit"),
        )
        .await;
    let child = result.updated_document_id.unwrap();

    let reopened = Harness::new(Arc::new(FileDocumentStore::new(temp.path())));
    let chain = reopened.chain(child).await;
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[1].selected_option.driving_question, "What makes a star shine?");

    let (replayed, _) = reopened
        .refine(
            RefineProjectCommand::new("Driving question about starlight")
                .with_source(root.id)
                .with_idempotency_key("file-edit"),
        )
        .await;
    assert_eq!(replayed.updated_document_id, Some(child));
    assert_eq!(reopened.client.calls_for(SchemaRef::Refinement), 0);
}
