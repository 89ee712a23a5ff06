//! RefineProjectHandler - Applies a change request to a persisted selection
//! and saves the result as the next version of its chain.
//!
//! `ApplyEdit` never fails: a generator that errors or changes nothing is
//! retried once with a firmer directive, then the fallback transformer gets
//! a turn, and whatever remains is reported through warnings. `SaveVersion`
//! is best-effort and at-most-once per `(parent, idempotency_key)`.

use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::emitter::Emitter;
use crate::application::steps::StepContext;
use crate::domain::document::{
    DocumentFilter, DocumentKind, PersistedDocument, PlanContext, VersionLink,
};
use crate::domain::foundation::{
    DocumentId, Language, SessionId, StateMachine, ValidationError,
};
use crate::domain::localization::{fill, Preset};
use crate::domain::planning::{ProjectOption, SchemaRef};
use crate::domain::refinement::{
    diff_fields, warnings, FallbackTransformer, KeywordFallback, RefinementResult,
    RefinementStep,
};
use crate::ports::{DocumentStoreError, GenerationRequest, RequestMetadata};

const FORCE_SUFFIX: &str = "\n\nReturn ONLY a valid RefinementResult JSON conforming exactly \
    to the schema. You MUST update the requested fields. Do not omit required fields.";

/// Command to refine a project option.
#[derive(Debug, Clone, Default)]
pub struct RefineProjectCommand {
    /// Document to refine. Its selection and context are loaded when
    /// `selected_option` is absent.
    pub source_document_id: Option<DocumentId>,
    pub change_request: String,
    pub selected_option: Option<ProjectOption>,
    pub idempotency_key: Option<String>,
    pub session_id: Option<SessionId>,
    pub language: Language,
    pub class_profile: Option<String>,
    /// Only the explicitly requested fields may change.
    pub strict: bool,
}

impl RefineProjectCommand {
    pub fn new(change_request: impl Into<String>) -> Self {
        Self {
            change_request: change_request.into(),
            ..Default::default()
        }
    }

    pub fn with_source(mut self, document_id: DocumentId) -> Self {
        self.source_document_id = Some(document_id);
        self
    }

    pub fn with_selected_option(mut self, option: ProjectOption) -> Self {
        self.selected_option = Some(option);
        self
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

/// Result of a refinement.
#[derive(Debug, Clone, PartialEq)]
pub struct RefineProjectResult {
    /// Id of the saved version. `None` when nothing was persisted.
    pub updated_document_id: Option<DocumentId>,
    pub refine_result: RefinementResult,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RefineProjectError {
    #[error("Refinement pipeline error: {0}")]
    Pipeline(#[from] ValidationError),
}

/// What the pipeline works on once the source has been resolved.
struct RefinementInput {
    source: Option<PersistedDocument>,
    selection: Option<ProjectOption>,
    context: PlanContext,
    session_id: SessionId,
}

/// Handler for refinement commands.
pub struct RefineProjectHandler {
    ctx: StepContext,
    fallback: Arc<dyn FallbackTransformer>,
}

impl RefineProjectHandler {
    pub fn new(ctx: StepContext) -> Self {
        Self {
            ctx,
            fallback: Arc::new(KeywordFallback),
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackTransformer>) -> Self {
        self.fallback = fallback;
        self
    }

    pub async fn handle(
        &self,
        cmd: RefineProjectCommand,
        emit: &Emitter,
    ) -> Result<RefineProjectResult, RefineProjectError> {
        let language = cmd.language;
        let mut step = RefinementStep::default();
        let input = self.resolve_input(&cmd).await;

        // 1. Replay of an already saved refinement
        if let Some(existing) = self.find_sibling(&cmd, input.source.as_ref()).await {
            info!(document_id = %existing.id, "refinement replayed; returning saved version");
            emit.emit(fill(
                &self.ctx.preset(Preset::RefineSaved, language),
                &[("id", &existing.id.to_string())],
            ));
            return Ok(RefineProjectResult {
                updated_document_id: Some(existing.id),
                refine_result: stored_result(existing),
            });
        }

        // 2. ApplyEdit
        emit.emit(self.ctx.preset(Preset::RefineApplying, language) + "\n");
        let result = self.apply_edit(&cmd, &input, emit).await;
        if result.has_warning(warnings::NO_CHANGE_DETECTED) {
            emit.emit(format!("\n{}", self.ctx.preset(Preset::RefineNoChange, language)));
        } else if !result.affected_fields.is_empty() {
            emit.emit(self.ctx.localize(
                &format!("\nAffected fields: {}\n", result.affected_fields.join(", ")),
                language,
            ));
        }
        step = step.transition_to(RefinementStep::SaveVersion)?;

        // 3. SaveVersion
        let saved = if result.has_warning(warnings::INVALID_SELECTED_OPTION) {
            None
        } else {
            self.save_version(&cmd, input, &result).await
        };
        let (updated_document_id, result) = match saved {
            Some(doc) => (Some(doc.id), stored_result(doc)),
            None => (None, result),
        };
        match updated_document_id {
            Some(id) => emit.emit(fill(
                &self.ctx.preset(Preset::RefineSaved, language),
                &[("id", &id.to_string())],
            )),
            None => emit.emit(self.ctx.preset(Preset::RefineNotSaved, language)),
        }
        step = step.transition_to(RefinementStep::Done)?;
        debug!(step = ?step, document_id = ?updated_document_id, "refinement finished");

        Ok(RefineProjectResult {
            updated_document_id,
            refine_result: result,
        })
    }

    async fn resolve_input(&self, cmd: &RefineProjectCommand) -> RefinementInput {
        let source = match cmd.source_document_id {
            Some(id) => match self.ctx.documents.find_one(id).await {
                Ok(doc) => doc,
                Err(err) => {
                    warn!(document_id = %id, error = %err, "source document unavailable");
                    None
                }
            },
            None => None,
        };

        let selection = cmd
            .selected_option
            .clone()
            .or_else(|| source.as_ref().map(|doc| doc.selected_option.clone()));
        let mut context = source
            .as_ref()
            .map(|doc| doc.context.clone())
            .unwrap_or_default();
        if let Some(profile) = &cmd.class_profile {
            context.class_profile = profile.clone();
        }
        let session_id = cmd
            .session_id
            .or_else(|| source.as_ref().map(|doc| doc.session_id))
            .unwrap_or_default();

        RefinementInput {
            source,
            selection,
            context,
            session_id,
        }
    }

    async fn find_sibling(
        &self,
        cmd: &RefineProjectCommand,
        source: Option<&PersistedDocument>,
    ) -> Option<PersistedDocument> {
        let key = cmd.idempotency_key.as_ref()?;
        let filter = DocumentFilter::new()
            .with_parent_of(source.map(|doc| doc.id))
            .with_idempotency_key(key.clone())
            .with_kind(DocumentKind::Refinement);
        match self.ctx.documents.find(filter).await {
            Ok(docs) => docs.into_iter().next(),
            Err(err) => {
                warn!(error = %err, "sibling lookup failed");
                None
            }
        }
    }

    async fn apply_edit(
        &self,
        cmd: &RefineProjectCommand,
        input: &RefinementInput,
        emit: &Emitter,
    ) -> RefinementResult {
        let request_text = cmd.change_request.trim();
        let usable = input
            .selection
            .clone()
            .filter(|option| !option.display_name().trim().is_empty());
        let Some(before) = usable else {
            warn!("refinement without a usable selected option");
            return RefinementResult::unchanged(
                input.selection.clone().unwrap_or_default(),
                "No change performed (invalid selected project).",
                warnings::INVALID_SELECTED_OPTION,
            );
        };
        if request_text.is_empty() {
            let mut result = RefinementResult::unchanged(
                before.clone(),
                "No change performed (missing request).",
                warnings::MISSING_CHANGE_REQUEST,
            );
            result.reconcile(&before);
            return result;
        }

        let english = self
            .ctx
            .localizer
            .translate(request_text, cmd.language, Language::English);
        let mut agent_failed = false;

        // First attempt, streamed
        let first = self.request(cmd, input, &before, english.clone());
        let mut result = match self
            .ctx
            .stream::<RefinementResult>(first, cmd.language, emit)
            .await
        {
            Ok((result, _)) => Some(result),
            Err(failure) => {
                warn!(error = %failure, "refinement attempt failed");
                agent_failed = true;
                None
            }
        };

        // Second attempt when nothing changed
        if !changes(result.as_ref(), &before) {
            let prompt = format!("{}{}", english, FORCE_SUFFIX);
            let retry = self.request(cmd, input, &before, prompt);
            match self.ctx.generate::<RefinementResult>(retry).await {
                Ok(second) => {
                    agent_failed = false;
                    if changes(Some(&second), &before) || result.is_none() {
                        result = Some(second);
                    }
                }
                Err(failure) => warn!(error = %failure, "refinement retry failed"),
            }
        }

        let mut result = match result {
            Some(result) if changes(Some(&result), &before) => result,
            previous => {
                let patch = self.fallback.transform(request_text, &before);
                if patch.affected_fields.is_empty() {
                    let summary = previous
                        .map(|r| r.change_summary)
                        .filter(|s| !s.trim().is_empty())
                        .unwrap_or_else(|| "No change performed.".to_string());
                    RefinementResult::unchanged(
                        before.clone(),
                        summary,
                        warnings::NO_CHANGE_DETECTED,
                    )
                } else {
                    info!(fields = ?patch.affected_fields, "applied fallback patch");
                    RefinementResult {
                        updated_selection: patch.updated,
                        change_summary: patch.change_summary,
                        affected_fields: patch.affected_fields,
                        warnings: vec![warnings::FALLBACK_PATCH_APPLIED.to_string()],
                    }
                }
            }
        };

        if agent_failed {
            result.warn(warnings::REFINING_AGENT_ERROR);
        }
        if result.change_summary.trim().is_empty() {
            result.change_summary = format!("Applied teacher request: {}", request_text);
        }
        result.reconcile(&before);
        result
    }

    fn request(
        &self,
        cmd: &RefineProjectCommand,
        input: &RefinementInput,
        before: &ProjectOption,
        prompt: String,
    ) -> GenerationRequest {
        GenerationRequest::new(
            SchemaRef::Refinement,
            prompt,
            RequestMetadata::new(input.session_id, "refine_project"),
        )
        .with_deps(json!({
            "current_project": before,
            "class_profile": input.context.class_profile,
            "standards_alignment": input.context.standards,
            "knowledge_graph_result": input.context.knowledge_graph,
            "language": cmd.language.name(),
            "strict": cmd.strict,
        }))
    }

    async fn save_version(
        &self,
        cmd: &RefineProjectCommand,
        input: RefinementInput,
        result: &RefinementResult,
    ) -> Option<PersistedDocument> {
        let link = input
            .source
            .as_ref()
            .map(VersionLink::child_of)
            .unwrap_or_else(VersionLink::root);
        let doc = PersistedDocument::refinement(
            input.session_id,
            cmd.language,
            link,
            cmd.change_request.trim(),
            result,
            input.context,
            cmd.idempotency_key.clone(),
        );

        match self.ctx.documents.insert(doc.clone()).await {
            Ok(id) => {
                info!(document_id = %id, version = link.version, "refinement saved");
                Some(doc)
            }
            Err(DocumentStoreError::Duplicate { existing }) => {
                info!(document_id = %existing, "duplicate refinement; reusing saved version");
                match self.ctx.documents.find_one(existing).await {
                    Ok(Some(stored)) => Some(stored),
                    Ok(None) => {
                        warn!(document_id = %existing, "duplicate reported but not found");
                        None
                    }
                    Err(err) => {
                        warn!(
                            document_id = %existing,
                            error = %err,
                            "failed to load saved version"
                        );
                        None
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to persist refinement");
                None
            }
        }
    }
}

/// The result recorded in a saved refinement.
fn stored_result(doc: PersistedDocument) -> RefinementResult {
    RefinementResult {
        updated_selection: doc.selected_option,
        change_summary: doc.change_summary.unwrap_or_default(),
        affected_fields: doc.affected_fields,
        warnings: doc.warnings,
    }
}

fn changes(result: Option<&RefinementResult>, before: &ProjectOption) -> bool {
    result.is_some_and(|r| !diff_fields(before, &r.updated_selection).is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        InMemoryDocumentStore, MockError, MockGenerationClient, MockResponse,
    };
    use crate::application::steps::test_support::context;
    use crate::ports::DocumentStore;

    fn option() -> ProjectOption {
        ProjectOption {
            title: "Bee Garden".to_string(),
            driving_question: "How can we help bees thrive at school?".to_string(),
            end_product: "A pollinator garden plan".to_string(),
            key_skills: vec!["observation".to_string()],
            ..Default::default()
        }
    }

    fn edited(summary: &str) -> serde_json::Value {
        let mut updated = option();
        updated.end_product = "A pollinator field guide".to_string();
        json!({
            "updated_selection": updated,
            "change_summary": summary,
            "affected_fields": ["end_product"],
        })
    }

    fn unchanged_payload() -> serde_json::Value {
        json!({ "updated_selection": option(), "change_summary": "" })
    }

    fn handler(
        client: MockGenerationClient,
        documents: InMemoryDocumentStore,
    ) -> RefineProjectHandler {
        RefineProjectHandler::new(context(client, documents))
    }

    #[tokio::test]
    async fn applied_edit_is_saved_as_root_version() {
        let documents = InMemoryDocumentStore::new();
        let client = MockGenerationClient::new()
            .with_payload(SchemaRef::Refinement, edited("Turned the garden into a guide."));
        let (emit, mut rx) = Emitter::channel();

        let result = handler(client, documents.clone())
            .handle(
                RefineProjectCommand::new("make the product a field guide")
                    .with_selected_option(option()),
                &emit,
            )
            .await
            .unwrap();

        assert_eq!(result.refine_result.affected_fields, vec!["end_product"]);
        assert!(result.refine_result.warnings.is_empty());
        let id = result.updated_document_id.unwrap();
        let doc = documents.find_one(id).await.unwrap().unwrap();
        assert_eq!(doc.version, 1);
        assert!(rx.drain_text().contains("Turned the garden into a guide."));
    }

    #[tokio::test]
    async fn unchanged_first_attempt_is_retried_with_directive() {
        let client = MockGenerationClient::new()
            .with_payload(SchemaRef::Refinement, unchanged_payload())
            .with_payload(SchemaRef::Refinement, edited("Second time lucky."));
        let (emit, _rx) = Emitter::channel();

        let result = handler(client.clone(), InMemoryDocumentStore::new())
            .handle(
                RefineProjectCommand::new("field guide please").with_selected_option(option()),
                &emit,
            )
            .await
            .unwrap();

        assert_eq!(result.refine_result.change_summary, "Second time lucky.");
        let calls = client.get_calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].prompt.ends_with("Do not omit required fields."));
    }

    #[tokio::test]
    async fn fallback_patch_applies_when_generator_changes_nothing() {
        let client = MockGenerationClient::new()
            .with_default(SchemaRef::Refinement, MockResponse::Payload(unchanged_payload()));
        let (emit, _rx) = Emitter::channel();

        let result = handler(client, InMemoryDocumentStore::new())
            .handle(
                RefineProjectCommand::new("Rewrite the driving question around native plants")
                    .with_selected_option(option()),
                &emit,
            )
            .await
            .unwrap();

        let refined = result.refine_result;
        assert_eq!(refined.affected_fields, vec!["driving_question"]);
        assert!(refined.has_warning(warnings::FALLBACK_PATCH_APPLIED));
        assert!(!refined.has_warning(warnings::NO_CHANGE_DETECTED));
    }

    #[tokio::test]
    async fn failing_generator_reports_no_change() {
        let client = MockGenerationClient::new()
            .with_default(SchemaRef::Refinement, MockResponse::Error(MockError::Empty));
        let (emit, mut rx) = Emitter::channel();

        let result = handler(client, InMemoryDocumentStore::new())
            .handle(
                RefineProjectCommand::new("make it more fun").with_selected_option(option()),
                &emit,
            )
            .await
            .unwrap();

        let refined = result.refine_result;
        assert_eq!(refined.updated_selection, option());
        assert!(refined.affected_fields.is_empty());
        assert!(refined.has_warning(warnings::NO_CHANGE_DETECTED));
        assert!(refined.has_warning(warnings::REFINING_AGENT_ERROR));
        assert!(rx.drain_text().contains("could not find anything to change"));
    }

    #[tokio::test]
    async fn missing_request_skips_generation() {
        let client = MockGenerationClient::new();
        let (emit, _rx) = Emitter::channel();

        let result = handler(client.clone(), InMemoryDocumentStore::new())
            .handle(RefineProjectCommand::new("   ").with_selected_option(option()), &emit)
            .await
            .unwrap();

        assert!(result.refine_result.has_warning(warnings::MISSING_CHANGE_REQUEST));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_selection_is_not_persisted() {
        let documents = InMemoryDocumentStore::new();
        let (emit, _rx) = Emitter::channel();

        let result = handler(MockGenerationClient::new(), documents.clone())
            .handle(RefineProjectCommand::new("shorter"), &emit)
            .await
            .unwrap();

        assert!(result.refine_result.has_warning(warnings::INVALID_SELECTED_OPTION));
        assert_eq!(result.updated_document_id, None);
        assert_eq!(documents.document_count().await, 0);
    }

    #[tokio::test]
    async fn store_outage_still_returns_result() {
        let documents = InMemoryDocumentStore::new();
        documents.set_available(false);
        let client = MockGenerationClient::new()
            .with_payload(SchemaRef::Refinement, edited("Guide."));
        let (emit, mut rx) = Emitter::channel();

        let result = handler(client, documents)
            .handle(
                RefineProjectCommand::new("field guide").with_selected_option(option()),
                &emit,
            )
            .await
            .unwrap();

        assert_eq!(result.updated_document_id, None);
        assert_eq!(result.refine_result.affected_fields, vec!["end_product"]);
        assert!(rx.drain_text().contains("could not be saved"));
    }

    /// Store whose sibling lookups run before the concurrent winner lands.
    struct LateSibling(InMemoryDocumentStore);

    #[async_trait::async_trait]
    impl DocumentStore for LateSibling {
        async fn insert(&self, doc: PersistedDocument) -> Result<DocumentId, DocumentStoreError> {
            self.0.insert(doc).await
        }

        async fn find_one(
            &self,
            id: DocumentId,
        ) -> Result<Option<PersistedDocument>, DocumentStoreError> {
            self.0.find_one(id).await
        }

        async fn find(
            &self,
            _filter: DocumentFilter,
        ) -> Result<Vec<PersistedDocument>, DocumentStoreError> {
            Ok(Vec::new())
        }
    }

    fn edited_product(product: &str) -> serde_json::Value {
        let mut updated = option();
        updated.end_product = product.to_string();
        json!({
            "updated_selection": updated,
            "change_summary": format!("Product is now {}", product),
            "affected_fields": ["end_product"],
        })
    }

    #[tokio::test]
    async fn repeated_root_refinement_returns_first_result() {
        let documents = InMemoryDocumentStore::new();
        let client = MockGenerationClient::new()
            .with_payload(SchemaRef::Refinement, edited_product("field guide"))
            .with_payload(SchemaRef::Refinement, edited_product("poster"));
        let handler = handler(client.clone(), documents.clone());
        let cmd = RefineProjectCommand::new("change the product")
            .with_selected_option(option())
            .with_idempotency_key("k");
        let (emit, _rx) = Emitter::channel();

        let first = handler.handle(cmd.clone(), &emit).await.unwrap();
        let second = handler.handle(cmd, &emit).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.refine_result.updated_selection.end_product, "field guide");
        assert_eq!(client.calls_for(SchemaRef::Refinement), 1);
        assert_eq!(documents.document_count().await, 1);
    }

    #[tokio::test]
    async fn lost_insert_race_returns_stored_result() {
        let documents = InMemoryDocumentStore::new();
        let winner = PersistedDocument::refinement(
            SessionId::new(),
            Language::English,
            VersionLink::root(),
            "change the product",
            &serde_json::from_value(edited_product("field guide")).unwrap(),
            PlanContext::default(),
            Some("race".to_string()),
        );
        documents.insert(winner.clone()).await.unwrap();
        let client = MockGenerationClient::new()
            .with_payload(SchemaRef::Refinement, edited_product("poster"));
        let ctx = context(client, InMemoryDocumentStore::new());
        let ctx = StepContext {
            documents: Arc::new(LateSibling(documents.clone())),
            ..ctx
        };
        let (emit, _rx) = Emitter::channel();

        let result = RefineProjectHandler::new(ctx)
            .handle(
                RefineProjectCommand::new("change the product")
                    .with_selected_option(option())
                    .with_idempotency_key("race"),
                &emit,
            )
            .await
            .unwrap();

        assert_eq!(result.updated_document_id, Some(winner.id));
        assert_eq!(result.refine_result.updated_selection.end_product, "field guide");
        assert_eq!(documents.document_count().await, 1);
    }

    #[tokio::test]
    async fn strict_flag_and_context_are_forwarded() {
        let client = MockGenerationClient::new()
            .with_payload(SchemaRef::Refinement, edited("Guide."));
        let (emit, _rx) = Emitter::channel();

        handler(client.clone(), InMemoryDocumentStore::new())
            .handle(
                RefineProjectCommand::new("field guide")
                    .with_selected_option(option())
                    .strict(),
                &emit,
            )
            .await
            .unwrap();

        let deps = &client.get_calls()[0].deps;
        assert_eq!(deps["strict"], true);
        assert_eq!(deps["current_project"]["title"], "Bee Garden");
    }
}
