//! Document domain module.
//!
//! Persisted documents are immutable snapshots. A selection starts a
//! version chain; every refinement appends a new document pointing back at
//! its parent. Nothing is ever updated in place.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DocumentId, Language, SessionId, Timestamp};
use crate::domain::planning::{
    KnowledgeGraph, ProjectDetails, ProjectOption, StandardsAlignment,
};
use crate::domain::refinement::RefinementResult;

/// What produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Selection,
    Refinement,
}

/// Position of a document in its version chain.
///
/// `parent_id` is a weak back-reference used for lookups only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionLink {
    pub parent_id: Option<DocumentId>,
    pub root_id: Option<DocumentId>,
    pub version: u32,
}

impl VersionLink {
    /// First document of a chain. Its root is itself.
    pub fn root() -> Self {
        Self {
            parent_id: None,
            root_id: None,
            version: 1,
        }
    }

    /// Next version after `parent`, inheriting its root.
    pub fn child_of(parent: &PersistedDocument) -> Self {
        Self {
            parent_id: Some(parent.id),
            root_id: Some(parent.root_id()),
            version: parent.version + 1,
        }
    }
}

/// Supporting context captured with a selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanContext {
    pub class_profile: String,
    pub requirements: Option<ProjectDetails>,
    pub standards: Option<StandardsAlignment>,
    pub knowledge_graph: Option<KnowledgeGraph>,
}

/// Immutable snapshot written after a selection or a refinement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedDocument {
    pub id: DocumentId,
    pub session_id: SessionId,
    pub language: Language,
    pub kind: DocumentKind,
    pub parent_id: Option<DocumentId>,
    root_id: Option<DocumentId>,
    pub version: u32,
    pub idempotency_key: Option<String>,
    pub context: PlanContext,
    pub selected_option: ProjectOption,
    pub selected_option_index: Option<usize>,
    pub all_options: Vec<ProjectOption>,
    pub change_request: Option<String>,
    pub change_summary: Option<String>,
    pub affected_fields: Vec<String>,
    pub warnings: Vec<String>,
    pub created_at: Timestamp,
}

impl PersistedDocument {
    /// Snapshot of a completed selection. Starts a new chain.
    pub fn selection(
        session_id: SessionId,
        language: Language,
        options: &[ProjectOption],
        selected_index: usize,
        context: PlanContext,
        idempotency_key: Option<String>,
    ) -> Option<Self> {
        let selected = options.get(selected_index)?.clone();
        let link = VersionLink::root();
        Some(Self {
            id: DocumentId::new(),
            session_id,
            language,
            kind: DocumentKind::Selection,
            parent_id: link.parent_id,
            root_id: link.root_id,
            version: link.version,
            idempotency_key,
            context,
            selected_option: selected,
            selected_option_index: Some(selected_index),
            all_options: options.to_vec(),
            change_request: None,
            change_summary: None,
            affected_fields: Vec::new(),
            warnings: Vec::new(),
            created_at: Timestamp::now(),
        })
    }

    /// Snapshot of a refinement positioned by `link`.
    pub fn refinement(
        session_id: SessionId,
        language: Language,
        link: VersionLink,
        change_request: impl Into<String>,
        result: &RefinementResult,
        context: PlanContext,
        idempotency_key: Option<String>,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            session_id,
            language,
            kind: DocumentKind::Refinement,
            parent_id: link.parent_id,
            root_id: link.root_id,
            version: link.version,
            idempotency_key,
            context,
            selected_option: result.updated_selection.clone(),
            selected_option_index: None,
            all_options: Vec::new(),
            change_request: Some(change_request.into()),
            change_summary: Some(result.change_summary.clone()),
            affected_fields: result.affected_fields.clone(),
            warnings: result.warnings.clone(),
            created_at: Timestamp::now(),
        }
    }

    /// First document of the chain this one belongs to.
    pub fn root_id(&self) -> DocumentId {
        self.root_id.unwrap_or(self.id)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Conjunctive filter over persisted documents. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    pub session_id: Option<SessionId>,
    /// `Some(None)` matches chain roots only.
    pub parent_id: Option<Option<DocumentId>>,
    pub root_id: Option<DocumentId>,
    pub idempotency_key: Option<String>,
    pub kind: Option<DocumentKind>,
}

impl DocumentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_parent(mut self, parent_id: DocumentId) -> Self {
        self.parent_id = Some(Some(parent_id));
        self
    }

    /// Restricts to documents with the given parent, or to roots when `None`.
    pub fn with_parent_of(mut self, parent_id: Option<DocumentId>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_root(mut self, root_id: DocumentId) -> Self {
        self.root_id = Some(root_id);
        self
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    pub fn with_kind(mut self, kind: DocumentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn matches(&self, doc: &PersistedDocument) -> bool {
        self.session_id.map_or(true, |id| doc.session_id == id)
            && self.parent_id.map_or(true, |parent| doc.parent_id == parent)
            && self.root_id.map_or(true, |id| doc.root_id() == id)
            && self
                .idempotency_key
                .as_ref()
                .map_or(true, |key| doc.idempotency_key.as_ref() == Some(key))
            && self.kind.map_or(true, |kind| doc.kind == kind)
    }
}
