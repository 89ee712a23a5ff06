//! Document Store Port - Append/read access to versioned documents.
//!
//! Documents are immutable once inserted. Implementations must:
//! - Support concurrent independent inserts
//! - Reject a second document with the same `(parent_id, idempotency_key)`
//!   pair atomically, reporting the existing document

use async_trait::async_trait;

use crate::domain::document::{DocumentFilter, PersistedDocument};
use crate::domain::foundation::DocumentId;

/// Errors that can occur during document store operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocumentStoreError {
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    #[error("Duplicate submission; existing document {existing}")]
    Duplicate { existing: DocumentId },

    #[error("Failed to serialize document: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl DocumentStoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Port for persisted documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a new document and returns its id.
    ///
    /// # Errors
    ///
    /// - `Duplicate` if a document with the same parent and idempotency key
    ///   already exists
    /// - `Unavailable` / `Io` on storage failure
    async fn insert(&self, doc: PersistedDocument) -> Result<DocumentId, DocumentStoreError>;

    /// Finds a document by id. Returns `None` if not found.
    async fn find_one(&self, id: DocumentId)
        -> Result<Option<PersistedDocument>, DocumentStoreError>;

    /// Documents matching `filter`, ordered by version then creation time.
    async fn find(&self, filter: DocumentFilter)
        -> Result<Vec<PersistedDocument>, DocumentStoreError>;
}
