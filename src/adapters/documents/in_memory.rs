//! In-memory document store for testing and single-process runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::document::{DocumentFilter, PersistedDocument};
use crate::domain::foundation::DocumentId;
use crate::ports::{DocumentStore, DocumentStoreError};

/// In-memory implementation of DocumentStore.
///
/// The duplicate check and the insert happen under one write lock, so two
/// concurrent submissions with the same parent and idempotency key resolve
/// to a single stored document.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<HashMap<DocumentId, PersistedDocument>>>,
    available: Arc<AtomicBool>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Simulates an outage: every call fails with `Unavailable` while false.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Clears all documents (useful for tests).
    pub async fn clear(&self) {
        self.documents.write().await.clear();
    }

    /// Returns the number of stored documents.
    pub async fn document_count(&self) -> usize {
        self.documents.read().await.len()
    }

    fn check_available(&self) -> Result<(), DocumentStoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DocumentStoreError::unavailable("in-memory store offline"))
        }
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Existing document sharing `doc`'s parent and idempotency key.
pub(super) fn find_duplicate<'a>(
    existing: impl IntoIterator<Item = &'a PersistedDocument>,
    doc: &PersistedDocument,
) -> Option<DocumentId> {
    let key = doc.idempotency_key.as_ref()?;
    existing
        .into_iter()
        .find(|other| {
            other.parent_id == doc.parent_id && other.idempotency_key.as_ref() == Some(key)
        })
        .map(|other| other.id)
}

pub(super) fn sort_versions(docs: &mut [PersistedDocument]) {
    docs.sort_by(|a, b| {
        a.version
            .cmp(&b.version)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, doc: PersistedDocument) -> Result<DocumentId, DocumentStoreError> {
        self.check_available()?;
        let mut documents = self.documents.write().await;
        if let Some(existing) = find_duplicate(documents.values(), &doc) {
            return Err(DocumentStoreError::Duplicate { existing });
        }
        let id = doc.id;
        documents.insert(id, doc);
        Ok(id)
    }

    async fn find_one(
        &self,
        id: DocumentId,
    ) -> Result<Option<PersistedDocument>, DocumentStoreError> {
        self.check_available()?;
        Ok(self.documents.read().await.get(&id).cloned())
    }

    async fn find(
        &self,
        filter: DocumentFilter,
    ) -> Result<Vec<PersistedDocument>, DocumentStoreError> {
        self.check_available()?;
        let mut docs: Vec<PersistedDocument> = self
            .documents
            .read()
            .await
            .values()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect();
        sort_versions(&mut docs);
        Ok(docs)
    }
}
