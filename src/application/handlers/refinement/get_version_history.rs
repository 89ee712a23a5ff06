//! GetVersionHistory - Query handler for a document's version chain.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::document::{DocumentFilter, PersistedDocument};
use crate::domain::foundation::DocumentId;
use crate::ports::{DocumentStore, DocumentStoreError};

/// Query for the chain containing `document_id`.
#[derive(Debug, Clone)]
pub struct GetVersionHistoryQuery {
    pub document_id: DocumentId,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GetVersionHistoryError {
    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    #[error(transparent)]
    Store(#[from] DocumentStoreError),
}

/// Handler returning every version of a chain, oldest first.
pub struct GetVersionHistoryHandler {
    documents: Arc<dyn DocumentStore>,
}

impl GetVersionHistoryHandler {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }

    pub async fn handle(
        &self,
        query: GetVersionHistoryQuery,
    ) -> Result<Vec<PersistedDocument>, GetVersionHistoryError> {
        let doc = self
            .documents
            .find_one(query.document_id)
            .await?
            .ok_or(GetVersionHistoryError::NotFound(query.document_id))?;

        let chain = self
            .documents
            .find(DocumentFilter::new().with_root(doc.root_id()))
            .await?;
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryDocumentStore;
    use crate::domain::document::{PlanContext, VersionLink};
    use crate::domain::foundation::{Language, SessionId};
    use crate::domain::planning::ProjectOption;
    use crate::domain::refinement::{warnings, RefinementResult};

    fn root() -> PersistedDocument {
        PersistedDocument::selection(
            SessionId::new(),
            Language::English,
            &[ProjectOption::placeholder(0)],
            0,
            PlanContext::default(),
            None,
        )
        .unwrap()
    }

    fn child(parent: &PersistedDocument) -> PersistedDocument {
        let result = RefinementResult::unchanged(
            parent.selected_option.clone(),
            "",
            warnings::NO_CHANGE_DETECTED,
        );
        PersistedDocument::refinement(
            parent.session_id,
            parent.language,
            VersionLink::child_of(parent),
            "shorter",
            &result,
            PlanContext::default(),
            None,
        )
    }

    #[tokio::test]
    async fn any_version_resolves_the_whole_chain() {
        let store = InMemoryDocumentStore::new();
        let v1 = root();
        let v2 = child(&v1);
        let v3 = child(&v2);
        let other = root();
        for doc in [&v1, &v2, &v3, &other] {
            store.insert(doc.clone()).await.unwrap();
        }
        let handler = GetVersionHistoryHandler::new(Arc::new(store));

        let chain = handler
            .handle(GetVersionHistoryQuery { document_id: v2.id })
            .await
            .unwrap();

        let ids: Vec<_> = chain.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![v1.id, v2.id, v3.id]);
    }

    #[tokio::test]
    async fn unknown_document_is_not_found() {
        let handler = GetVersionHistoryHandler::new(Arc::new(InMemoryDocumentStore::new()));
        let id = DocumentId::new();

        let err = handler
            .handle(GetVersionHistoryQuery { document_id: id })
            .await
            .unwrap_err();

        assert_eq!(err, GetVersionHistoryError::NotFound(id));
    }
}
