//! File-based document store.
//!
//! Stores each document as `{base_path}/{id}.yaml`. Inserts are serialized
//! through a mutex so the duplicate check and the write cannot interleave
//! within one process.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;

use super::in_memory::{find_duplicate, sort_versions};
use crate::domain::document::{DocumentFilter, PersistedDocument};
use crate::domain::foundation::DocumentId;
use crate::ports::{DocumentStore, DocumentStoreError};

/// File-based implementation of DocumentStore.
pub struct FileDocumentStore {
    base_path: PathBuf,
    insert_lock: Mutex<()>,
}

impl FileDocumentStore {
    /// Creates a store rooted at `base_path`. The directory is created on
    /// first write.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            insert_lock: Mutex::new(()),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn document_path(&self, id: DocumentId) -> PathBuf {
        self.base_path.join(format!("{}.yaml", id))
    }

    async fn ensure_dir(&self) -> Result<(), DocumentStoreError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| DocumentStoreError::Io(e.to_string()))
    }

    async fn read_document(&self, path: &Path) -> Result<PersistedDocument, DocumentStoreError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| DocumentStoreError::Io(e.to_string()))?;
        serde_yaml::from_str(&content).map_err(|e| DocumentStoreError::Serialization(e.to_string()))
    }

    async fn load_all(&self) -> Result<Vec<PersistedDocument>, DocumentStoreError> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.base_path)
            .await
            .map_err(|e| DocumentStoreError::Io(e.to_string()))?;
        let mut docs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DocumentStoreError::Io(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("yaml") {
                docs.push(self.read_document(&path).await?);
            }
        }
        Ok(docs)
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn insert(&self, doc: PersistedDocument) -> Result<DocumentId, DocumentStoreError> {
        let _guard = self.insert_lock.lock().await;
        self.ensure_dir().await?;

        let existing = self.load_all().await?;
        if let Some(existing) = find_duplicate(existing.iter(), &doc) {
            return Err(DocumentStoreError::Duplicate { existing });
        }

        let yaml = serde_yaml::to_string(&doc)
            .map_err(|e| DocumentStoreError::Serialization(e.to_string()))?;
        fs::write(self.document_path(doc.id), yaml)
            .await
            .map_err(|e| DocumentStoreError::Io(e.to_string()))?;
        Ok(doc.id)
    }

    async fn find_one(
        &self,
        id: DocumentId,
    ) -> Result<Option<PersistedDocument>, DocumentStoreError> {
        let path = self.document_path(id);
        if !path.exists() {
            return Ok(None);
        }
        self.read_document(&path).await.map(Some)
    }

    async fn find(
        &self,
        filter: DocumentFilter,
    ) -> Result<Vec<PersistedDocument>, DocumentStoreError> {
        let mut docs: Vec<PersistedDocument> = self
            .load_all()
            .await?
            .into_iter()
            .filter(|doc| filter.matches(doc))
            .collect();
        sort_versions(&mut docs);
        Ok(docs)
    }
}
