use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{Document, DocumentQuery, DocumentStore, StoreError};

/// Process-local document store. Used when no `DATABASE_URL` is configured.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    documents: Arc<RwLock<Vec<Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(
        &self,
        collection: &str,
        owner: Option<Uuid>,
        body: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let now = Utc::now();
        let doc = Document {
            id: Uuid::new_v4(),
            collection: collection.to_string(),
            owner,
            body,
            created_at: now,
            updated_at: now,
        };
        self.documents.write().await.push(doc.clone());
        Ok(doc)
    }

    async fn find(&self, collection: &str, query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|d| d.collection == collection && query.matches(d))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .find(|d| d.collection == collection && d.id == id)
            .cloned())
    }

    async fn replace(&self, collection: &str, id: Uuid, body: Map<String, Value>) -> Result<Document, StoreError> {
        let mut documents = self.documents.write().await;
        let doc = documents
            .iter_mut()
            .find(|d| d.collection == collection && d.id == id)
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id,
            })?;
        doc.body = body;
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
