use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Errors from a document store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: Uuid },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// A stored document: envelope fields plus a free-form JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: Uuid,
    pub collection: String,
    pub owner: Option<Uuid>,
    pub body: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.body.get(field).and_then(Value::as_str)
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner == Some(user_id)
    }
}

/// Equality filter over the owner reference and top-level body fields.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    pub owner: Option<Uuid>,
    pub fields: Map<String, Value>,
}

impl DocumentQuery {
    pub fn owned_by(owner: Uuid) -> Self {
        Self {
            owner: Some(owner),
            ..Default::default()
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        if let Some(owner) = self.owner {
            if doc.owner != Some(owner) {
                return false;
            }
        }
        self.fields
            .iter()
            .all(|(name, value)| doc.body.get(name) == Some(value))
    }
}

/// Persistence interface the handlers call through.
///
/// Results are returned in insertion order. Writes are single-document and
/// last-write-wins; no backend offers compare-and-swap.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(
        &self,
        collection: &str,
        owner: Option<Uuid>,
        body: Map<String, Value>,
    ) -> Result<Document, StoreError>;

    async fn find(&self, collection: &str, query: &DocumentQuery) -> Result<Vec<Document>, StoreError>;

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError>;

    /// Replace the body of an existing document.
    async fn replace(&self, collection: &str, id: Uuid, body: Map<String, Value>) -> Result<Document, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(owner: Option<Uuid>, body: Value) -> Document {
        let now = Utc::now();
        Document {
            id: Uuid::new_v4(),
            collection: "swayam".into(),
            owner,
            body: body.as_object().cloned().unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn query_matches_owner_and_fields() {
        let owner = Uuid::new_v4();
        let d = doc(Some(owner), json!({ "academic_year": "2023-2024", "swayam_duration": 4 }));

        assert!(DocumentQuery::owned_by(owner).matches(&d));
        assert!(DocumentQuery::owned_by(owner).field("academic_year", "2023-2024").matches(&d));
        assert!(!DocumentQuery::owned_by(owner).field("academic_year", "2022-2023").matches(&d));
        assert!(!DocumentQuery::owned_by(Uuid::new_v4()).matches(&d));
    }

    #[test]
    fn unowned_documents_only_match_ownerless_queries() {
        let d = doc(None, json!({ "email": "a@b.c" }));
        assert!(DocumentQuery::default().field("email", "a@b.c").matches(&d));
        assert!(!DocumentQuery::owned_by(Uuid::new_v4()).matches(&d));
    }
}
