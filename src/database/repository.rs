use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::store::{Document, DocumentQuery, DocumentStore};
use crate::error::AppError;
use crate::schema::Schema;

/// Schema-validated access to one collection of the document store.
pub struct Collection {
    schema: &'static Schema,
    store: Arc<dyn DocumentStore>,
}

impl Collection {
    pub fn new(schema: &'static Schema, store: Arc<dyn DocumentStore>) -> Self {
        Self { schema, store }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Validate `input` and persist it as a new document owned by `owner`.
    /// `stamp` fields are added after validation and are not user-editable.
    pub async fn create(
        &self,
        owner: Uuid,
        input: &HashMap<String, String>,
        stamp: Map<String, Value>,
    ) -> Result<Document, AppError> {
        let mut body = self.schema.validate(input)?;
        body.extend(stamp);
        Ok(self.store.insert(self.schema.collection, Some(owner), body).await?)
    }

    pub async fn list(&self, query: &DocumentQuery) -> Result<Vec<Document>, AppError> {
        Ok(self.store.find(self.schema.collection, query).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        Ok(self.store.find_by_id(self.schema.collection, id).await?)
    }

    /// Validate `input` and overwrite the schema fields of `existing`.
    /// Body keys outside the schema (stamps) are carried over unchanged.
    pub async fn update(&self, existing: &Document, input: &HashMap<String, String>) -> Result<Document, AppError> {
        let fields = self.schema.validate(input)?;

        let mut body: Map<String, Value> = existing
            .body
            .iter()
            .filter(|(k, _)| self.schema.field(k).is_none())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        body.extend(fields);

        Ok(self.store.replace(self.schema.collection, existing.id, body).await?)
    }

    /// Set `field` to `value` on every document matching `query`, leaving the
    /// rest of each body untouched. Returns how many documents were rewritten.
    pub async fn restamp(&self, query: &DocumentQuery, field: &str, value: &str) -> Result<usize, AppError> {
        let matching = self.store.find(self.schema.collection, query).await?;
        for doc in &matching {
            let mut body = doc.body.clone();
            body.insert(field.to_string(), Value::String(value.to_string()));
            self.store.replace(self.schema.collection, doc.id, body).await?;
        }
        Ok(matching.len())
    }
}
