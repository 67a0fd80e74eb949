use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::{Document, DocumentQuery, DocumentStore, StoreError};
use crate::session::SessionUser;

pub const COLLECTION: &str = "users";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(skip)]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl User {
    pub fn from_document(doc: Document) -> Option<Self> {
        let id = doc.id;
        match serde_json::from_value::<User>(Value::Object(doc.body)) {
            Ok(user) => Some(Self { id, ..user }),
            Err(e) => {
                tracing::error!("Malformed user document {}: {}", id, e);
                None
            }
        }
    }

    pub fn session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    pub async fn find_by_email(store: &dyn DocumentStore, email: &str) -> Result<Option<User>, StoreError> {
        let query = DocumentQuery::default().field("email", normalize_email(email));
        let found = store.find(COLLECTION, &query).await?;
        Ok(found.into_iter().next().and_then(User::from_document))
    }

    pub async fn insert(
        store: &dyn DocumentStore,
        name: &str,
        email: &str,
        password_hash: String,
    ) -> Result<User, StoreError> {
        let mut body = Map::new();
        body.insert("name".into(), Value::String(name.trim().to_string()));
        body.insert("email".into(), Value::String(normalize_email(email)));
        body.insert("password_hash".into(), Value::String(password_hash));

        // Users own no one; `owner` stays empty
        let doc = store.insert(COLLECTION, None, body).await?;
        User::from_document(doc).ok_or_else(|| StoreError::Unavailable("stored user could not be read back".into()))
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryDocumentStore;

    #[tokio::test]
    async fn finds_user_case_insensitively() {
        let store = MemoryDocumentStore::new();
        let created = User::insert(&store, " Asha ", "Asha@Example.edu ", "hash".into()).await.unwrap();

        let found = User::find_by_email(&store, "asha@example.EDU").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.name, "Asha");
        assert_eq!(found.email, "asha@example.edu");
    }

    #[tokio::test]
    async fn unknown_email_is_none() {
        let store = MemoryDocumentStore::new();
        assert!(User::find_by_email(&store, "nobody@example.edu").await.unwrap().is_none());
    }
}
