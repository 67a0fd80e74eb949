use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{types::Json, FromRow, PgPool};
use tokio::sync::OnceCell;
use tracing::info;
use uuid::Uuid;

use super::store::{Document, DocumentQuery, DocumentStore, StoreError};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        id UUID PRIMARY KEY,
        collection TEXT NOT NULL,
        owner UUID NULL,
        body JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
"#;

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS documents_collection_owner_idx ON documents (collection, owner)";

const COLUMNS: &str = "id, collection, owner, body, created_at, updated_at";

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: Uuid,
    collection: String,
    owner: Option<Uuid>,
    body: Json<Map<String, Value>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            collection: row.collection,
            owner: row.owner,
            body: row.body.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Documents kept in a single JSONB table keyed by collection name.
pub struct PgDocumentStore {
    pool: PgPool,
    ready: OnceCell<()>,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            ready: OnceCell::new(),
        }
    }

    /// Create the documents table on first use. A lazily connected pool
    /// defers this until the database is actually reachable.
    async fn pool(&self) -> Result<&PgPool, StoreError> {
        self.ready
            .get_or_try_init(|| async {
                sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
                sqlx::query(CREATE_INDEX).execute(&self.pool).await?;
                info!("Document table ready");
                Ok::<_, StoreError>(())
            })
            .await?;
        Ok(&self.pool)
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(
        &self,
        collection: &str,
        owner: Option<Uuid>,
        body: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let sql = format!(
            "INSERT INTO documents (id, collection, owner, body) VALUES ($1, $2, $3, $4) RETURNING {}",
            COLUMNS
        );
        let row: DocumentRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(collection)
            .bind(owner)
            .bind(Json(body))
            .fetch_one(self.pool().await?)
            .await?;
        Ok(row.into())
    }

    async fn find(&self, collection: &str, query: &DocumentQuery) -> Result<Vec<Document>, StoreError> {
        // JSONB containment covers the top-level equality filter
        let sql = format!(
            "SELECT {} FROM documents \
             WHERE collection = $1 AND ($2::uuid IS NULL OR owner = $2) AND body @> $3 \
             ORDER BY created_at, id",
            COLUMNS
        );
        let rows: Vec<DocumentRow> = sqlx::query_as(&sql)
            .bind(collection)
            .bind(query.owner)
            .bind(Json(&query.fields))
            .fetch_all(self.pool().await?)
            .await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError> {
        let sql = format!("SELECT {} FROM documents WHERE collection = $1 AND id = $2", COLUMNS);
        let row: Option<DocumentRow> = sqlx::query_as(&sql)
            .bind(collection)
            .bind(id)
            .fetch_optional(self.pool().await?)
            .await?;
        Ok(row.map(Document::from))
    }

    async fn replace(&self, collection: &str, id: Uuid, body: Map<String, Value>) -> Result<Document, StoreError> {
        let sql = format!(
            "UPDATE documents SET body = $3, updated_at = now() \
             WHERE collection = $1 AND id = $2 RETURNING {}",
            COLUMNS
        );
        let row: Option<DocumentRow> = sqlx::query_as(&sql)
            .bind(collection)
            .bind(id)
            .bind(Json(body))
            .fetch_optional(self.pool().await?)
            .await?;
        row.map(Document::from).ok_or_else(|| StoreError::NotFound {
            collection: collection.to_string(),
            id,
        })
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(self.pool().await?).await?;
        Ok(())
    }
}
