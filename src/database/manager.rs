use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::memory::MemoryDocumentStore;
use super::postgres::PgDocumentStore;
use super::store::{DocumentStore, StoreError};
use crate::config::AppConfig;

/// Builds the document store selected by configuration
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect to the configured store.
    ///
    /// A connection failure is logged and does not abort startup: the pool is
    /// rebuilt lazily so each request fails on its own until the database
    /// becomes reachable. A `DATABASE_URL` that cannot be parsed is fatal
    /// outside development; only development falls back to the memory store.
    pub async fn connect(config: &AppConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
        let database = &config.database;
        let Some(url) = database.url.as_deref() else {
            warn!("DATABASE_URL not set, using in-memory document store (data is lost on restart)");
            return Ok(Arc::new(MemoryDocumentStore::new()));
        };

        let options = PgPoolOptions::new()
            .max_connections(database.max_connections)
            .acquire_timeout(Duration::from_secs(database.connection_timeout));

        match options.clone().connect(url).await {
            Ok(pool) => {
                info!("Connected to document store");
                Ok(Arc::new(PgDocumentStore::new(pool)))
            }
            Err(e) => {
                error!("Failed to connect to document store: {}", e);
                match options.connect_lazy(url) {
                    Ok(pool) => Ok(Arc::new(PgDocumentStore::new(pool))),
                    Err(e) if config.is_development() => {
                        error!("Invalid DATABASE_URL ({}), falling back to in-memory store", e);
                        Ok(Arc::new(MemoryDocumentStore::new()))
                    }
                    Err(e) => Err(StoreError::Unavailable(format!("invalid DATABASE_URL: {}", e))),
                }
            }
        }
    }
}
