use chrono::Duration;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{Collection, DocumentStore};
use crate::schema::Schema;
use crate::session::SessionStore;
use crate::views::ViewRenderer;

/// Shared application state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub sessions: SessionStore,
    pub views: Arc<dyn ViewRenderer>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>, views: Arc<dyn ViewRenderer>) -> Self {
        let ttl = Duration::hours(config.session.ttl_hours as i64);
        Self {
            config: Arc::new(config),
            store,
            sessions: SessionStore::new(ttl),
            views,
        }
    }

    pub fn collection(&self, schema: &'static Schema) -> Collection {
        Collection::new(schema, self.store.clone())
    }
}
