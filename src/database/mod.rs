pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod store;

pub use manager::DatabaseManager;
pub use repository::Collection;
pub use store::{Document, DocumentQuery, DocumentStore, StoreError};
