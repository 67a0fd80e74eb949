pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod schema;
pub mod session;
pub mod state;
pub mod views;

pub use app::{app, service, AppService};
pub use state::AppState;
