use std::sync::Arc;

use anyhow::Context;
use axum::{extract::Request, ServiceExt};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use faculty_appraisal::{config, database::DatabaseManager, service, views::HtmlRenderer, AppState};

#[derive(Parser)]
#[command(name = "faculty-appraisal")]
#[command(about = "Faculty self-appraisal web application")]
#[command(version)]
struct Cli {
    /// Listen port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Postgres connection string (overrides DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SESSION_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = config::config().clone();
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(url) = cli.database_url {
        config.database.url = Some(url);
    }
    tracing::info!("Starting faculty appraisal in {:?} mode", config.environment);

    if config.session.secret.is_empty() {
        anyhow::bail!("SESSION_SECRET must be set outside development");
    }

    let store = DatabaseManager::connect(&config)
        .await
        .context("failed to open document store")?;
    let port = config.server.port;
    let state = AppState::new(config, store, Arc::new(HtmlRenderer));

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Server running on port {}", port);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(service(state)))
        .await
        .context("server error")?;

    Ok(())
}
