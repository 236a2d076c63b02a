//! CTF Board Server Library
//!
//! HTTP API for organizing CTF competitions: CTFs, their challenges, flag
//! submissions, and chunked challenge attachments.

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod router;
pub mod store;

use anyhow::Context;
use tracing::info;

use config::{AppState, ServerConfig};
use db::Database;

pub use router::router;

/// Connect to the database and serve the API until the listener fails.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    info!("=== CTF Board Server ===");

    let db = Database::connect(&config.database_url, config.max_connections).await?;
    let state = AppState::new(config.clone(), &db).await?;
    info!(
        "Object store ready (chunk size {} bytes, upload limit {} MB)",
        state.objects.chunk_size(),
        config.max_upload_mb
    );

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    info!("Listening on http://{}", config.addr);

    axum::serve(listener, app).await?;

    db.close().await;
    Ok(())
}
