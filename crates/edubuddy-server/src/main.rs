//! # edubuddy-server
//!
//! HTTP backend for EduBuddy, a shared library of study notes.
//!
//! This binary provides:
//! - **Note search** by keyword over every shared note
//! - **Note sharing**: multipart upload of a file plus its catalog metadata
//! - **File serving** for uploaded notes
//! - **Chat**: a note-search bot and a proxy to an OpenAI-compatible
//!   chat-completion provider

mod api;
mod backend;
mod blob_store;
mod config;
mod error;
mod llm;
mod upload;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use edubuddy_store::Database;

use crate::api::AppState;
use crate::backend::{ChatCompletion, SqliteNoteStore};
use crate::blob_store::BlobStore;
use crate::config::ServerConfig;
use crate::llm::OpenAiChat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,edubuddy_server=debug")),
        )
        .init();

    info!("Starting EduBuddy server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Open the document store and check it answers
    // -----------------------------------------------------------------------
    let db = match config.database_path {
        Some(ref path) => Database::open_at(path)?,
        None => Database::new()?,
    };
    if let Some(path) = db.path() {
        info!(path = %path.display(), "Database opened");
    }

    let note_store = Arc::new(SqliteNoteStore::new(db));
    match note_store.count_notes().await {
        Ok(count) => info!(notes = count, "Notes library reachable"),
        Err(e) => warn!(error = %e, "Notes library check failed"),
    }

    // -----------------------------------------------------------------------
    // 4. Blob store and chat-completion provider
    // -----------------------------------------------------------------------
    let blob_store = Arc::new(
        BlobStore::new(
            config.blob_storage_path.clone(),
            config.max_upload_size,
            config.public_base_url.clone(),
        )
        .await?,
    );

    let assistant = OpenAiChat::from_config(&config)?
        .map(|chat| Arc::new(chat) as Arc<dyn ChatCompletion>);
    if !config.assistant_enabled() {
        info!("OPENAI_API_KEY not set, assistant endpoint disabled");
    }

    let http_addr = config.http_addr;
    let app_state = AppState {
        notes: note_store,
        blobs: blob_store,
        assistant,
        config: Arc::new(config),
    };

    // -----------------------------------------------------------------------
    // 5. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
