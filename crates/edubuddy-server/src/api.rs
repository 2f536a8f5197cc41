use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use edubuddy_shared::catalog::{self, Catalog, StreamGroup};
use edubuddy_shared::reply;
use edubuddy_shared::types::ChatTurn;
use edubuddy_shared::{ChatMessage, MatchPolicy, Note, NoteMatcher};

use crate::backend::{BlobStorage, ChatCompletion, NoteStore};
use crate::blob_store::content_type_for;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::llm::assistant_conversation;
use crate::upload::{self, UploadPolicy, UploadRequest};

/// Multipart overhead allowed on top of the file size limit.
const FORM_OVERHEAD: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub notes: Arc<dyn NoteStore>,
    pub blobs: Arc<dyn BlobStorage>,
    /// `None` when no chat-completion provider is configured.
    pub assistant: Option<Arc<dyn ChatCompletion>>,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let body_limit = state.config.max_upload_size.saturating_add(FORM_OVERHEAD);

    Router::new()
        .route("/health", get(health_check))
        .route("/info", get(server_info))
        .route("/catalog", get(catalog_options))
        .route("/notes", get(search_notes).post(share_note))
        .route("/notes/by-stream", get(notes_by_stream))
        .route("/files/*key", get(download_file))
        .route("/chat", post(chat))
        .route("/assistant", post(assistant))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ServerInfoResponse {
    name: String,
    version: &'static str,
    max_upload_size: usize,
    allowed_extensions: &'static [&'static str],
    match_policy: MatchPolicy,
    assistant_enabled: bool,
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
struct SearchResponse {
    count: usize,
    notes: Vec<Note>,
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Deserialize)]
struct AssistantRequest {
    messages: Vec<ChatTurn>,
}

#[derive(Serialize)]
struct AssistantResponse {
    response: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn server_info(State(state): State<AppState>) -> Json<ServerInfoResponse> {
    Json(ServerInfoResponse {
        name: state.config.instance_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        max_upload_size: state.config.max_upload_size,
        allowed_extensions: edubuddy_shared::constants::ALLOWED_EXTENSIONS,
        match_policy: state.config.match_policy,
        assistant_enabled: state.assistant.is_some(),
    })
}

async fn catalog_options() -> Json<Catalog> {
    Json(Catalog::get())
}

async fn search_notes(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ServerError> {
    let all = state.notes.list_notes().await?;
    let matcher = NoteMatcher::with_policy(&params.q, state.config.match_policy);
    let notes = matcher.filter(&all);

    debug!(
        query = %params.q,
        policy = ?matcher.policy(),
        total = all.len(),
        matched = notes.len(),
        "Searched notes"
    );

    Ok(Json(SearchResponse {
        count: notes.len(),
        notes,
    }))
}

async fn notes_by_stream(
    State(state): State<AppState>,
) -> Result<Json<Vec<StreamGroup>>, ServerError> {
    let all = state.notes.list_notes().await?;
    Ok(Json(catalog::group_by_stream(&all)))
}

async fn share_note(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Note>), ServerError> {
    let mut req = UploadRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            req.file_name = field.file_name().map(str::to_string);
            req.data = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(format!("Failed to read file: {e}")))?;
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Failed to read field {name}: {e}")))?;
        let s = &mut req.submission;
        let slot = match name.as_str() {
            "name" => &mut s.name,
            "year" => &mut s.year,
            "semester" => &mut s.semester,
            "title" => &mut s.title,
            "subject" => &mut s.subject,
            "category" => &mut s.category,
            "description" => &mut s.description,
            _ => {
                debug!(field = %name, "Ignoring unknown form field");
                continue;
            }
        };
        *slot = value;
    }

    let policy = UploadPolicy {
        prefix: &state.config.upload_prefix,
        max_size: state.config.max_upload_size,
    };
    let note = upload::share_note(state.notes.as_ref(), state.blobs.as_ref(), policy, req).await?;

    Ok((StatusCode::CREATED, Json(note)))
}

async fn download_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let data = state.blobs.read(&key).await?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&key)),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        Bytes::from(data),
    ))
}

/// Keyword search phrased as a bot reply.
async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatMessage>, ServerError> {
    if req.message.trim().is_empty() {
        return Err(ServerError::BadRequest("Message must not be empty".into()));
    }

    let all = match state.notes.list_notes().await {
        Ok(notes) => notes,
        Err(e) => {
            warn!(error = %e, "Notes library unreachable during chat");
            return Ok(Json(reply::unavailable_reply()));
        }
    };

    let matched = NoteMatcher::with_policy(&req.message, state.config.match_policy).filter(&all);
    info!(matched = matched.len(), "Chat query answered");

    Ok(Json(reply::compose_reply(&matched)))
}

async fn assistant(
    State(state): State<AppState>,
    Json(req): Json<AssistantRequest>,
) -> Result<Json<AssistantResponse>, ServerError> {
    let Some(ref provider) = state.assistant else {
        return Err(ServerError::AssistantDisabled);
    };
    if req.messages.iter().all(|m| m.content.trim().is_empty()) {
        return Err(ServerError::BadRequest("Conversation is empty".into()));
    }

    let conversation = assistant_conversation(&req.messages);
    let response = provider.complete(&conversation).await?;

    Ok(Json(AssistantResponse { response }))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
