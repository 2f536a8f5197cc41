use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use edubuddy_shared::ValidationError;
use edubuddy_store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {size} bytes (max {max})")]
    BlobTooLarge { size: usize, max: usize },

    #[error("A file already exists under key {0}")]
    BlobExists(String),

    #[error("Blob storage error: {0}")]
    BlobStorage(String),

    #[error("Notes library unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Notes library error: {0}")]
    Store(String),

    #[error("Assistant is not configured")]
    AssistantDisabled,

    #[error("Assistant provider error: {0}")]
    Provider(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Invalid(msg) => ServerError::BadRequest(msg),
            other => ServerError::Store(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Validation(e @ ValidationError::FileTooLarge { .. }) => {
                (StatusCode::PAYLOAD_TOO_LARGE, e.to_string())
            }
            ServerError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::BlobTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            ServerError::BlobExists(_) => (StatusCode::CONFLICT, self.to_string()),
            ServerError::BlobStorage(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Blob storage error".to_string())
            }
            ServerError::StoreUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Notes library is unavailable, please try again later".to_string(),
            ),
            ServerError::Store(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to save note".to_string())
            }
            ServerError::AssistantDisabled => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            ServerError::Provider(_) => (
                StatusCode::BAD_GATEWAY,
                "The assistant could not answer right now".to_string(),
            ),
            ServerError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "request failed");
        }

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
