use std::path::PathBuf;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Configuration problems: fatal to the requested operation, never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingCredential,

    /// `path` and `reason` go to the server log only, never into the response.
    #[error("Style sample for '{persona}' is missing or empty")]
    MissingPersonaFile {
        persona: String,
        path: PathBuf,
        reason: String,
    },
}

/// Structural classification of an [`AppError`], so callers never have to
/// sniff message text to tell a failure apart from content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Fetch,
    Validation,
    Generation,
    Internal,
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Could not read {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Configuration(_) => ErrorKind::Configuration,
            AppError::Fetch { .. } => ErrorKind::Fetch,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Generation(_) => ErrorKind::Generation,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Malformed or mistyped request bodies are bad requests in the usual envelope.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Configuration(e) => {
                match e {
                    ConfigError::MissingPersonaFile { path, reason, .. } => {
                        tracing::error!("Configuration error: {e} ({}: {reason})", path.display());
                    }
                    ConfigError::MissingCredential => {
                        tracing::error!("Configuration error: {e}");
                    }
                }
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    e.to_string(),
                )
            }
            AppError::Fetch { url, message } => {
                tracing::warn!("Fetch error for {url}: {message}");
                (StatusCode::BAD_GATEWAY, "FETCH_ERROR", self.to_string())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Generation(msg) => {
                tracing::error!("Generation error: {msg}");
                (StatusCode::BAD_GATEWAY, "GENERATION_ERROR", msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "kind": self.kind(),
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
