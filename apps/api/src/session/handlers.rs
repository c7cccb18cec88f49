//! Axum route handlers for the session boundary consumed by the UI.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::content::SourceContent;
use crate::errors::AppError;
use crate::generation::client::GenerationOutput;
use crate::persona::Persona;
use crate::session::SessionSnapshot;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub persona_id: String,
    #[serde(default)]
    pub url: Option<String>,
    /// Pasted article text. Takes priority over `url` when both are set.
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PersonaListResponse {
    pub personas: Vec<Persona>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/personas
pub async fn handle_list_personas(State(state): State<AppState>) -> Json<PersonaListResponse> {
    Json(PersonaListResponse {
        personas: state.ghostwriter.personas().to_vec(),
    })
}

/// GET /api/v1/session
///
/// Served from the last published snapshot, so it never waits on the session
/// lock. While a generate/refine is running it shows the state before that call.
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.snapshot())
}

/// POST /api/v1/session/generate
///
/// Input validation happens before the session lock is taken.
pub async fn handle_generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerationOutput>, AppError> {
    let Json(request) = payload?;
    if request.persona_id.trim().is_empty() {
        return Err(AppError::Validation("persona_id cannot be empty".to_string()));
    }
    let source = SourceContent::from_inputs(request.url.as_deref(), request.text.as_deref())?;

    let mut session = state.session.lock().await;
    let result = state
        .ghostwriter
        .generate(&mut session, request.persona_id.trim(), &source)
        .await;
    state.publish(&session);

    Ok(Json(result?))
}

/// POST /api/v1/session/refine
pub async fn handle_refine(
    State(state): State<AppState>,
    payload: Result<Json<RefineRequest>, JsonRejection>,
) -> Result<Json<GenerationOutput>, AppError> {
    let Json(request) = payload?;
    let feedback = request.feedback.unwrap_or_default();

    let mut session = state.session.lock().await;
    let result = state.ghostwriter.refine(&mut session, &feedback).await;
    state.publish(&session);

    Ok(Json(result?))
}
