pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::session::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/personas", get(handlers::handle_list_personas))
        .route("/api/v1/session", get(handlers::handle_get_session))
        .route("/api/v1/session/generate", post(handlers::handle_generate))
        .route("/api/v1/session/refine", post(handlers::handle_refine))
        .with_state(state)
}
