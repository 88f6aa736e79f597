//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! A single Axum router exposes the diagram generation endpoint (at the
//! bare path and under `/api`) plus a health probe. CORS is open so browser
//! and workflow-tool callers can reach it directly.

pub mod diagrams;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/generate-diagrams", post(diagrams::generate_diagrams))
        .route("/api/generate-diagrams", post(diagrams::generate_diagrams))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
