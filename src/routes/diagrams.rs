//! Diagram generation route.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::services::generate::{self, DiagramFailure, RenderedDiagram};
use crate::state::AppState;
use crate::timestamp::now_rfc3339;

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDiagramsBody {
    pub manual_steps: Option<String>,
    pub automation_steps: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramResponse {
    pub png: String,
    pub mermaid_code: String,
}

impl From<RenderedDiagram> for DiagramResponse {
    fn from(diagram: RenderedDiagram) -> Self {
        Self { png: diagram.png, mermaid_code: diagram.mermaid_code }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramsResponse {
    pub manual: DiagramResponse,
    pub automation: DiagramResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateDiagramsResponse {
    pub success: bool,
    pub diagrams: DiagramsResponse,
    pub timestamp: String,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized: Invalid API key")]
    Unauthorized,

    #[error("Missing required fields: manualSteps and automationSteps")]
    MissingFields,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Failed to generate diagrams")]
    Render(#[from] DiagramFailure),
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "E_UNAUTHORIZED",
            Self::MissingFields | Self::InvalidBody(_) => "E_VALIDATION",
            Self::Render(failure) => failure.source.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Render(failure) => failure.source.retryable(),
            _ => false,
        }
    }
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MissingFields | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({
            "error": self.to_string(),
            "code": self.error_code(),
        });
        if let Self::Render(failure) = &self {
            body["details"] = serde_json::Value::String(failure.to_string());
            body["retryable"] = serde_json::Value::Bool(self.retryable());
        }
        (self.status(), Json(body)).into_response()
    }
}

// =============================================================================
// HANDLER
// =============================================================================

/// `POST /generate-diagrams`: build and render both process diagrams.
pub async fn generate_diagrams(
    State(state): State<AppState>,
    body: Result<Json<GenerateDiagramsBody>, JsonRejection>,
) -> Result<Json<GenerateDiagramsResponse>, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;

    authorize(state.config.api_key.as_deref(), body.api_key.as_deref())?;
    let (manual_steps, automation_steps) = required_steps(&body)?;

    let pair = generate::generate_pair(state.renderer.as_ref(), manual_steps, automation_steps).await;
    let (manual, automation) = pair.into_both()?;

    tracing::info!(
        manual_bytes = manual.png.len(),
        automation_bytes = automation.png.len(),
        "diagrams generated"
    );

    Ok(Json(GenerateDiagramsResponse {
        success: true,
        diagrams: DiagramsResponse { manual: manual.into(), automation: automation.into() },
        timestamp: now_rfc3339(),
    }))
}

/// With a configured secret, the caller's key must match it exactly.
fn authorize(expected: Option<&str>, provided: Option<&str>) -> Result<(), ApiError> {
    match expected {
        Some(secret) if provided != Some(secret) => {
            tracing::warn!("rejected generate-diagrams call with invalid API key");
            Err(ApiError::Unauthorized)
        }
        _ => Ok(()),
    }
}

fn required_steps(body: &GenerateDiagramsBody) -> Result<(&str, &str), ApiError> {
    let manual = non_blank(body.manual_steps.as_deref());
    let automation = non_blank(body.automation_steps.as_deref());
    match (manual, automation) {
        (Some(manual), Some(automation)) => Ok((manual, automation)),
        _ => Err(ApiError::MissingFields),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "diagrams_test.rs"]
mod tests;
