use std::sync::Arc;

use super::*;
use crate::config::AppConfig;
use crate::render::png_data_uri;
use crate::state::test_helpers::{FAKE_PNG, FakeRenderer, spawn_server, test_app_state};

fn body(manual: Option<&str>, automation: Option<&str>, api_key: Option<&str>) -> GenerateDiagramsBody {
    GenerateDiagramsBody {
        manual_steps: manual.map(str::to_owned),
        automation_steps: automation.map(str::to_owned),
        api_key: api_key.map(str::to_owned),
    }
}

fn config_with_key(key: &str) -> AppConfig {
    AppConfig { api_key: Some(key.to_owned()), ..AppConfig::default() }
}

async fn call(state: AppState, body: GenerateDiagramsBody) -> Result<Json<GenerateDiagramsResponse>, ApiError> {
    generate_diagrams(State(state), Ok(Json(body))).await
}

// =============================================================================
// handler
// =============================================================================

#[tokio::test]
async fn generates_both_diagrams() {
    let renderer = Arc::new(FakeRenderer::default());
    let state = test_app_state(AppConfig::default(), renderer.clone());

    let Json(resp) = call(state, body(Some("A\nB\nC"), Some("Auto"), None)).await.unwrap();
    assert!(resp.success);
    assert_eq!(resp.diagrams.manual.mermaid_code, crate::diagram::mermaid("A\nB\nC"));
    assert_eq!(resp.diagrams.automation.mermaid_code, crate::diagram::mermaid("Auto"));
    assert_eq!(resp.diagrams.manual.png, png_data_uri(FAKE_PNG));
    assert!(resp.diagrams.automation.png.starts_with("data:image/png;base64,"));
    assert!(resp.timestamp.ends_with('Z'));
    assert_eq!(renderer.call_count(), 2);
}

#[tokio::test]
async fn renderer_receives_built_mermaid_sources() {
    let renderer = Arc::new(FakeRenderer::default());
    let state = test_app_state(AppConfig::default(), renderer.clone());
    let manual = "Receive \"urgent\" email\n\n  Forward to team  ";
    let automation = "Webhook\r\nAuto-assign";

    call(state, body(Some(manual), Some(automation), None)).await.unwrap();

    let mut expected = vec![crate::diagram::mermaid(manual), crate::diagram::mermaid(automation)];
    expected.sort();
    assert_eq!(renderer.seen_sorted(), expected);
}

#[tokio::test]
async fn mismatched_api_key_is_unauthorized() {
    let renderer = Arc::new(FakeRenderer::default());
    let state = test_app_state(config_with_key("s3cret"), renderer.clone());

    let err = call(state, body(Some("A"), Some("B"), Some("wrong"))).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(renderer.call_count(), 0);
}

#[tokio::test]
async fn missing_api_key_is_unauthorized_when_secret_configured() {
    let renderer = Arc::new(FakeRenderer::default());
    let state = test_app_state(config_with_key("s3cret"), renderer.clone());

    let err = call(state, body(Some("A"), Some("B"), None)).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn matching_api_key_is_accepted() {
    let renderer = Arc::new(FakeRenderer::default());
    let state = test_app_state(config_with_key("s3cret"), renderer.clone());

    assert!(call(state, body(Some("A"), Some("B"), Some("s3cret"))).await.is_ok());
}

#[tokio::test]
async fn api_key_ignored_without_secret() {
    let renderer = Arc::new(FakeRenderer::default());
    let state = test_app_state(AppConfig::default(), renderer);

    assert!(call(state, body(Some("A"), Some("B"), Some("anything"))).await.is_ok());
}

#[tokio::test]
async fn missing_automation_steps_is_bad_request() {
    let renderer = Arc::new(FakeRenderer::default());
    let state = test_app_state(AppConfig::default(), renderer.clone());

    let err = call(state, body(Some("A"), None, None)).await.unwrap_err();
    assert!(matches!(err, ApiError::MissingFields));
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(renderer.call_count(), 0);
}

#[tokio::test]
async fn blank_manual_steps_is_bad_request() {
    let renderer = Arc::new(FakeRenderer::default());
    let state = test_app_state(AppConfig::default(), renderer.clone());

    let err = call(state, body(Some(" \n\t"), Some("B"), None)).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(renderer.call_count(), 0);
}

#[tokio::test]
async fn auth_checked_before_validation() {
    let renderer = Arc::new(FakeRenderer::default());
    let state = test_app_state(config_with_key("s3cret"), renderer);

    let err = call(state, body(None, None, Some("wrong"))).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn render_failure_is_internal_error_with_details() {
    let renderer = Arc::new(FakeRenderer::failing_on("explode"));
    let state = test_app_state(AppConfig::default(), renderer.clone());

    let err = call(state, body(Some("fine"), Some("explode"), None)).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.error_code(), "E_RENDER_STATUS");
    assert!(err.retryable());
    assert_eq!(renderer.call_count(), 2);
}

// =============================================================================
// error responses
// =============================================================================

async fn response_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn render_error_response_body() {
    let renderer = Arc::new(FakeRenderer::failing_on("explode"));
    let state = test_app_state(AppConfig::default(), renderer);

    let err = call(state, body(Some("explode"), Some("fine"), None)).await.unwrap_err();
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = response_json(response).await;
    assert_eq!(json["error"], "Failed to generate diagrams");
    assert_eq!(json["details"], "manual diagram: render service returned status 503");
}

#[tokio::test]
async fn unauthorized_response_body() {
    let response = ApiError::Unauthorized.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = response_json(response).await;
    assert_eq!(json["error"], "Unauthorized: Invalid API key");
    assert_eq!(json["code"], "E_UNAUTHORIZED");
    assert!(json.get("details").is_none());
}

// =============================================================================
// router
// =============================================================================

#[tokio::test]
async fn router_serves_camel_case_contract() {
    let renderer = Arc::new(FakeRenderer::default());
    let base = spawn_server(crate::routes::app(test_app_state(AppConfig::default(), renderer))).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/generate-diagrams"))
        .json(&serde_json::json!({ "manualSteps": "Receive email\nReply", "automationSteps": "Webhook" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["success"], true);
    assert!(json["diagrams"]["manual"]["mermaidCode"].as_str().unwrap().contains("Step2[\"Reply\"]"));
    assert!(json["diagrams"]["automation"]["png"].as_str().unwrap().starts_with("data:image/png;base64,"));
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn router_api_alias_and_malformed_body() {
    let renderer = Arc::new(FakeRenderer::default());
    let base = spawn_server(crate::routes::app(test_app_state(AppConfig::default(), renderer.clone()))).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/generate-diagrams"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["code"], "E_VALIDATION");
    assert_eq!(renderer.call_count(), 0);
}

#[tokio::test]
async fn router_healthz() {
    let renderer = Arc::new(FakeRenderer::default());
    let base = spawn_server(crate::routes::app(test_app_state(AppConfig::default(), renderer))).await;
    let response = reqwest::get(format!("{base}/healthz")).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
}
