use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;

use super::*;
use crate::state::test_helpers::spawn_server;

type Received = Arc<Mutex<Vec<WebhookPayload>>>;

async fn capture(State(received): State<Received>, Json(payload): Json<WebhookPayload>) -> StatusCode {
    received.lock().expect("received mutex should lock").push(payload);
    StatusCode::ACCEPTED
}

async fn capturing_server() -> (String, Received) {
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let router = Router::new().route("/hook", post(capture)).with_state(received.clone());
    let base = spawn_server(router).await;
    (format!("{base}/hook"), received)
}

#[test]
fn payload_shape() {
    let payload = WebhookPayload::new("graph TD\nmanual", "graph TD\nauto");
    let json = serde_json::to_value(&payload).unwrap();
    let diagrams = json["diagrams"].as_array().unwrap();
    assert_eq!(diagrams.len(), 2);
    assert_eq!(diagrams[0]["type"], "Manual");
    assert_eq!(diagrams[0]["content"], "graph TD\nmanual");
    assert_eq!(diagrams[1]["type"], "Automation");
    assert_eq!(diagrams[1]["content"], "graph TD\nauto");
    assert!(diagrams[1]["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn send_without_url_is_config_error() {
    let client = WebhookClient::new(None, HttpTimeouts::default()).unwrap();
    assert!(!client.is_configured());
    let err = client.send(&WebhookPayload::new("a", "b")).await.unwrap_err();
    assert!(matches!(err, WebhookError::NotConfigured));
    assert_eq!(err.error_code(), "E_WEBHOOK_NOT_CONFIGURED");
    assert!(!err.retryable());
}

#[tokio::test]
async fn blank_url_counts_as_unconfigured() {
    let client = WebhookClient::new(Some("   ".into()), HttpTimeouts::default()).unwrap();
    assert!(!client.is_configured());
}

#[tokio::test]
async fn send_posts_json_payload() {
    let (url, received) = capturing_server().await;
    let client = WebhookClient::new(Some(url), HttpTimeouts::default()).unwrap();
    let payload = WebhookPayload::new("manual source", "automation source");

    client.send(&payload).await.unwrap();

    let got = received.lock().unwrap();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0], payload);
}

#[tokio::test]
async fn send_non_success_is_transmission_failure() {
    let router = Router::new().fallback(|| async { (StatusCode::BAD_GATEWAY, "flow disabled") });
    let base = spawn_server(router).await;
    let client = WebhookClient::new(Some(base), HttpTimeouts::default()).unwrap();

    let err = client.send(&WebhookPayload::new("a", "b")).await.unwrap_err();
    assert!(matches!(&err, WebhookError::Status { status: 502, body } if body == "flow disabled"));
    assert!(err.retryable());
}

#[tokio::test]
async fn send_retry_after_failure_succeeds() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/hook",
            post(|State(attempts): State<Arc<AtomicUsize>>| async move {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    StatusCode::SERVICE_UNAVAILABLE
                } else {
                    StatusCode::OK
                }
            }),
        )
        .with_state(attempts.clone());
    let base = spawn_server(router).await;
    let client = WebhookClient::new(Some(format!("{base}/hook")), HttpTimeouts::default()).unwrap();
    let payload = WebhookPayload::new("a", "b");

    assert!(matches!(client.send(&payload).await, Err(WebhookError::Status { status: 503, .. })));
    client.send(&payload).await.unwrap();
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn send_timeout_is_transmission_failure() {
    let router = Router::new().fallback(|| async {
        tokio::time::sleep(Duration::from_secs(2)).await;
        StatusCode::OK
    });
    let base = spawn_server(router).await;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let client = WebhookClient::with_client(Some(base), http);

    let err = client.send(&WebhookPayload::new("a", "b")).await.unwrap_err();
    assert!(matches!(&err, WebhookError::Request(msg) if msg.contains("timed out")));
}
