//! Webhook: forward generated diagrams to an external workflow endpoint.
//!
//! DESIGN
//! ======
//! The payload carries both diagram descriptions tagged `Manual` /
//! `Automation` with a timestamp each. A missing URL is a configuration
//! error surfaced before any network I/O; any non-success response or
//! transport failure is a transmission error. Nothing is retried here:
//! the caller retries by invoking `send` again.

use serde::{Deserialize, Serialize};

use crate::config::HttpTimeouts;
use crate::diagram::DiagramKind;
use crate::error::ErrorCode;
use crate::http;
use crate::timestamp::now_rfc3339;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// No webhook URL was configured.
    #[error("webhook URL not configured; set WEBHOOK_URL or pass --webhook-url")]
    NotConfigured,

    /// The webhook was unreachable or timed out.
    #[error("webhook request failed: {0}")]
    Request(String),

    /// The webhook returned a non-success HTTP status.
    #[error("webhook returned status {status}")]
    Status { status: u16, body: String },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for WebhookError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "E_WEBHOOK_NOT_CONFIGURED",
            Self::Request(_) => "E_WEBHOOK_REQUEST",
            Self::Status { .. } => "E_WEBHOOK_STATUS",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { .. })
    }
}

// =============================================================================
// PAYLOAD
// =============================================================================

/// One diagram entry in the webhook body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub timestamp: String,
}

/// Webhook body: `{ "diagrams": [ ... ] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub diagrams: Vec<DiagramEntry>,
}

impl WebhookPayload {
    /// Package the manual and automation descriptions, stamped now.
    #[must_use]
    pub fn new(manual: &str, automation: &str) -> Self {
        Self {
            diagrams: vec![entry(DiagramKind::Manual, manual), entry(DiagramKind::Automation, automation)],
        }
    }
}

fn entry(kind: DiagramKind, content: &str) -> DiagramEntry {
    DiagramEntry { kind: kind.tag().to_owned(), content: content.to_owned(), timestamp: now_rfc3339() }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct WebhookClient {
    http: reqwest::Client,
    url: Option<String>,
}

impl WebhookClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(url: Option<String>, timeouts: HttpTimeouts) -> Result<Self, WebhookError> {
        let http = http::build_client(timeouts).map_err(|e| WebhookError::HttpClientBuild(e.to_string()))?;
        Ok(Self::with_client(url, http))
    }

    #[must_use]
    pub fn with_client(url: Option<String>, http: reqwest::Client) -> Self {
        let url = url.map(|u| u.trim().to_owned()).filter(|u| !u.is_empty());
        Self { http, url }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// POST the payload as JSON.
    ///
    /// # Errors
    ///
    /// `NotConfigured` without touching the network when no URL is set;
    /// `Request` / `Status` when delivery fails.
    pub async fn send(&self, payload: &WebhookPayload) -> Result<(), WebhookError> {
        let Some(url) = self.url.as_deref() else {
            return Err(WebhookError::NotConfigured);
        };

        let response = self
            .http
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| WebhookError::Request(http::describe_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "webhook rejected diagrams");
            return Err(WebhookError::Status { status: status.as_u16(), body });
        }

        tracing::info!(status = status.as_u16(), count = payload.diagrams.len(), "diagrams sent to webhook");
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
