//! Outbound HTTP client construction shared by the renderer and webhook.

use std::time::Duration;

use crate::config::HttpTimeouts;

/// Build a `reqwest` client bounded by the configured timeouts.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_client(timeouts: HttpTimeouts) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeouts.request_secs))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .user_agent(concat!("procflow/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Flatten a `reqwest` error, tagging timeouts explicitly.
#[must_use]
pub fn describe_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("timed out: {err}")
    } else {
        err.to_string()
    }
}
