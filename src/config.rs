//! Service configuration parsed from environment variables.

use crate::error::ErrorCode;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_RENDER_BASE_URL: &str = "https://mermaid.ink";
pub const DEFAULT_RENDER_THEME: &str = "neutral";
pub const DEFAULT_HTTP_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid { .. } => "E_CONFIG_INVALID",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_HTTP_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_HTTP_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Base URL of a mermaid.ink-compatible service, without trailing `/`.
    pub base_url: String,
    /// Theme requested for SVG previews.
    pub theme: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_RENDER_BASE_URL.to_owned(), theme: DEFAULT_RENDER_THEME.to_owned() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Shared secret for inbound API calls. `None` disables the check.
    pub api_key: Option<String>,
    pub render: RenderConfig,
    pub timeouts: HttpTimeouts,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_key: None,
            render: RenderConfig::default(),
            timeouts: HttpTimeouts::default(),
        }
    }
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// All optional:
    /// - `PORT`: default 3000
    /// - `API_KEY`: shared secret; empty is treated as unset
    /// - `RENDER_BASE_URL`: default `https://mermaid.ink`
    /// - `RENDER_THEME`: default `neutral`
    /// - `HTTP_REQUEST_TIMEOUT_SECS`: default 10
    /// - `HTTP_CONNECT_TIMEOUT_SECS`: default 5
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but not a valid port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value: raw.clone() })?,
            Err(_) => DEFAULT_PORT,
        };

        let api_key = env_non_empty("API_KEY");

        let render = RenderConfig {
            base_url: normalize_base_url(
                &env_non_empty("RENDER_BASE_URL").unwrap_or_else(|| DEFAULT_RENDER_BASE_URL.to_owned()),
            ),
            theme: env_non_empty("RENDER_THEME").unwrap_or_else(|| DEFAULT_RENDER_THEME.to_owned()),
        };

        let timeouts = HttpTimeouts {
            request_secs: env_parse_u64("HTTP_REQUEST_TIMEOUT_SECS", DEFAULT_HTTP_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("HTTP_CONNECT_TIMEOUT_SECS", DEFAULT_HTTP_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { port, api_key, render, timeouts })
    }
}

/// Webhook URL from `WEBHOOK_URL`, falling back to the legacy
/// `POWER_AUTOMATE_WEBHOOK_URL`. Empty values are treated as unset.
#[must_use]
pub fn webhook_url_from_env() -> Option<String> {
    env_non_empty("WEBHOOK_URL").or_else(|| env_non_empty("POWER_AUTOMATE_WEBHOOK_URL"))
}

/// An explicit non-blank URL wins; otherwise the environment decides.
#[must_use]
pub fn resolve_webhook_url(explicit: Option<String>) -> Option<String> {
    explicit
        .map(|url| url.trim().to_owned())
        .filter(|url| !url.is_empty())
        .or_else(webhook_url_from_env)
}

/// Strip trailing slashes so paths can be appended with `format!`.
#[must_use]
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
