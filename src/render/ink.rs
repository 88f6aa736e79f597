//! mermaid.ink client.
//!
//! Thin HTTP wrapper around `GET /img/{encoded}?type=png` and
//! `GET /svg/{encoded}`. The diagram source is base64url-encoded into the
//! path. Response validation lives in pure helpers for testability.
//!
//! SVG requests switch flowchart labels to native `<text>`; resvg does not
//! draw the default `<foreignObject>` HTML labels.

use crate::config::{HttpTimeouts, RenderConfig};
use crate::http;

use super::{DiagramRenderer, RenderError, encode_for_url};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Mermaid init directive selecting plain SVG text for flowchart labels.
pub const SVG_TEXT_LABELS: &str = r#"%%{init: {"flowchart": {"htmlLabels": false}}}%%"#;

// =============================================================================
// CLIENT
// =============================================================================

pub struct InkRenderer {
    http: reqwest::Client,
    base_url: String,
    theme: String,
}

impl InkRenderer {
    /// Build a renderer with its own timeout-bounded HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &RenderConfig, timeouts: HttpTimeouts) -> Result<Self, RenderError> {
        let http = http::build_client(timeouts).map_err(|e| RenderError::HttpClientBuild(e.to_string()))?;
        Ok(Self::with_client(config, http))
    }

    /// Build a renderer around an existing client.
    #[must_use]
    pub fn with_client(config: &RenderConfig, http: reqwest::Client) -> Self {
        Self { http, base_url: config.base_url.clone(), theme: config.theme.clone() }
    }

    #[must_use]
    pub fn png_url(&self, mermaid: &str) -> String {
        format!("{}/img/{}?type=png", self.base_url, encode_for_url(mermaid))
    }

    #[must_use]
    pub fn svg_url(&self, mermaid: &str) -> String {
        format!("{}/svg/{}?theme={}", self.base_url, encode_for_url(&svg_source(mermaid)), self.theme)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, RenderError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| RenderError::Request(http::describe_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "render service rejected diagram");
            return Err(RenderError::Status { status: status.as_u16() });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RenderError::Request(http::describe_error(&e)))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl DiagramRenderer for InkRenderer {
    async fn render_svg(&self, mermaid: &str) -> Result<String, RenderError> {
        let body = self.fetch(&self.svg_url(mermaid)).await?;
        parse_svg(body)
    }

    async fn render_png(&self, mermaid: &str) -> Result<Vec<u8>, RenderError> {
        let body = self.fetch(&self.png_url(mermaid)).await?;
        check_png(body)
    }
}

/// Source sent for SVG rendering: the text-label directive, then the diagram.
#[must_use]
pub fn svg_source(mermaid: &str) -> String {
    format!("{SVG_TEXT_LABELS}\n{mermaid}")
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_svg(body: Vec<u8>) -> Result<String, RenderError> {
    let text = String::from_utf8(body).map_err(|e| RenderError::Body(e.to_string()))?;
    if !text.contains("<svg") {
        return Err(RenderError::Body("response is not SVG markup".into()));
    }
    Ok(text)
}

fn check_png(body: Vec<u8>) -> Result<Vec<u8>, RenderError> {
    if !body.starts_with(PNG_SIGNATURE) {
        return Err(RenderError::Body(format!("response is not a PNG ({} bytes)", body.len())));
    }
    Ok(body)
}

#[cfg(test)]
#[path = "ink_test.rs"]
mod tests;
