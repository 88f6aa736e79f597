//! Render: Mermaid source → SVG / PNG through an external service.
//!
//! DESIGN
//! ======
//! `DiagramRenderer` is the only seam to third-party infrastructure. The
//! production `InkRenderer` calls a mermaid.ink-compatible HTTP service;
//! tests swap in fakes that return fixed bytes. Local rasterization of an
//! already-rendered SVG (for downloads) lives in [`raster`] and needs no
//! network.

pub mod ink;
pub mod raster;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};

use crate::error::ErrorCode;

pub use ink::InkRenderer;

/// Scale factor applied when rasterizing SVG previews for download.
pub const DOWNLOAD_SCALE: f32 = 2.0;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced while materializing a diagram.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The rendering service was unreachable or timed out.
    #[error("render request failed: {0}")]
    Request(String),

    /// The rendering service returned a non-success HTTP status.
    #[error("render service returned status {status}")]
    Status { status: u16 },

    /// The response body could not be read or was not the expected image.
    #[error("render response unreadable: {0}")]
    Body(String),

    /// Local SVG → PNG conversion failed.
    #[error("rasterize failed: {0}")]
    Rasterize(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for RenderError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_RENDER_REQUEST",
            Self::Status { .. } => "E_RENDER_STATUS",
            Self::Body(_) => "E_RENDER_BODY",
            Self::Rasterize(_) => "E_RASTERIZE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599 })
    }
}

// =============================================================================
// RENDERER TRAIT
// =============================================================================

/// Capability to turn Mermaid source into images. Enables fakes in tests.
#[async_trait::async_trait]
pub trait DiagramRenderer: Send + Sync {
    /// Render to SVG markup for interactive preview.
    async fn render_svg(&self, mermaid: &str) -> Result<String, RenderError>;

    /// Render to encoded PNG bytes.
    async fn render_png(&self, mermaid: &str) -> Result<Vec<u8>, RenderError>;
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encode Mermaid source for embedding in a URL path segment.
#[must_use]
pub fn encode_for_url(mermaid: &str) -> String {
    URL_SAFE.encode(mermaid.as_bytes())
}

/// Wrap PNG bytes as a self-contained `data:` URI.
#[must_use]
pub fn png_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

/// Render a PNG and return it as a data URI.
///
/// # Errors
///
/// Propagates the renderer's failure unchanged.
pub async fn render_png_data_uri(renderer: &dyn DiagramRenderer, mermaid: &str) -> Result<String, RenderError> {
    let png = renderer.render_png(mermaid).await?;
    Ok(png_data_uri(&png))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
