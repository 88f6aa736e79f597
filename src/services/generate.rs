//! Generate service: both step lists → Mermaid source + PNG data URIs.
//!
//! DESIGN
//! ======
//! The manual and automation diagrams are built and rendered concurrently
//! with `tokio::join!`; both complete before a result is returned. Each
//! side keeps its own `Result`, so one render failure never discards the
//! other diagram.

use crate::diagram::{self, DiagramKind};
use crate::render::{self, DiagramRenderer, RenderError};

/// A diagram rendered for the API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiagram {
    pub kind: DiagramKind,
    pub mermaid_code: String,
    /// `data:image/png;base64,...`
    pub png: String,
}

/// A render failure tagged with the diagram it belongs to.
#[derive(Debug, thiserror::Error)]
#[error("{kind} diagram: {source}")]
pub struct DiagramFailure {
    pub kind: DiagramKind,
    #[source]
    pub source: RenderError,
}

/// Independent outcomes for the two diagrams of one request.
#[derive(Debug)]
pub struct GeneratedPair {
    pub manual: Result<RenderedDiagram, DiagramFailure>,
    pub automation: Result<RenderedDiagram, DiagramFailure>,
}

impl GeneratedPair {
    /// Both diagrams, or the first failure in manual → automation order.
    ///
    /// # Errors
    ///
    /// Returns the manual failure if any, otherwise the automation failure.
    pub fn into_both(self) -> Result<(RenderedDiagram, RenderedDiagram), DiagramFailure> {
        Ok((self.manual?, self.automation?))
    }
}

/// Build and render a single diagram.
///
/// # Errors
///
/// Returns a `DiagramFailure` when the renderer fails.
pub async fn generate_one(
    renderer: &dyn DiagramRenderer,
    kind: DiagramKind,
    steps: &str,
) -> Result<RenderedDiagram, DiagramFailure> {
    let mermaid_code = diagram::mermaid(steps);
    match render::render_png_data_uri(renderer, &mermaid_code).await {
        Ok(png) => Ok(RenderedDiagram { kind, mermaid_code, png }),
        Err(source) => {
            tracing::warn!(%kind, error = %source, "diagram render failed");
            Err(DiagramFailure { kind, source })
        }
    }
}

/// Build and render both diagrams concurrently.
pub async fn generate_pair(renderer: &dyn DiagramRenderer, manual_steps: &str, automation_steps: &str) -> GeneratedPair {
    let (manual, automation) = tokio::join!(
        generate_one(renderer, DiagramKind::Manual, manual_steps),
        generate_one(renderer, DiagramKind::Automation, automation_steps),
    );
    GeneratedPair { manual, automation }
}

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;
