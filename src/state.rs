//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds immutable configuration and the renderer handle; every request's
//! data stays local to that request, so no locking is involved.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::render::DiagramRenderer;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub renderer: Arc<dyn DiagramRenderer>,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, renderer: Arc<dyn DiagramRenderer>) -> Self {
        Self { config: Arc::new(config), renderer }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
