//! procflow turns manual and automation step lists into flowchart diagrams.
//!
//! ARCHITECTURE
//! ============
//! - [`diagram`]: pure step text → Mermaid `graph TD` builder.
//! - [`render`]: external rendering service client and local rasterization.
//! - [`webhook`]: forwards generated diagrams to a workflow endpoint.
//! - [`wizard`]: the collect/review state machine driven by the CLI.
//! - [`routes`] / [`services`]: the `POST /generate-diagrams` HTTP API.
//!
//! The builder lives here once so the server and the CLI cannot drift.

pub mod config;
pub mod diagram;
pub mod error;
pub mod http;
pub mod render;
pub mod routes;
pub mod services;
pub mod state;
pub mod timestamp;
pub mod webhook;
pub mod wizard;
