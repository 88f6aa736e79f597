use std::sync::Arc;

use procflow::config::AppConfig;
use procflow::render::InkRenderer;
use procflow::{routes, state};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().expect("invalid configuration");
    let renderer = InkRenderer::new(&config.render, config.timeouts).expect("render client init failed");

    if config.api_key.is_none() {
        tracing::warn!("API_KEY not set; generate-diagrams accepts unauthenticated calls");
    }

    let port = config.port;
    tracing::info!(render_base_url = %config.render.base_url, "render service configured");

    let state = state::AppState::new(config, Arc::new(renderer));
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "procflow listening");
    axum::serve(listener, app).await.expect("server failed");
}
