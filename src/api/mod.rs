//! HTTP API module - generation and static file endpoints

mod files;
mod generate;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::gemini::GeminiClient;
use crate::images::ImageStore;
pub use generate::GenerateResponse;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gemini: Arc<GeminiClient>,
    pub uploads: ImageStore,
    pub generated: ImageStore,
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(root))
        .merge(generate::router())
        .merge(files::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root endpoint
async fn root() -> impl IntoResponse {
    Json(RootResponse {
        message: "AI Aluminum Interior Generator API running successfully!",
    })
}

#[derive(Serialize)]
struct RootResponse {
    message: &'static str,
}
