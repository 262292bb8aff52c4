use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Json},
    routing::{any, get},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::services::ServeFile;

use crate::{config::Config, pipeline::RequestPipeline, render};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<RequestPipeline>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// First `day` value wins when the parameter is repeated.
fn first_day(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(key, _)| key == "day")
        .map(|(_, value)| value.as_str())
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> (StatusCode, Html<String>) {
    let (status, body) = state.pipeline.respond(first_day(&params)).await;
    (status, Html(body))
}

pub async fn not_found() -> (StatusCode, Html<&'static str>) {
    (StatusCode::NOT_FOUND, Html(render::NOT_FOUND_PAGE))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route_service("/", ServeFile::new(&state.config.index_path))
        .route("/search", any(search))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
}
