use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderName, Method, StatusCode},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id::request_id_middleware;
use crate::AppState;

pub mod handlers;

/// Release notes bodies are plain text; 1 MB is far beyond anything Telegram accepts.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the full HTTP router with state applied.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.config.cors_origins.clone());
    Router::new()
        // Health endpoints
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route("/release_notes", post(handlers::release_notes))
        .fallback(fallback_404)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(request_id_middleware))
}

/// Configured origins plus any localhost port, for local dashboards.
fn cors_layer(allowed: Vec<String>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            let origin = origin.to_str().unwrap_or("");
            allowed.iter().any(|o| o == origin)
                || origin.starts_with("http://localhost:")
                || origin.starts_with("http://127.0.0.1:")
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("x-request-id"),
        ])
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}
