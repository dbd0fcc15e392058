use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;

use crate::errors::AppError;
use crate::models::release_notes::{ReleaseNotesRequest, ReleaseNotesResponse};
use crate::relay::request::relay_release_notes;
use crate::AppState;

/// `POST /release_notes`: blocks until the reviewer replies or the window closes.
pub async fn release_notes(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ReleaseNotesRequest>,
) -> Result<Json<ReleaseNotesResponse>, AppError> {
    let translated_notes = relay_release_notes(&state, payload).await?;
    Ok(Json(ReleaseNotesResponse { translated_notes }))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.encode(),
    )
}

pub async fn readiness_check() -> &'static str {
    "ok"
}
