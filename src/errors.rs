use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::telegram::TelegramError;
use crate::translate::TranslationError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("translation failed: {0}")]
    Translation(#[from] TranslationError),

    #[error("chat delivery failed: {0}")]
    Delivery(#[from] TelegramError),

    #[error("reviewer did not reply in time")]
    ReplyTimeout,

    /// The pending entry was replaced by a newer request for the same chat.
    #[error("superseded by a newer request for the same chat")]
    ReplySuperseded,
}

impl AppError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Translation(_) => "translation_error",
            AppError::Delivery(_) => "delivery_error",
            AppError::ReplyTimeout => "timeout",
            AppError::ReplySuperseded => "superseded",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, code, msg) = match &self {
            AppError::Translation(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "upstream_error",
                "translation_failed",
                format!("Error in translation: {}", e),
            ),
            AppError::Delivery(e) => {
                tracing::error!("Chat delivery error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "delivery_failed",
                    "failed to deliver release notes to the reviewer chat".to_string(),
                )
            }
            AppError::ReplyTimeout => (
                StatusCode::REQUEST_TIMEOUT,
                "timeout_error",
                "reply_timeout",
                "User did not respond in time".to_string(),
            ),
            AppError::ReplySuperseded => (
                StatusCode::CONFLICT,
                "conflict_error",
                "reply_superseded",
                "a newer release notes request was sent to the same chat".to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        (status, body).into_response()
    }
}
