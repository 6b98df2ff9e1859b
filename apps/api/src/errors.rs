use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::sessions::store::SessionStoreError;
use crate::usage::{UsageCount, UsageError};

const RETRY_LATER: &str = "일시적인 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limit exceeded: {message}")]
    RateLimited {
        message: String,
        remaining: Option<UsageCount>,
    },

    #[error("Usage store error: {0}")]
    Usage(#[from] UsageError),

    #[error("Session store error: {0}")]
    SessionStore(#[from] SessionStoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::RateLimited { message, .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMIT_EXCEEDED",
                message.clone(),
            ),
            AppError::Usage(e) => {
                tracing::error!("Usage store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "USAGE_STORE_ERROR",
                    RETRY_LATER.to_string(),
                )
            }
            AppError::SessionStore(e) => {
                tracing::error!("Session store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    RETRY_LATER.to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    RETRY_LATER.to_string(),
                )
            }
        };

        let mut body = json!({
            "success": false,
            "error": message,
            "type": code,
        });
        if let AppError::RateLimited {
            remaining: Some(remaining),
            ..
        } = &self
        {
            body["remaining"] = json!(remaining);
        }

        (status, Json(body)).into_response()
    }
}
