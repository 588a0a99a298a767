//! Application error type mapping to HTTP status codes and the error body.
//!
//! Every error response has the shape
//! `{ "error": CODE, "message": text, "timestamp": rfc3339 }`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use dollsay_types::error::ChatError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors raised by a chat turn.
    Chat(ChatError),
    /// Request body could not be read as JSON.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    /// Status, stable code, and client-facing message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Chat(ChatError::Validation(msg)) | AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            AppError::Chat(ChatError::QuotaExceeded { limit }) => (
                StatusCode::TOO_MANY_REQUESTS,
                "MESSAGES_LIMIT_EXCEEDED",
                format!("免费用户已达到{limit}条消息限制,请登录继续"),
            ),
            AppError::Chat(ChatError::StorageUnavailable(_)) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SERVICE_ERROR",
                "服务暂时不可用,请稍后再试".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        }

        let body = json!({
            "error": code,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
