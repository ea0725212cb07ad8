use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::profile::upload::UploadRejection;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<UploadRejection> for AppError {
    fn from(rejection: UploadRejection) -> Self {
        match rejection {
            UploadRejection::UnsupportedType(_) => {
                AppError::UnsupportedMediaType(rejection.to_string())
            }
            UploadRejection::TooLarge { .. } => AppError::PayloadTooLarge(rejection.to_string()),
            UploadRejection::Empty => AppError::Validation(rejection.to_string()),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Llm(e.to_string())
    }
}

impl AppError {
    /// Status, machine-readable code and client-safe message. Has no side effects.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                msg.clone(),
            ),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "A database error occurred".to_string(),
            ),
            AppError::Llm(_) => (
                StatusCode::BAD_GATEWAY,
                "LLM_ERROR",
                "An AI processing error occurred".to_string(),
            ),
            AppError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                "A storage error occurred".to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
            ),
        }
    }

    /// Server-side failures are logged with their cause; client errors are not.
    fn log(&self) {
        match self {
            AppError::Database(e) => tracing::error!("Database error: {e}"),
            AppError::Llm(msg) => tracing::error!("LLM error: {msg}"),
            AppError::Storage(msg) => tracing::error!("Storage error: {msg}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            _ => {}
        }
    }

    /// Message safe to show to the end user. Internal details stay out of it.
    pub fn user_message(&self) -> String {
        self.parts().2
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_logs::with_captured_logs;

    #[test]
    fn test_unsupported_type_maps_to_415() {
        let err: AppError = UploadRejection::UnsupportedType("image/png".to_string()).into();
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(code, "UNSUPPORTED_MEDIA_TYPE");
        assert!(message.contains("PDF, DOC, and DOCX"));
    }

    #[test]
    fn test_too_large_maps_to_413() {
        let err: AppError = UploadRejection::TooLarge {
            size: 6 * 1024 * 1024,
            limit: 5 * 1024 * 1024,
        }
        .into();
        assert_eq!(err.parts().0, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_user_message_for_server_error_is_generic() {
        let err = AppError::Llm("upstream 503 from provider".to_string());
        assert_eq!(err.user_message(), "An AI processing error occurred");
        assert_eq!(err.parts().0, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_user_message_does_not_log() {
        let logs = with_captured_logs(|| {
            let err = AppError::Storage("bucket unreachable".to_string());
            assert_eq!(err.user_message(), "A storage error occurred");
        });
        assert!(logs.is_empty(), "unexpected log output: {logs}");
    }

    #[test]
    fn test_response_logs_server_error_once() {
        let logs = with_captured_logs(|| {
            let response = AppError::Storage("bucket unreachable".to_string()).into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        });
        assert_eq!(logs.matches("Storage error: bucket unreachable").count(), 1);
    }

    #[test]
    fn test_client_errors_are_not_logged() {
        let logs = with_captured_logs(|| {
            let _ = AppError::NotFound("Item x not found".to_string()).into_response();
        });
        assert!(logs.is_empty());
    }

    #[test]
    fn test_internal_details_are_not_leaked() {
        let err = AppError::Storage("bucket studymate-private unreachable".to_string());
        assert!(!err.user_message().contains("studymate-private"));
    }
}
