use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::provider::NotifyError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Notification(#[from] NotifyError),

    #[error("Status store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

fn redact(log_message: &str, generic: &str) -> String {
    if is_production() {
        generic.to_string()
    } else {
        log_message.to_string()
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        let log_message = self.to_string();
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", log_message),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", log_message),
            AppError::Notification(e) => match e {
                NotifyError::Validation(_) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", log_message)
                }
                NotifyError::Provider { .. } => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "PROVIDER_ERROR",
                    log_message,
                ),
                NotifyError::UnsupportedChannel { .. } | NotifyError::Unavailable(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "CHANNEL_UNAVAILABLE",
                    log_message,
                ),
                NotifyError::Internal(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "NOTIFICATION_ERROR",
                    redact(&log_message, "An unexpected error occurred"),
                ),
            },
            AppError::Store(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_ERROR",
                redact(&log_message, "Service temporarily unavailable"),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, client_message) = self.parts();

        // Always log the detailed error server-side
        tracing::error!(
            code = %code,
            status = %status.as_u16(),
            message = %self,
            "API error"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: client_message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_error_status_codes() {
        let validation = AppError::from(NotifyError::Validation("missing phone".to_string()));
        assert_eq!(validation.parts().0, StatusCode::BAD_REQUEST);

        let provider = AppError::from(NotifyError::Provider {
            provider: "twilio".to_string(),
            message: "down".to_string(),
        });
        let (status, code, message) = provider.parts();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(code, "PROVIDER_ERROR");
        assert!(message.contains("down"));

        let internal = AppError::from(NotifyError::Internal("panic".to_string()));
        assert_eq!(internal.parts().0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_response() {
        let response = AppError::NotFound("transaction x".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_error_is_service_unavailable() {
        let error = AppError::from(StoreError::Unavailable("connection refused".to_string()));
        let (status, code, _) = error.parts();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(code, "STORE_ERROR");
    }
}
