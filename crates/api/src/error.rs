use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fortidash_core::error::CoreError;
use fortidash_fortimanager::status::StatusKind;
use fortidash_fortimanager::FortiManagerError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`FortiManagerError`] for
/// upstream failures. Implements [`IntoResponse`] to produce consistent
/// `{"error": ..., "code": ...}` bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure talking to FortiManager.
    #[error(transparent)]
    FortiManager(#[from] FortiManagerError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Unavailable(msg) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AppError::FortiManager(err) => classify_fortimanager_error(err),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a FortiManager failure into an HTTP status, error code and
/// message.
///
/// - `NotFound` maps to 404 and `NoPermission` to 403 (with the
///   `rpc-permit` hint).
/// - Rejected credentials map to 502 `UPSTREAM_AUTH_FAILED`.
/// - Invalid url/params/data map to 400.
/// - Configuration problems are internal; everything else is a 502.
fn classify_fortimanager_error(err: &FortiManagerError) -> (StatusCode, &'static str, String) {
    if err.is_auth_failure() {
        tracing::warn!(error = %err, "FortiManager authentication failed");
        return (
            StatusCode::BAD_GATEWAY,
            "UPSTREAM_AUTH_FAILED",
            "FortiManager rejected the configured credentials".to_string(),
        );
    }

    match err {
        FortiManagerError::Rpc { kind, message, .. } => match kind {
            StatusKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
            StatusKind::NoPermission => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                format!("{message}. {}", kind.hint()),
            ),
            StatusKind::AlreadyExists => (StatusCode::CONFLICT, "CONFLICT", err.to_string()),
            StatusKind::InvalidUrl | StatusKind::InvalidParams | StatusKind::InvalidData => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string())
            }
            _ => {
                tracing::warn!(error = %err, "FortiManager returned an error");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", err.to_string())
            }
        },
        FortiManagerError::Config(inner) => {
            tracing::error!(error = %inner, "FortiManager configuration error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::warn!(error = %other, "FortiManager request failed");
            (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                "FortiManager request failed".to_string(),
            )
        }
    }
}
