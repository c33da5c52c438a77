use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chefmatch_core::error::CoreError;
use chefmatch_core::ports::PortError;
use chefmatch_events::BusError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `chefmatch_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A collaborator (preference store, catalog) failed or timed out.
    #[error("Collaborator error: {0}")]
    Port(#[from] PortError),

    /// The event queue rejected a publish.
    #[error("Event bus error: {0}")]
    Bus(#[from] BusError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
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
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
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

            // Downstream outages are retryable from the client's side.
            AppError::Port(err) => {
                tracing::warn!(error = %err, "Collaborator unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "A required service is temporarily unavailable".to_string(),
                )
            }
            AppError::Bus(err) => {
                tracing::error!(error = %err, "Event bus error");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "A required service is temporarily unavailable".to_string(),
                )
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
