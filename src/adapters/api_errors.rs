use crate::domain::error::PipelineError;
use axum::{
    Json,
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Newtype so the domain error can become an axum response.
pub struct ApiError(pub PipelineError);

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self(err)
    }
}

/// Status and text only: no structured body, no content type.
fn bare(status: StatusCode, message: String) -> Response {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self.0 {
            // A malformed client, not a user mistake.
            PipelineError::MissingKey(_) | PipelineError::MalformedBody(_) => {
                tracing::info!(error = %self.0, "rejecting malformed request");
                return bare(StatusCode::BAD_REQUEST, self.0.to_string());
            }
            PipelineError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                msg.clone(),
            ),
            PipelineError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("payment not found: {id}"),
            ),
            PipelineError::InvalidTransition { .. } | PipelineError::AlreadySettled { .. } => {
                tracing::error!(error = %self.0, "settlement conflict");
                (
                    StatusCode::CONFLICT,
                    "settlement_conflict",
                    self.0.to_string(),
                )
            }
            PipelineError::DuplicatePayment(_) => {
                tracing::error!(error = %self.0, "storage conflict");
                (
                    StatusCode::CONFLICT,
                    "storage_conflict",
                    self.0.to_string(),
                )
            }
            PipelineError::Database(err) => {
                tracing::error!("database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
            PipelineError::Serialization(err) => {
                tracing::error!("serialization error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
            PipelineError::Notification(msg) => {
                tracing::error!("notification error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error_code": error_code,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}
