use crate::mailer::SendError;
use crate::models::{ErrorResponse, FieldError, ValidationErrorResponse};
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{} field(s) failed validation", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Mail transport error: {0}")]
    Send(#[from] SendError),

    #[error("Origin not allowed: {0}")]
    CorsRejected(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(errors) => {
                let body = Json(ValidationErrorResponse { ok: false, errors });
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::RateLimited { retry_after_secs } => {
                let body = Json(ErrorResponse {
                    ok: false,
                    message: "Too many requests, please try again later.".to_string(),
                });
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, retry_after_secs.to_string())],
                    body,
                )
                    .into_response();
            }
            AppError::Send(e) => {
                tracing::error!("Mail transport error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to send email".to_string())
            }
            AppError::CorsRejected(_) => (StatusCode::FORBIDDEN, "Origin not allowed".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
        };

        (status, Json(ErrorResponse { ok: false, message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
