use crate::constants::MAX_BODY_SIZE;
use crate::error::{AppError, Result};
use crate::models::*;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(health, contact),
    components(schemas(
        HealthResponse,
        ContactMessage,
        ContactResponse,
        FieldError,
        ValidationErrorResponse,
        ErrorResponse
    )),
    tags(
        (name = "folio", description = "Portfolio contact relay")
    ),
    info(
        title = "folio API",
        version = "0.1.0",
        description = "Backend for a personal portfolio site.\n\n\
                      ## Contact relay\n\
                      - Submissions are validated field by field; every failure is reported\n\
                      - 10 submissions per minute per caller\n\
                      - Messages are relayed by email and never stored",
        license(name = "MIT"),
    )
)]
pub struct ApiDoc;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "folio",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        env: state.config.environment.clone(),
    })
}

/// Relay a contact form submission by email
///
/// Rate limited per caller before the body is inspected. All four fields
/// must pass validation before anything is sent.
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "folio",
    request_body = ContactMessage,
    responses(
        (status = 200, description = "Message accepted for delivery", body = ContactResponse),
        (status = 400, description = "One or more fields are invalid", body = ValidationErrorResponse),
        (status = 403, description = "Origin not allowed", body = ErrorResponse),
        (status = 413, description = "Request body over 64 KiB", body = ErrorResponse),
        (status = 429, description = "Too many submissions", body = ErrorResponse),
        (status = 500, description = "Mail transport failed", body = ErrorResponse)
    )
)]
pub async fn contact(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ContactMessage>, JsonRejection>,
) -> Result<Json<ContactResponse>> {
    let Json(message) = payload.map_err(reject_body)?;

    state.contact.submit(&message).await?;

    Ok(Json(ContactResponse {
        ok: true,
        message: "Sent".to_string(),
    }))
}

fn reject_body(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::BytesRejection(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            AppError::PayloadTooLarge(format!(
                "Request body too large (max {} KiB)",
                MAX_BODY_SIZE / 1024
            ))
        }
        other => AppError::BadRequest(other.body_text()),
    }
}
