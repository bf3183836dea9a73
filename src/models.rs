use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Contact form submission. Missing fields deserialize as empty strings and
/// are reported by validation.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct ContactMessage {
    #[serde(default)]
    #[schema(example = "Ada Lovelace")]
    pub name: String,

    #[serde(default)]
    #[schema(example = "ada@example.com")]
    pub email: String,

    #[serde(default)]
    #[schema(example = "Collaboration")]
    pub subject: String,

    #[serde(default)]
    #[schema(example = "Hi! I enjoyed your portfolio.")]
    pub message: String,
}

/// One failed field check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    #[schema(example = "email")]
    pub field: &'static str,
    #[schema(example = "Please provide a valid email address")]
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactResponse {
    #[schema(example = true)]
    pub ok: bool,
    #[schema(example = "Sent")]
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    #[schema(example = false)]
    pub ok: bool,
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = false)]
    pub ok: bool,
    #[schema(example = "Failed to send email")]
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = true)]
    pub ok: bool,
    #[schema(example = "production")]
    pub env: String,
}
