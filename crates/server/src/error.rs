use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ideation::{ErrorKind, IdeationError};
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String, details: Option<Value> },
    Ideation(IdeationError),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        AppError::BadRequest {
            message: message.into(),
            details: Some(details),
        }
    }
}

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Message suitable for direct display
    pub error: String,
    /// Stable machine-readable code, e.g. `RATE_LIMIT`
    pub code: String,
    /// Validation specifics, present on request body errors
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

fn ideation_parts(err: &IdeationError) -> (StatusCode, &'static str, String, Option<Value>) {
    match err.kind() {
        ErrorKind::BadRequest => (
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            "Invalid request body".to_string(),
            Some(json!({ "reason": err.to_string() })),
        ),
        ErrorKind::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            "INVALID_API_KEY",
            "Invalid API key. Please check your API key in settings.".to_string(),
            None,
        ),
        ErrorKind::RateLimited => (
            StatusCode::TOO_MANY_REQUESTS,
            "RATE_LIMIT",
            "Rate limit exceeded. Please try again in a moment.".to_string(),
            None,
        ),
        ErrorKind::ProviderError if err.provider_status() == Some(400) => (
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            "Invalid request. Please try again.".to_string(),
            None,
        ),
        ErrorKind::ProviderError | ErrorKind::ParseError => {
            let message = match err {
                IdeationError::Provider { message, .. } => message.clone(),
                other => other.to_string(),
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "API_ERROR",
                format!("AI Error: {}", message),
                None,
            )
        }
        ErrorKind::ServiceUnavailable => (
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            err.to_string(),
            None,
        ),
        ErrorKind::Timeout => (
            StatusCode::GATEWAY_TIMEOUT,
            "TIMEOUT",
            "The AI took too long to respond. Please try again.".to_string(),
            None,
        ),
        ErrorKind::Unknown => {
            tracing::error!("Unexpected ideation error: {:?}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UNKNOWN_ERROR",
                "An unexpected error occurred. Please try again.".to_string(),
                None,
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error, details) = match self {
            AppError::BadRequest { message, details } => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", message, details)
            }
            AppError::Ideation(err) => ideation_parts(&err),
        };

        let body = Json(ErrorResponse {
            error,
            code: code.to_string(),
            details,
        });

        (status, body).into_response()
    }
}

impl From<IdeationError> for AppError {
    fn from(err: IdeationError) -> Self {
        AppError::Ideation(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AppError::BadRequest {
            message: "Invalid request body".to_string(),
            details: Some(json!({ "reason": rejection.body_text() })),
        }
    }
}
