pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Standard error response structure.
///
/// Returned for every error response:
/// - `code`: Integer error code for logging/monitoring (e.g., 1004)
/// - `error`: Machine-readable error identifier (e.g., "NOT_FOUND")
/// - `message`: Human-readable error message
/// - `details`: Optional additional error details (e.g., validation errors)
///
/// # JSON Example
///
/// ```json
/// {
///   "code": 1004,
///   "error": "NOT_FOUND",
///   "message": "Product with ID: 7 not found."
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier for programmatic handling
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured error details (e.g., validation field errors)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Application error type that can be converted to HTTP responses.
///
/// Server-side variants are logged with their detail and answered with the
/// generic [`ErrorCode::InternalError`] message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Path extraction error: {0}")]
    PathRejection(#[from] PathRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::JsonExtractorRejection(JsonRejection::MissingJsonContentType(e)) => e.status(),
            AppError::JsonExtractorRejection(_) => StatusCode::BAD_REQUEST,
            AppError::PathRejection(e) => e.status(),
            AppError::ValidationError(_) | AppError::InvalidId(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::JsonExtractorRejection(_) => ErrorCode::JsonExtraction,
            AppError::PathRejection(_) | AppError::InvalidId(_) => ErrorCode::InvalidId,
            AppError::ValidationError(_) => ErrorCode::ValidationError,
            AppError::BadRequest(_) => ErrorCode::BadRequest,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::InternalServerError(_) => ErrorCode::InternalError,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error_code();

        let body = match self {
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(error_code = code.code(), "JSON extraction error: {:?}", e);
                ErrorResponse::new(code, e.body_text())
            }
            AppError::PathRejection(e) => {
                tracing::info!(error_code = code.code(), "Path extraction error: {:?}", e);
                ErrorResponse::new(code, e.body_text())
            }
            AppError::ValidationError(e) => {
                tracing::info!(error_code = code.code(), "Validation error: {:?}", e);
                ErrorResponse::new(code, code.default_message())
                    .with_details(validation_details(&e))
            }
            AppError::InvalidId(msg) | AppError::BadRequest(msg) => {
                tracing::info!(error_code = code.code(), "Bad request: {}", msg);
                ErrorResponse::new(code, msg)
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code = code.code(), "Not found: {}", msg);
                ErrorResponse::new(code, msg)
            }
            AppError::Database(msg) | AppError::InternalServerError(msg) => {
                tracing::error!(error_code = code.code(), "Internal server error: {}", msg);
                ErrorResponse::new(code, code.default_message())
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Field-keyed validator errors: `{"name": [{"code", "message", "params"}]}`.
pub fn validation_details(errors: &ValidationErrors) -> serde_json::Value {
    let details = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let entries: Vec<serde_json::Value> = errors
                .iter()
                .map(|err| {
                    serde_json::json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect();
            (field.to_string(), serde_json::Value::Array(entries))
        })
        .collect::<serde_json::Map<_, _>>();

    serde_json::Value::Object(details)
}

/// Helper function to create error responses.
///
/// ```rust,ignore
/// use axum_helpers::errors::{error_response, ErrorCode};
/// use axum::http::StatusCode;
///
/// let response = error_response(StatusCode::BAD_REQUEST, "Invalid input", ErrorCode::BadRequest);
/// ```
pub fn error_response(
    status: StatusCode,
    message: impl Into<String>,
    error_code: ErrorCode,
) -> Response {
    (status, Json(ErrorResponse::new(error_code, message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_echoes_message() {
        let response = AppError::NotFound("Product with ID: 7 not found.".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_of(response).await;
        assert_eq!(body.code, 1004);
        assert_eq!(body.error, "NOT_FOUND");
        assert_eq!(body.message, "Product with ID: 7 not found.");
        assert!(body.details.is_none());
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response =
            AppError::InternalServerError("connection reset by peer".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(response).await;
        assert_eq!(body.error, "INTERNAL_ERROR");
        assert_eq!(body.message, "An unexpected error occurred.");
    }

    #[tokio::test]
    async fn test_database_error_hides_detail() {
        let response = AppError::Database("duplicate key".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(response).await;
        assert_eq!(body.code, 2003);
        assert!(!body.message.contains("duplicate"));
    }

    #[tokio::test]
    async fn test_bad_request_uses_bad_request_code() {
        let response = AppError::BadRequest("ids differ".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_of(response).await.error, "BAD_REQUEST");
    }

    #[test]
    fn test_status_and_code_mapping() {
        let cases = [
            (AppError::InvalidId("x".into()), StatusCode::BAD_REQUEST, ErrorCode::InvalidId),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST, ErrorCode::BadRequest),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, ErrorCode::NotFound),
            (AppError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseError),
            (
                AppError::InternalServerError("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalError,
            ),
        ];

        for (error, status, code) in cases {
            assert_eq!(error.status(), status, "{error}");
            assert_eq!(error.error_code(), code, "{error}");
        }
    }

    #[test]
    fn test_error_response_omits_empty_details() {
        let json = serde_json::to_value(ErrorResponse::new(ErrorCode::NotFound, "gone")).unwrap();
        assert!(json.get("details").is_none());
        assert_eq!(json["code"], 1004);
    }
}
