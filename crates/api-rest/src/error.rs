//! Mapping from the core error taxonomy onto HTTP responses.

use api_shared::ErrorBody;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dental_core::DentalError;

const INTERNAL_MESSAGE: &str = "Internal server error";
const NEEDS_REGISTRATION_MESSAGE: &str = "User not found. Please complete registration.";

pub type ApiResult<T> = Result<T, ApiError>;

/// An error on its way to the client: a status and the body to render.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody::new(message),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.body = self.body.with_details(details);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<DentalError> for ApiError {
    fn from(err: DentalError) -> Self {
        match err {
            DentalError::Validation(message) => Self::bad_request(message),
            DentalError::Unauthorized(message) => Self::unauthorized(message),
            DentalError::Token(_) => Self::unauthorized("Invalid token"),
            DentalError::Forbidden(message) => Self::forbidden(message),
            err @ DentalError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            DentalError::Conflict(message) => Self::new(StatusCode::CONFLICT, message),
            DentalError::NeedsRegistration(identity) => {
                let details = serde_json::to_value(&identity).unwrap_or_default();
                Self::new(StatusCode::NOT_FOUND, NEEDS_REGISTRATION_MESSAGE).with_details(details)
            }
            other => {
                tracing::error!(error = %other, "request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("Invalid request body")
            .with_details(serde_json::Value::String(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request("Invalid query parameters")
            .with_details(serde_json::Value::String(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request("Invalid path parameter")
            .with_details(serde_json::Value::String(rejection.body_text()))
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), "Invalid multipart body")
            .with_details(serde_json::Value::String(err.body_text()))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::bad_request("Expected a multipart/form-data body")
            .with_details(serde_json::Value::String(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
