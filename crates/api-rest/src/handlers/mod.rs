//! Request handlers, one module per API area.
//!
//! Handlers decode the request, resolve the caller when the route is protected, call exactly
//! one service operation and render its result. Validation lives in the core services.

pub mod analysis;
pub mod appointments;
pub mod auth;
pub mod billing;
pub mod dashboard;
pub mod health;
pub mod patient_treatments;
pub mod patients;
pub mod treatments;

use axum::http::StatusCode;
use axum::Json;
use dental_core::models::MessageResponse;

/// `201 Created` with the new record as body.
pub(crate) fn created<T>(body: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(body))
}

pub(crate) fn deleted(entity: &str) -> Json<MessageResponse> {
    Json(MessageResponse::new(format!("{entity} deleted successfully")))
}
