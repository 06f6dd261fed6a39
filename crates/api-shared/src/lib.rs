//! # API Shared
//!
//! Shared utilities and definitions for the dental practice APIs.
//!
//! Contains:
//! - The `HealthService` answering liveness checks
//! - Bearer header parsing used by the authorization middleware
//! - The JSON error body every failed request answers with
//!
//! Kept free of axum and of the core crate so any transport can use it.

pub mod auth;
pub mod error;
pub mod health;

pub use auth::{bearer_token, BearerError};
pub use error::ErrorBody;
pub use health::{HealthResponse, HealthService};
