//! # Dental Core
//!
//! Core business logic for the dental practice backend.
//!
//! This crate contains the data model and every operation on it:
//! - Configuration resolved once at startup ([`config`])
//! - Entity stores over Postgres or process memory ([`repositories`])
//! - Validation and orchestration per area ([`services`])
//! - Password hashing, session tokens and federated identity ([`auth`])
//! - The tooth-image analysis client ([`analysis`])
//!
//! **No API concerns**: HTTP servers, routing and status codes belong in `api-rest` or
//! `api-shared`.

pub mod analysis;
pub mod auth;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;

pub use config::{AppConfig, AuthConfig, DatabaseConfig, DatastoreKind};
pub use error::{DentalError, DentalResult};
pub use repositories::Datastore;
pub use services::Services;

/// Connects the datastore selected by `config`, applying migrations first when asked to.
pub async fn open_datastore(config: &AppConfig) -> DentalResult<Datastore> {
    match config.datastore {
        DatastoreKind::Memory => {
            tracing::warn!("using the in-memory datastore; data is lost on exit");
            Ok(Datastore::in_memory())
        }
        DatastoreKind::Postgres => {
            let pool = repositories::postgres::connect(&config.database).await?;
            if config.run_migrations {
                repositories::postgres::run_migrations(&pool).await?;
            }
            Ok(Datastore::postgres(pool))
        }
    }
}
