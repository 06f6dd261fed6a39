//! Constants used throughout the dental core crate.
//!
//! Defaults for every configuration value live here so the config parser and the
//! documentation agree.

/// Default listen address for the REST server.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:8080";

pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_USER: &str = "postgres";
pub const DEFAULT_DB_NAME: &str = "dental_scheduler";
pub const DEFAULT_DB_SSL_MODE: &str = "disable";

/// Upper bound on pooled Postgres connections.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;
pub const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DB_IDLE_TIMEOUT_SECS: u64 = 10 * 60;
pub const DEFAULT_DB_MAX_LIFETIME_SECS: u64 = 60 * 60;

/// Session token lifetime.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 72;

pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Signing secret used when `JWT_SECRET` is unset. Only suitable for local development.
pub const DEV_JWT_SECRET: &str = "dental-development-secret-change-me";

pub const MIN_JWT_SECRET_LEN: usize = 16;

pub const MIN_PASSWORD_LEN: usize = 6;

pub const DEFAULT_GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Drain window for in-flight requests on shutdown.
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 5;

/// Largest accepted tooth image upload.
pub const MAX_ANALYSIS_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Image content types the analysis service accepts.
pub const ANALYSIS_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg"];
