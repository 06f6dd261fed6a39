//! Postgres-backed stores.
//!
//! One [`PgStore`] implements every store trait over a shared, bounded `PgPool`. Rows are
//! decoded into private `*Row` structs first, because enum columns are plain `TEXT` and are
//! parsed into their typed form afterwards.

mod appointments;
mod billing;
mod patients;
mod treatments;
mod users;

use crate::config::DatabaseConfig;
use crate::{DentalError, DentalResult};
use dental_types::{ParseEnumError, Priority};
use sqlx::error::ErrorKind;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Migrations embedded from `crates/core/migrations`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Opens the connection pool described by `cfg`.
///
/// The pool is bounded; callers wait up to the acquire timeout for a free connection and
/// connections are recycled after the idle timeout and the maximum lifetime.
///
/// # Errors
///
/// Returns [`DentalError::Config`] for unusable settings and [`DentalError::Database`] if
/// the first connection cannot be established.
pub async fn connect(cfg: &DatabaseConfig) -> DentalResult<PgPool> {
    let options = cfg.connect_options()?;
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .min_connections(0)
        .acquire_timeout(cfg.acquire_timeout)
        .idle_timeout(Some(cfg.idle_timeout))
        .max_lifetime(Some(cfg.max_lifetime))
        .connect_with(options)
        .await?;
    tracing::info!(
        max_connections = cfg.max_connections,
        "connected to postgres"
    );
    Ok(pool)
}

/// Applies any pending embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> DentalResult<()> {
    MIGRATOR.run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}

/// Maps constraint violations raised by `INSERT` and `UPDATE` to caller errors.
pub(crate) fn map_write_error(err: sqlx::Error) -> DentalError {
    if let sqlx::Error::Database(db) = &err {
        match db.kind() {
            ErrorKind::UniqueViolation => {
                return DentalError::conflict("A record with these details already exists")
            }
            ErrorKind::ForeignKeyViolation => {
                return DentalError::validation("Referenced record does not exist")
            }
            ErrorKind::NotNullViolation => {
                return DentalError::validation("A required field was cleared")
            }
            ErrorKind::CheckViolation => {
                return DentalError::validation("A field is out of range")
            }
            _ => {}
        }
    }
    DentalError::Database(err)
}

/// Maps a restricted delete to a conflict.
pub(crate) fn map_delete_error(err: sqlx::Error) -> DentalError {
    if let sqlx::Error::Database(db) = &err {
        if matches!(db.kind(), ErrorKind::ForeignKeyViolation) {
            return DentalError::conflict("Record is still referenced by other records");
        }
    }
    DentalError::Database(err)
}

/// A stored enum value no longer parses; the data is corrupt rather than the request.
pub(crate) fn corrupt(err: ParseEnumError) -> DentalError {
    DentalError::Internal(format!("unexpected value in database: {err}"))
}

/// Escapes `LIKE` wildcards and wraps the term for a substring match.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// `CASE` expression ranking `column` by treatment priority, urgent first.
pub(crate) fn priority_rank_sql(column: &str) -> String {
    let mut sql = format!("CASE {column}");
    for priority in Priority::ALL {
        sql.push_str(&format!(" WHEN '{}' THEN {}", priority.as_str(), priority.rank()));
    }
    sql.push_str(&format!(" ELSE {} END", Priority::ALL.len()));
    sql
}
