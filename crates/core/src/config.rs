//! Runtime configuration.
//!
//! Everything here is resolved once at process startup and then passed into the services.
//! Request handling never reads process-wide environment variables. Each value has a small
//! parsing function that takes the raw `Option<String>` so tests can exercise the parsing
//! rules without touching the environment.

use crate::constants::{
    DEFAULT_BCRYPT_COST, DEFAULT_DB_ACQUIRE_TIMEOUT_SECS, DEFAULT_DB_HOST,
    DEFAULT_DB_IDLE_TIMEOUT_SECS, DEFAULT_DB_MAX_CONNECTIONS, DEFAULT_DB_MAX_LIFETIME_SECS,
    DEFAULT_DB_NAME, DEFAULT_DB_PORT, DEFAULT_DB_SSL_MODE, DEFAULT_DB_USER,
    DEFAULT_GOOGLE_TOKENINFO_URL, DEFAULT_REST_ADDR, DEFAULT_SHUTDOWN_GRACE_SECS,
    DEFAULT_TOKEN_TTL_HOURS, DEV_JWT_SECRET, MIN_JWT_SECRET_LEN,
};
use crate::{DentalError, DentalResult};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::str::FromStr;
use std::time::Duration;

/// Which datastore backs the services.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatastoreKind {
    Postgres,
    Memory,
}

/// Connection settings for the Postgres pool.
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub ssl_mode: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl DatabaseConfig {
    /// Builds sqlx connect options, preferring the full URL when one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`DentalError::Config`] if the URL or the SSL mode cannot be parsed.
    pub fn connect_options(&self) -> DentalResult<PgConnectOptions> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url)
                .map_err(|e| DentalError::Config(format!("DATABASE_URL: {e}")));
        }

        let ssl_mode = PgSslMode::from_str(&self.ssl_mode)
            .map_err(|e| DentalError::Config(format!("DB_SSL_MODE: {e}")))?;

        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name)
            .ssl_mode(ssl_mode);
        if !self.password.is_empty() {
            options = options.password(&self.password);
        }
        Ok(options)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: DEFAULT_DB_HOST.into(),
            port: DEFAULT_DB_PORT,
            user: DEFAULT_DB_USER.into(),
            password: String::new(),
            name: DEFAULT_DB_NAME.into(),
            ssl_mode: DEFAULT_DB_SSL_MODE.into(),
            max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_DB_ACQUIRE_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_DB_IDLE_TIMEOUT_SECS),
            max_lifetime: Duration::from_secs(DEFAULT_DB_MAX_LIFETIME_SECS),
        }
    }
}

/// Settings for password hashing, session tokens and federated login.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: Vec<u8>,
    /// `true` when no secret was configured and the development fallback is in use.
    pub using_dev_secret: bool,
    pub token_ttl: chrono::Duration,
    pub bcrypt_cost: u32,
    /// `None` disables the remote tokeninfo check; assertions are then only decoded locally.
    pub google_tokeninfo_url: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.as_bytes().to_vec(),
            using_dev_secret: true,
            token_ttl: chrono::Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            google_tokeninfo_url: Some(DEFAULT_GOOGLE_TOKENINFO_URL.into()),
        }
    }
}

/// Application configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub rest_addr: String,
    pub datastore: DatastoreKind,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub ml_service_url: Option<String>,
    pub shutdown_grace: Duration,
    pub run_migrations: bool,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> DentalResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves the configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns [`DentalError::Config`] naming the first variable that fails to parse.
    pub fn from_lookup<F>(lookup: F) -> DentalResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = DatabaseConfig::default();
        let database = DatabaseConfig {
            url: optional_from_env_value(lookup("DATABASE_URL")),
            host: string_from_env_value(lookup("DB_HOST"), &defaults.host),
            port: number_from_env_value("DB_PORT", lookup("DB_PORT"), defaults.port)?,
            user: string_from_env_value(lookup("DB_USER"), &defaults.user),
            password: lookup("DB_PASSWORD").unwrap_or_default(),
            name: string_from_env_value(lookup("DB_NAME"), &defaults.name),
            ssl_mode: string_from_env_value(lookup("DB_SSL_MODE"), &defaults.ssl_mode),
            max_connections: number_from_env_value(
                "DB_MAX_CONNECTIONS",
                lookup("DB_MAX_CONNECTIONS"),
                defaults.max_connections,
            )?,
            acquire_timeout: secs_from_env_value(
                "DB_ACQUIRE_TIMEOUT_SECS",
                lookup("DB_ACQUIRE_TIMEOUT_SECS"),
                DEFAULT_DB_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout: secs_from_env_value(
                "DB_IDLE_TIMEOUT_SECS",
                lookup("DB_IDLE_TIMEOUT_SECS"),
                DEFAULT_DB_IDLE_TIMEOUT_SECS,
            )?,
            max_lifetime: secs_from_env_value(
                "DB_MAX_LIFETIME_SECS",
                lookup("DB_MAX_LIFETIME_SECS"),
                DEFAULT_DB_MAX_LIFETIME_SECS,
            )?,
        };

        let (jwt_secret, using_dev_secret) = jwt_secret_from_env_value(lookup("JWT_SECRET"))?;
        let ttl_hours = number_from_env_value(
            "TOKEN_TTL_HOURS",
            lookup("TOKEN_TTL_HOURS"),
            DEFAULT_TOKEN_TTL_HOURS,
        )?;
        if ttl_hours <= 0 {
            return Err(DentalError::Config("TOKEN_TTL_HOURS must be positive".into()));
        }
        let auth = AuthConfig {
            jwt_secret,
            using_dev_secret,
            token_ttl: chrono::Duration::hours(ttl_hours),
            bcrypt_cost: bcrypt_cost_from_env_value(lookup("BCRYPT_COST"))?,
            google_tokeninfo_url: Some(string_from_env_value(
                lookup("GOOGLE_TOKENINFO_URL"),
                DEFAULT_GOOGLE_TOKENINFO_URL,
            )),
        };

        Ok(Self {
            rest_addr: string_from_env_value(lookup("DENTAL_REST_ADDR"), DEFAULT_REST_ADDR),
            datastore: datastore_from_env_value(lookup("DENTAL_DATASTORE"))?,
            database,
            auth,
            ml_service_url: optional_from_env_value(lookup("ML_SERVICE_URL"))
                .map(|url| url.trim_end_matches('/').to_owned()),
            shutdown_grace: secs_from_env_value(
                "SHUTDOWN_GRACE_SECS",
                lookup("SHUTDOWN_GRACE_SECS"),
                DEFAULT_SHUTDOWN_GRACE_SECS,
            )?,
            run_migrations: bool_from_env_value(
                "DENTAL_RUN_MIGRATIONS",
                lookup("DENTAL_RUN_MIGRATIONS"),
                true,
            )?,
        })
    }
}

/// Trims the value and treats empty or whitespace-only values as unset.
pub fn optional_from_env_value(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn string_from_env_value(value: Option<String>, default: &str) -> String {
    optional_from_env_value(value).unwrap_or_else(|| default.to_owned())
}

/// Parses a numeric value, falling back to `default` when unset.
pub fn number_from_env_value<T>(name: &str, value: Option<String>, default: T) -> DentalResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_from_env_value(value) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| DentalError::Config(format!("{name}='{raw}': {e}"))),
    }
}

fn secs_from_env_value(name: &str, value: Option<String>, default: u64) -> DentalResult<Duration> {
    number_from_env_value(name, value, default).map(Duration::from_secs)
}

/// Parses a boolean flag (`true/false`, `1/0`, `yes/no`).
pub fn bool_from_env_value(name: &str, value: Option<String>, default: bool) -> DentalResult<bool> {
    match optional_from_env_value(value).map(|v| v.to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "true" | "1" | "yes") => Ok(true),
        Some(v) if matches!(v.as_str(), "false" | "0" | "no") => Ok(false),
        Some(v) => Err(DentalError::Config(format!("{name}='{v}' is not a boolean"))),
    }
}

/// Parses `DENTAL_DATASTORE`; Postgres unless `memory` is asked for.
pub fn datastore_from_env_value(value: Option<String>) -> DentalResult<DatastoreKind> {
    match optional_from_env_value(value)
        .map(|v| v.to_ascii_lowercase())
        .as_deref()
    {
        None | Some("postgres") | Some("postgresql") => Ok(DatastoreKind::Postgres),
        Some("memory") => Ok(DatastoreKind::Memory),
        Some(other) => Err(DentalError::Config(format!(
            "DENTAL_DATASTORE='{other}', expected 'postgres' or 'memory'"
        ))),
    }
}

/// Resolves the token signing secret.
///
/// Returns the secret bytes and whether the development fallback was used. A configured
/// secret shorter than the minimum length is rejected rather than silently accepted.
pub fn jwt_secret_from_env_value(value: Option<String>) -> DentalResult<(Vec<u8>, bool)> {
    match optional_from_env_value(value) {
        None => Ok((DEV_JWT_SECRET.as_bytes().to_vec(), true)),
        Some(secret) if secret.len() < MIN_JWT_SECRET_LEN => Err(DentalError::Config(format!(
            "JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} bytes"
        ))),
        Some(secret) => Ok((secret.into_bytes(), false)),
    }
}

pub fn bcrypt_cost_from_env_value(value: Option<String>) -> DentalResult<u32> {
    let cost = number_from_env_value("BCRYPT_COST", value, DEFAULT_BCRYPT_COST)?;
    if !(4..=31).contains(&cost) {
        return Err(DentalError::Config(format!(
            "BCRYPT_COST={cost} is outside 4..=31"
        )));
    }
    Ok(cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> DentalResult<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let cfg = config_from(&[]).expect("defaults should resolve");
        assert_eq!(cfg.rest_addr, "0.0.0.0:8080");
        assert_eq!(cfg.datastore, DatastoreKind::Postgres);
        assert_eq!(cfg.database.host, "localhost");
        assert_eq!(cfg.database.port, 5432);
        assert_eq!(cfg.database.name, "dental_scheduler");
        assert_eq!(cfg.database.max_connections, 25);
        assert_eq!(cfg.database.max_lifetime, Duration::from_secs(3600));
        assert_eq!(cfg.auth.token_ttl, chrono::Duration::hours(72));
        assert!(cfg.auth.using_dev_secret);
        assert!(cfg.ml_service_url.is_none());
        assert_eq!(cfg.shutdown_grace, Duration::from_secs(5));
        assert!(cfg.run_migrations);
    }

    #[test]
    fn test_overrides_are_applied() {
        let cfg = config_from(&[
            ("DENTAL_DATASTORE", "memory"),
            ("DB_PORT", "6543"),
            ("JWT_SECRET", "a-secret-of-sufficient-length"),
            ("ML_SERVICE_URL", "http://ml:8000/"),
            ("DENTAL_RUN_MIGRATIONS", "no"),
        ])
        .expect("overrides should resolve");
        assert_eq!(cfg.datastore, DatastoreKind::Memory);
        assert_eq!(cfg.database.port, 6543);
        assert!(!cfg.auth.using_dev_secret);
        assert_eq!(cfg.auth.jwt_secret, b"a-secret-of-sufficient-length".to_vec());
        assert_eq!(cfg.ml_service_url.as_deref(), Some("http://ml:8000"));
        assert!(!cfg.run_migrations);
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        assert_eq!(optional_from_env_value(Some("   ".into())), None);
        let port = number_from_env_value("DB_PORT", Some(" ".into()), 5432u16)
            .expect("blank should use default");
        assert_eq!(port, 5432);
    }

    #[test]
    fn test_invalid_number_names_variable() {
        let err = config_from(&[("DB_MAX_CONNECTIONS", "lots")]).expect_err("should fail");
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));
    }

    #[test]
    fn test_short_jwt_secret_is_rejected() {
        assert!(jwt_secret_from_env_value(Some("short".into())).is_err());
    }

    #[test]
    fn test_unknown_datastore_is_rejected() {
        assert!(datastore_from_env_value(Some("sqlite".into())).is_err());
        assert_eq!(
            datastore_from_env_value(Some("MEMORY".into())).expect("should parse"),
            DatastoreKind::Memory
        );
    }

    #[test]
    fn test_bcrypt_cost_bounds() {
        assert!(bcrypt_cost_from_env_value(Some("3".into())).is_err());
        assert_eq!(
            bcrypt_cost_from_env_value(Some("4".into())).expect("minimum cost"),
            4
        );
    }

    #[test]
    fn test_connect_options_reject_bad_ssl_mode() {
        let db = DatabaseConfig {
            ssl_mode: "sometimes".into(),
            ..DatabaseConfig::default()
        };
        assert!(db.connect_options().is_err());
    }
}
