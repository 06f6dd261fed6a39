use crate::auth::token::TokenError;
use crate::models::FederatedIdentity;
use dental_types::patch::NullField;
use dental_types::{ParseEnumError, TextError};

/// Every failure the core can report.
///
/// The first group is caller-facing and maps one-to-one onto HTTP statuses in `api-rest`.
/// The second group is internal: callers only ever see a generic message while the detail
/// is logged server-side.
#[derive(Debug, thiserror::Error)]
pub enum DentalError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("no account registered for {}", .0.email)]
    NeedsRegistration(FederatedIdentity),
    #[error("invalid token: {0}")]
    Token(#[from] TokenError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to apply migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
    #[error("downstream service error: {0}")]
    Downstream(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl DentalError {
    pub fn validation(message: impl Into<String>) -> Self {
        DentalError::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        DentalError::Conflict(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        DentalError::Unauthorized(message.into())
    }

    /// Whether the error is caused by the caller rather than by the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DentalError::Validation(_)
                | DentalError::Unauthorized(_)
                | DentalError::Forbidden(_)
                | DentalError::NotFound(_)
                | DentalError::Conflict(_)
                | DentalError::NeedsRegistration(_)
                | DentalError::Token(_)
        )
    }
}

impl From<ParseEnumError> for DentalError {
    fn from(err: ParseEnumError) -> Self {
        DentalError::Validation(err.to_string())
    }
}

impl From<NullField> for DentalError {
    fn from(err: NullField) -> Self {
        DentalError::Validation(err.to_string())
    }
}

/// Attaches the offending field name to a text validation failure.
pub(crate) fn field_error(field: &str, err: TextError) -> DentalError {
    match err {
        TextError::Empty => DentalError::Validation(format!("{field} is required")),
        TextError::InvalidEmail(value) => {
            DentalError::Validation(format!("{field} is not a valid email address: {value}"))
        }
    }
}

pub type DentalResult<T> = std::result::Result<T, DentalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_entity() {
        assert_eq!(DentalError::NotFound("Patient").to_string(), "Patient not found");
    }

    #[test]
    fn test_field_error_names_field() {
        let err = field_error("firstName", TextError::Empty);
        assert_eq!(err.to_string(), "firstName is required");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_internal_errors_are_not_client_errors() {
        assert!(!DentalError::Internal("boom".into()).is_client_error());
        assert!(!DentalError::Downstream("502".into()).is_client_error());
    }
}
