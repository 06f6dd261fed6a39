//! Parsing of the `Authorization` request header.

use std::fmt;

const BEARER_SCHEME: &str = "Bearer";

/// Why an `Authorization` header could not yield a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearerError {
    /// The header is absent or blank.
    Missing,
    /// The header is present but not of the form `Bearer <token>`.
    Malformed,
}

impl fmt::Display for BearerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BearerError::Missing => f.write_str("Authorization header required"),
            BearerError::Malformed => f.write_str("Invalid authorization header"),
        }
    }
}

impl std::error::Error for BearerError {}

/// Extracts the token from a `Bearer <token>` header value.
///
/// The scheme is matched case-insensitively. Anything other than exactly one non-empty
/// token after the scheme is malformed.
pub fn bearer_token(header: Option<&str>) -> Result<&str, BearerError> {
    let header = header.map(str::trim).filter(|h| !h.is_empty());
    let header = header.ok_or(BearerError::Missing)?;

    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => {
            Ok(token)
        }
        _ => Err(BearerError::Malformed),
    }
}
