//! # Credential & token authority
//!
//! - [`password`]: bcrypt hashing on the blocking pool
//! - [`token`]: HS256 session tokens carrying `{sub, role, iat, exp}`
//! - [`federated`]: identity assertions from the external provider

pub mod federated;
pub mod password;
pub mod token;

pub use federated::{GoogleIdentityVerifier, IdentityVerifier};
pub use password::PasswordHasher;
pub use token::{Claims, TokenError, TokenSigner};
