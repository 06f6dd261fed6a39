//! Compact HS256 tokens: `base64url(header).base64url(claims).base64url(mac)`.

use crate::config::AuthConfig;
use crate::{DentalError, DentalResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use dental_types::Role;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// What a session token asserts about its bearer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("signature does not match")]
    BadSignature,
    #[error("token has expired")]
    Expired,
}

/// Issues and verifies session tokens with one process-wide secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.jwt_secret.clone(), config.token_ttl)
    }

    pub fn issue(&self, user_id: i64, role: Role) -> DentalResult<String> {
        self.issue_at(user_id, role, Utc::now())
    }

    pub fn issue_at(&self, user_id: i64, role: Role, now: DateTime<Utc>) -> DentalResult<String> {
        let header = Header {
            alg: ALGORITHM.into(),
            typ: "JWT".into(),
        };
        let claims = Claims {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let signing_input = format!("{}.{}", encode_json(&header)?, encode_json(&claims)?);

        let mut mac = self
            .mac()
            .map_err(|_| DentalError::Internal("token secret rejected".into()))?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Checks structure, algorithm, signature and expiry, in that order.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let (signing_input, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
        let (header, claims) = signing_input
            .split_once('.')
            .ok_or(TokenError::Malformed)?;
        if claims.contains('.') {
            return Err(TokenError::Malformed);
        }

        let header: Header = decode_json(header)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac().map_err(|_| TokenError::BadSignature)?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: Claims = decode_json(claims)?;
        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256, hmac::digest::InvalidLength> {
        HmacSha256::new_from_slice(&self.secret)
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn encode_json<T: Serialize>(value: &T) -> DentalResult<String> {
    let json = serde_json::to_vec(value)
        .map_err(|err| DentalError::Internal(format!("token encoding failed: {err}")))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

fn decode_json<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(b"test-secret-0123456789".to_vec(), Duration::hours(72))
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
    }

    #[test]
    fn test_issue_then_verify() {
        let signer = signer();
        let token = signer.issue_at(42, Role::Dentist, now()).expect("should issue");
        let claims = signer.verify_at(&token, now()).expect("should verify");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, Role::Dentist);
        assert_eq!(claims.exp - claims.iat, 72 * 3600);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let signer = signer();
        let token = signer.issue_at(1, Role::Staff, now()).expect("should issue");
        let later = now() + Duration::hours(72);
        assert_eq!(signer.verify_at(&token, later), Err(TokenError::Expired));
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let token = signer().issue_at(1, Role::Staff, now()).expect("should issue");
        let other = TokenSigner::new(b"another-secret-9876543210".to_vec(), Duration::hours(72));
        assert_eq!(other.verify_at(&token, now()), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_tampered_claims_are_rejected() {
        let signer = signer();
        let token = signer.issue_at(1, Role::Staff, now()).expect("should issue");
        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&Claims {
                sub: 1,
                role: Role::Admin,
                iat: 0,
                exp: i64::MAX,
            })
            .expect("should encode"),
        );
        let forged = format!("{}.{}.{}", parts[0], forged_claims, parts[2]);
        assert_eq!(signer.verify_at(&forged, now()), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_alg_none_is_rejected() {
        let signer = signer();
        let token = signer.issue_at(1, Role::Staff, now()).expect("should issue");
        let parts: Vec<&str> = token.split('.').collect();
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let unsigned = format!("{}.{}.", header, parts[1]);
        assert_eq!(
            signer.verify_at(&unsigned, now()),
            Err(TokenError::UnsupportedAlgorithm("none".into()))
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let signer = signer();
        assert_eq!(signer.verify_at("abc", now()), Err(TokenError::Malformed));
        assert_eq!(signer.verify_at("a.b.c.d", now()), Err(TokenError::Malformed));
        assert_eq!(signer.verify_at("!!.??.**", now()), Err(TokenError::Malformed));
    }
}
