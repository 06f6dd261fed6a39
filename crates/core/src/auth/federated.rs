//! Federated identity assertions.
//!
//! An assertion is first checked against the provider's tokeninfo endpoint. If the endpoint
//! cannot be reached or refuses the token, the assertion is read as a base64 JSON credential
//! instead (`{email, name?, given_name?, family_name?, id?}`).

use crate::models::FederatedIdentity;
use crate::{DentalError, DentalResult};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use dental_types::EmailAddress;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Turns an identity assertion into a verified identity.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, assertion: &str) -> DentalResult<FederatedIdentity>;
}

/// Verifier for Google ID tokens.
#[derive(Debug, Clone)]
pub struct GoogleIdentityVerifier {
    client: reqwest::Client,
    /// `None` skips the remote check and only decodes credentials locally.
    tokeninfo_url: Option<String>,
}

impl GoogleIdentityVerifier {
    pub fn new(tokeninfo_url: Option<String>) -> DentalResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .map_err(|err| DentalError::Config(format!("identity provider client: {err}")))?;
        Ok(Self {
            client,
            tokeninfo_url,
        })
    }

    async fn tokeninfo(&self, url: &str, assertion: &str) -> Option<ProviderClaims> {
        let response = match self
            .client
            .get(url)
            .query(&[("id_token", assertion)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("identity provider unreachable: {err}");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("identity provider rejected token: {}", response.status());
            return None;
        }

        match response.json::<ProviderClaims>().await {
            Ok(claims) => Some(claims),
            Err(err) => {
                tracing::warn!("identity provider returned an unreadable body: {err}");
                None
            }
        }
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdentityVerifier {
    async fn verify(&self, assertion: &str) -> DentalResult<FederatedIdentity> {
        let assertion = assertion.trim();
        if assertion.is_empty() {
            return Err(DentalError::validation("idToken is required"));
        }

        if let Some(url) = &self.tokeninfo_url {
            if let Some(claims) = self.tokeninfo(url, assertion).await {
                if claims.email_verified != Some(true) {
                    return Err(DentalError::unauthorized("Google email is not verified"));
                }
                return claims.into_identity();
            }
        }

        decode_credential(assertion)?.into_identity()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ProviderClaims {
    #[serde(default)]
    email: String,
    #[serde(default, alias = "verified_email", deserialize_with = "bool_or_string")]
    email_verified: Option<bool>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    given_name: String,
    #[serde(default)]
    family_name: String,
    #[serde(default, alias = "id")]
    sub: String,
}

impl ProviderClaims {
    fn into_identity(self) -> DentalResult<FederatedIdentity> {
        let email = EmailAddress::parse(&self.email)
            .map_err(|_| DentalError::unauthorized("Invalid Google ID token"))?;

        let (first_name, last_name) = if self.given_name.is_empty() && self.family_name.is_empty()
        {
            let mut parts = self.name.split_whitespace();
            let first = parts.next().unwrap_or_default().to_owned();
            let last = parts.next().unwrap_or_default().to_owned();
            (first, last)
        } else {
            (self.given_name, self.family_name)
        };

        Ok(FederatedIdentity {
            email: email.into_inner(),
            first_name,
            last_name,
            google_id: self.sub,
        })
    }
}

fn decode_credential(assertion: &str) -> DentalResult<ProviderClaims> {
    let invalid = || DentalError::unauthorized("Invalid Google ID token");
    let bytes = STANDARD.decode(assertion).map_err(|_| invalid())?;
    serde_json::from_slice(&bytes).map_err(|_| invalid())
}

/// Google reports `email_verified` as `"true"` in tokeninfo and as `true` elsewhere.
fn bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(value)) => Some(value),
        Some(Flag::Text(text)) => Some(text.eq_ignore_ascii_case("true")),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(json: &str) -> String {
        STANDARD.encode(json)
    }

    fn offline() -> GoogleIdentityVerifier {
        GoogleIdentityVerifier::new(None).expect("client should build")
    }

    #[tokio::test]
    async fn test_decodes_local_credential() {
        let identity = offline()
            .verify(&credential(
                r#"{"email":"Ann@Example.com","given_name":"Ann","family_name":"Lee","id":"g-1"}"#,
            ))
            .await
            .expect("credential should decode");
        assert_eq!(identity.email, "ann@example.com");
        assert_eq!(identity.first_name, "Ann");
        assert_eq!(identity.last_name, "Lee");
        assert_eq!(identity.google_id, "g-1");
    }

    #[tokio::test]
    async fn test_splits_full_name_when_parts_missing() {
        let identity = offline()
            .verify(&credential(r#"{"email":"bo@example.com","name":"Bo Diddley"}"#))
            .await
            .expect("credential should decode");
        assert_eq!(identity.first_name, "Bo");
        assert_eq!(identity.last_name, "Diddley");
    }

    #[tokio::test]
    async fn test_credential_without_email_is_rejected() {
        let err = offline()
            .verify(&credential(r#"{"name":"Nobody"}"#))
            .await
            .expect_err("missing email must fail");
        assert!(matches!(err, DentalError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_garbage_assertion_is_rejected() {
        let err = offline()
            .verify("not base64 at all!")
            .await
            .expect_err("garbage must fail");
        assert!(matches!(err, DentalError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_empty_assertion_is_a_validation_error() {
        let err = offline().verify("  ").await.expect_err("empty must fail");
        assert!(matches!(err, DentalError::Validation(_)));
    }

    #[test]
    fn test_email_verified_accepts_string_and_bool() {
        let text: ProviderClaims =
            serde_json::from_str(r#"{"email_verified":"true"}"#).expect("should parse");
        assert_eq!(text.email_verified, Some(true));
        let flag: ProviderClaims =
            serde_json::from_str(r#"{"verified_email":false}"#).expect("should parse");
        assert_eq!(flag.email_verified, Some(false));
    }
}
