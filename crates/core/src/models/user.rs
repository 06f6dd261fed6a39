use chrono::{DateTime, Utc};
use dental_types::{EmailAddress, NonEmptyText, Patch, Role};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A staff account as exposed over the API. The password hash never leaves the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A stored account together with its credentials.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: User,
    /// `None` for accounts created through federated login.
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
}

/// A validated account ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: EmailAddress,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub first_name: NonEmptyText,
    pub last_name: NonEmptyText,
    pub role: Role,
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token plus the account it was issued for.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Profile changes. Role is deliberately absent: it is fixed at creation.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub email: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub first_name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub last_name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub phone: Patch<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Identity asserted by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FederatedIdentity {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub google_id: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FederatedLoginRequest {
    /// ID token from the provider, or a base64 JSON credential.
    #[serde(alias = "credential", alias = "token")]
    pub id_token: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FederatedRegisterRequest {
    #[serde(alias = "credential", alias = "token")]
    pub id_token: String,
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
    /// Overrides the names asserted by the provider.
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}
