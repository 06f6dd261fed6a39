use super::{email_patch, found, non_null, optional_text, removed, required_text_patch};
use crate::auth::{Claims, GoogleIdentityVerifier, IdentityVerifier, PasswordHasher, TokenSigner};
use crate::config::AuthConfig;
use crate::constants::MIN_PASSWORD_LEN;
use crate::error::field_error;
use crate::models::{
    AuthSession, ChangePasswordRequest, FederatedLoginRequest, FederatedRegisterRequest,
    LoginRequest, NewUser, RegisterRequest, UpdateProfileRequest, User,
};
use crate::repositories::{Datastore, UserStore};
use crate::{DentalError, DentalResult};
use dental_types::{EmailAddress, NonEmptyText};
use std::sync::Arc;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Accounts, passwords and session tokens.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenSigner,
    identity: Arc<dyn IdentityVerifier>,
}

impl AuthService {
    pub fn new(
        store: &Datastore,
        hasher: PasswordHasher,
        tokens: TokenSigner,
        identity: Arc<dyn IdentityVerifier>,
    ) -> Self {
        Self {
            users: store.users.clone(),
            hasher,
            tokens,
            identity,
        }
    }

    pub fn from_config(store: &Datastore, config: &AuthConfig) -> DentalResult<Self> {
        Ok(Self::new(
            store,
            PasswordHasher::new(config.bcrypt_cost)?,
            TokenSigner::from_config(config),
            Arc::new(GoogleIdentityVerifier::new(
                config.google_tokeninfo_url.clone(),
            )?),
        ))
    }

    pub fn tokens(&self) -> &TokenSigner {
        &self.tokens
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    pub async fn register(&self, req: RegisterRequest) -> DentalResult<AuthSession> {
        let email = EmailAddress::parse(&req.email).map_err(|err| field_error("email", err))?;
        check_password_length("password", &req.password)?;
        let first_name = non_empty("firstName", &req.first_name)?;
        let last_name = non_empty("lastName", &req.last_name)?;

        let password_hash = self.hasher.hash(&req.password).await?;
        let user = self
            .users
            .create(&NewUser {
                email,
                password_hash: Some(password_hash),
                google_id: None,
                first_name,
                last_name,
                role: req.role,
                phone: optional_text(req.phone),
            })
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "registered user");
        self.session(user)
    }

    pub async fn login(&self, req: LoginRequest) -> DentalResult<AuthSession> {
        let address = req.email.trim().to_ascii_lowercase();
        if address.is_empty() || req.password.is_empty() {
            return Err(DentalError::validation("email and password are required"));
        }

        let record = self.users.find_by_email(&address).await?;
        let stored_hash = record.as_ref().and_then(|r| r.password_hash.as_deref());
        // Runs even for unknown emails so both failures take the same time.
        let verified = self.hasher.verify(&req.password, stored_hash).await?;

        match record {
            Some(record) if verified => self.session(record.user),
            _ => Err(DentalError::unauthorized(INVALID_CREDENTIALS)),
        }
    }

    pub async fn current_user(&self, user_id: i64) -> DentalResult<User> {
        let record = found("User", self.users.get(user_id).await?)?;
        Ok(record.user)
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        req: UpdateProfileRequest,
    ) -> DentalResult<User> {
        non_null("phone", &req.phone)?;
        let patch = UpdateProfileRequest {
            email: email_patch("email", &req.email)?,
            first_name: required_text_patch("firstName", &req.first_name)?,
            last_name: required_text_patch("lastName", &req.last_name)?,
            phone: req.phone.map(|p| p.trim().to_owned()),
        };
        found("User", self.users.update_profile(user_id, &patch).await?)
    }

    pub async fn change_password(
        &self,
        user_id: i64,
        req: ChangePasswordRequest,
    ) -> DentalResult<()> {
        check_password_length("newPassword", &req.new_password)?;
        let record = found("User", self.users.get(user_id).await?)?;

        let verified = self
            .hasher
            .verify(&req.current_password, record.password_hash.as_deref())
            .await?;
        if !verified {
            return Err(DentalError::unauthorized("Current password is incorrect"));
        }

        let hash = self.hasher.hash(&req.new_password).await?;
        let updated = self.users.set_password(user_id, &hash).await?;
        removed("User", updated)
    }

    /// Signs in an existing account. Unknown identities come back as
    /// [`DentalError::NeedsRegistration`]; nothing is created here.
    pub async fn federated_login(&self, req: FederatedLoginRequest) -> DentalResult<AuthSession> {
        let identity = self.identity.verify(&req.id_token).await?;
        match self.users.find_by_email(&identity.email).await? {
            Some(record) => self.session(record.user),
            None => Err(DentalError::NeedsRegistration(identity)),
        }
    }

    /// Creates a password-less account for a verified identity.
    pub async fn federated_register(
        &self,
        req: FederatedRegisterRequest,
    ) -> DentalResult<AuthSession> {
        let identity = self.identity.verify(&req.id_token).await?;
        if self.users.find_by_email(&identity.email).await?.is_some() {
            return Err(DentalError::conflict("User already exists"));
        }

        let first_name = req.first_name.unwrap_or(identity.first_name);
        let last_name = req.last_name.unwrap_or(identity.last_name);
        let google_id = Some(identity.google_id).filter(|id| !id.is_empty());

        let user = self
            .users
            .create(&NewUser {
                email: EmailAddress::parse(&identity.email)
                    .map_err(|err| field_error("email", err))?,
                password_hash: None,
                google_id,
                first_name: non_empty("firstName", &first_name)?,
                last_name: non_empty("lastName", &last_name)?,
                role: req.role,
                phone: optional_text(req.phone),
            })
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "registered federated user");
        self.session(user)
    }

    pub fn verify_token(&self, token: &str) -> DentalResult<Claims> {
        Ok(self.tokens.verify(token)?)
    }

    fn session(&self, user: User) -> DentalResult<AuthSession> {
        let token = self.tokens.issue(user.id, user.role)?;
        Ok(AuthSession { token, user })
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("hasher", &self.hasher)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

fn check_password_length(field: &str, password: &str) -> DentalResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DentalError::Validation(format!(
            "{field} must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn non_empty(field: &str, value: &str) -> DentalResult<NonEmptyText> {
    NonEmptyText::new(value).map_err(|err| field_error(field, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FederatedIdentity;
    use async_trait::async_trait;
    use chrono::Duration;
    use dental_types::{Patch, Role};

    struct FixedIdentity(FederatedIdentity);

    #[async_trait]
    impl IdentityVerifier for FixedIdentity {
        async fn verify(&self, assertion: &str) -> DentalResult<FederatedIdentity> {
            if assertion == "valid" {
                Ok(self.0.clone())
            } else {
                Err(DentalError::unauthorized("Invalid Google ID token"))
            }
        }
    }

    fn service() -> AuthService {
        let identity = FederatedIdentity {
            email: "gina@example.com".into(),
            first_name: "Gina".into(),
            last_name: "Ortiz".into(),
            google_id: "g-42".into(),
        };
        AuthService::new(
            &Datastore::in_memory(),
            PasswordHasher::new(4).expect("cost 4 is valid"),
            TokenSigner::new(b"unit-test-secret-0123".to_vec(), Duration::hours(72)),
            Arc::new(FixedIdentity(identity)),
        )
    }

    fn registration(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: "secret1".into(),
            first_name: "Dana".into(),
            last_name: "Smith".into(),
            role: Role::Dentist,
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = service();
        let session = auth
            .register(registration("Dana@Example.com"))
            .await
            .expect("registration should succeed");
        assert_eq!(session.user.email, "dana@example.com");

        let claims = auth.verify_token(&session.token).expect("token should verify");
        assert_eq!(claims.sub, session.user.id);
        assert_eq!(claims.role, Role::Dentist);

        let login = auth
            .login(LoginRequest {
                email: "dana@example.com".into(),
                password: "secret1".into(),
            })
            .await
            .expect("login should succeed");
        assert_eq!(login.user.id, session.user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let auth = service();
        auth.register(registration("dup@example.com"))
            .await
            .expect("first registration should succeed");
        let err = auth
            .register(registration("dup@example.com"))
            .await
            .expect_err("second registration must fail");
        assert!(matches!(err, DentalError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_short_password_is_rejected() {
        let mut req = registration("short@example.com");
        req.password = "12345".into();
        let err = service().register(req).await.expect_err("must fail");
        assert!(matches!(err, DentalError::Validation(_)));
    }

    #[tokio::test]
    async fn test_login_failures_share_one_message() {
        let auth = service();
        auth.register(registration("x@example.com"))
            .await
            .expect("registration should succeed");

        let wrong_password = auth
            .login(LoginRequest {
                email: "x@example.com".into(),
                password: "nope123".into(),
            })
            .await
            .expect_err("wrong password must fail");
        let unknown = auth
            .login(LoginRequest {
                email: "nobody@example.com".into(),
                password: "secret1".into(),
            })
            .await
            .expect_err("unknown email must fail");
        assert_eq!(wrong_password.to_string(), INVALID_CREDENTIALS);
        assert_eq!(unknown.to_string(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_change_password_requires_current() {
        let auth = service();
        let session = auth
            .register(registration("pw@example.com"))
            .await
            .expect("registration should succeed");

        let err = auth
            .change_password(
                session.user.id,
                ChangePasswordRequest {
                    current_password: "wrong11".into(),
                    new_password: "another1".into(),
                },
            )
            .await
            .expect_err("wrong current password must fail");
        assert!(matches!(err, DentalError::Unauthorized(_)));

        auth.change_password(
            session.user.id,
            ChangePasswordRequest {
                current_password: "secret1".into(),
                new_password: "another1".into(),
            },
        )
        .await
        .expect("change should succeed");
        auth.login(LoginRequest {
            email: "pw@example.com".into(),
            password: "another1".into(),
        })
        .await
        .expect("new password should work");
    }

    #[tokio::test]
    async fn test_profile_update_keeps_role_and_rejects_null_names() {
        let auth = service();
        let session = auth
            .register(registration("p@example.com"))
            .await
            .expect("registration should succeed");

        let updated = auth
            .update_profile(
                session.user.id,
                UpdateProfileRequest {
                    first_name: Patch::Value("Danielle".into()),
                    ..UpdateProfileRequest::default()
                },
            )
            .await
            .expect("update should succeed");
        assert_eq!(updated.first_name, "Danielle");
        assert_eq!(updated.last_name, "Smith");
        assert_eq!(updated.role, Role::Dentist);

        let err = auth
            .update_profile(
                session.user.id,
                UpdateProfileRequest {
                    last_name: Patch::Null,
                    ..UpdateProfileRequest::default()
                },
            )
            .await
            .expect_err("null last name must fail");
        assert!(matches!(err, DentalError::Validation(_)));
    }

    #[tokio::test]
    async fn test_federated_login_needs_registration_first() {
        let auth = service();
        let err = auth
            .federated_login(FederatedLoginRequest {
                id_token: "valid".into(),
            })
            .await
            .expect_err("unknown identity must not sign in");
        let DentalError::NeedsRegistration(identity) = err else {
            panic!("expected NeedsRegistration, got {err:?}");
        };
        assert_eq!(identity.google_id, "g-42");

        let registered = auth
            .federated_register(FederatedRegisterRequest {
                id_token: "valid".into(),
                role: Role::Hygienist,
                phone: None,
                first_name: None,
                last_name: None,
            })
            .await
            .expect("federated registration should succeed");
        assert_eq!(registered.user.first_name, "Gina");

        let session = auth
            .federated_login(FederatedLoginRequest {
                id_token: "valid".into(),
            })
            .await
            .expect("registered identity should sign in");
        assert_eq!(session.user.id, registered.user.id);

        // No password was set, so password login stays closed.
        let err = auth
            .login(LoginRequest {
                email: "gina@example.com".into(),
                password: "anything".into(),
            })
            .await
            .expect_err("federated account has no password");
        assert!(matches!(err, DentalError::Unauthorized(_)));
    }
}
