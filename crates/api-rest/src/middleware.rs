//! Authorization middleware.
//!
//! [`require_auth`] resolves the bearer token into an [`AuthUser`] stored in the request
//! extensions. [`require_role`] runs after it on sub-routers that need a specific role.

use crate::error::ApiError;
use crate::state::AppState;
use api_shared::{bearer_token, BearerError};
use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use dental_types::Role;

/// The authenticated caller, as asserted by a verified session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: Role,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = match request.headers().get(AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| rejected(BearerError::Malformed))?),
        None => None,
    };
    let token = bearer_token(header).map_err(rejected)?;

    let claims = state.services.auth.verify_token(token).map_err(|err| {
        tracing::debug!(error = %err, "rejected session token");
        ApiError::unauthorized("Invalid token")
    })?;

    request.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        role: claims.role,
    });
    Ok(next.run(request).await)
}

fn rejected(err: BearerError) -> ApiError {
    ApiError::unauthorized(err.to_string())
}

/// Admits callers whose role is `required`, or admins.
pub async fn require_role(
    State(required): State<Role>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = request
        .extensions()
        .get::<AuthUser>()
        .copied()
        .ok_or_else(|| ApiError::unauthorized("Authorization header required"))?;

    if !caller.role.satisfies(required) {
        tracing::info!(
            user_id = caller.user_id,
            role = %caller.role,
            %required,
            "role check failed"
        );
        return Err(ApiError::forbidden(format!("{required} role required")));
    }
    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| ApiError::unauthorized("Authorization header required"))
    }
}
