use super::created;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::middleware::AuthUser;
use crate::state::AppState;
use api_shared::ErrorBody;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use dental_core::models::{
    AuthSession, ChangePasswordRequest, FederatedIdentity, FederatedLoginRequest,
    FederatedRegisterRequest, LoginRequest, MessageResponse, RegisterRequest,
    UpdateProfileRequest, User,
};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = AuthSession),
        (status = 400, description = "Invalid registration data", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody)
    )
)]
/// Create a staff account
///
/// # Returns
/// * `201` with a session token and the new account
///
/// # Errors
/// Returns `400 Bad Request` for an invalid email, a short password or blank names, and
/// `409 Conflict` when the email is taken.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthSession>)> {
    Ok(created(state.services.auth.register(req).await?))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthSession),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
/// Sign in with email and password
///
/// Unknown emails and wrong passwords are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthSession>> {
    Ok(Json(state.services.auth.login(req).await?))
}

#[utoipa::path(
    post,
    path = "/api/auth/google",
    tag = "auth",
    request_body = FederatedLoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthSession),
        (status = 401, description = "Assertion rejected", body = ErrorBody),
        (status = 404, description = "No account yet; details carry the asserted identity", body = FederatedIdentity)
    )
)]
/// Sign in with a Google identity assertion
///
/// Never creates an account. An unknown identity answers `404` with the asserted email and
/// names under `details` so the client can continue with registration.
pub async fn google_login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<FederatedLoginRequest>,
) -> ApiResult<Json<AuthSession>> {
    Ok(Json(state.services.auth.federated_login(req).await?))
}

#[utoipa::path(
    post,
    path = "/api/auth/google/register",
    tag = "auth",
    request_body = FederatedRegisterRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = AuthSession),
        (status = 401, description = "Assertion rejected", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody)
    )
)]
/// Create a password-less account for a verified Google identity
pub async fn google_register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<FederatedRegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthSession>)> {
    Ok(created(state.services.auth.federated_register(req).await?))
}

#[utoipa::path(
    get,
    path = "/api/auth/user",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The signed-in account", body = User),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "Account no longer exists", body = ErrorBody)
    )
)]
pub async fn current_user(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<Json<User>> {
    Ok(Json(state.services.auth.current_user(caller.user_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/auth/user",
    tag = "auth",
    security(("bearer" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated account", body = User),
        (status = 400, description = "Invalid profile data", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody)
    )
)]
/// Partially update the caller's profile. The role cannot be changed here.
pub async fn update_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    Ok(Json(
        state
            .services
            .auth
            .update_profile(caller.user_id, req)
            .await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/auth/password",
    tag = "auth",
    security(("bearer" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "New password too short", body = ErrorBody),
        (status = 401, description = "Current password is incorrect", body = ErrorBody)
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .services
        .auth
        .change_password(caller.user_id, req)
        .await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}
