use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::state::AppState;
use api_shared::ErrorBody;
use axum::extract::State;
use axum::Json;
use dental_core::models::DashboardStats;

#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "dashboard",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Headline numbers for the caller", body = DashboardStats),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    )
)]
/// Today's appointments of the caller, patient count, treatment queue length and this
/// month's revenue.
pub async fn dashboard_stats(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.services.dashboard.stats(caller.user_id).await?))
}
