use api_shared::{HealthResponse, HealthService};
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Health check response", body = HealthResponse)
    )
)]
/// Health check endpoint for the REST API
///
/// Used by load balancers and container orchestration; needs no credentials and touches no
/// datastore.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthService::check_health())
}
