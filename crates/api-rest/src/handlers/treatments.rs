use super::{created, deleted};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;
use api_shared::ErrorBody;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use dental_core::models::{
    CreateTreatmentRequest, MessageResponse, PatientTreatment, QueueFilter, Treatment,
    UpdateTreatmentRequest,
};

#[utoipa::path(
    get,
    path = "/api/treatments",
    tag = "treatments",
    security(("bearer" = [])),
    responses((status = 200, description = "Treatment catalog by name", body = [Treatment]))
)]
pub async fn list_treatments(State(state): State<AppState>) -> ApiResult<Json<Vec<Treatment>>> {
    Ok(Json(state.services.treatments.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/treatments/queue",
    tag = "treatments",
    security(("bearer" = [])),
    params(QueueFilter),
    responses(
        (status = 200, description = "Pending and in-progress work, most urgent first", body = [PatientTreatment])
    )
)]
/// The treatment queue
///
/// Ordered by priority (urgent, high, normal, low), then start date, then id.
pub async fn treatment_queue(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<QueueFilter>,
) -> ApiResult<Json<Vec<PatientTreatment>>> {
    Ok(Json(state.services.treatments.queue(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/treatments/{id}",
    tag = "treatments",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Treatment id")),
    responses(
        (status = 200, description = "The catalog entry", body = Treatment),
        (status = 404, description = "Treatment not found", body = ErrorBody)
    )
)]
pub async fn get_treatment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Treatment>> {
    Ok(Json(state.services.treatments.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/treatments",
    tag = "treatments",
    security(("bearer" = [])),
    request_body = CreateTreatmentRequest,
    responses(
        (status = 201, description = "Catalog entry created", body = Treatment),
        (status = 400, description = "Invalid treatment data", body = ErrorBody),
        (status = 403, description = "Dentist role required", body = ErrorBody)
    )
)]
pub async fn create_treatment(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateTreatmentRequest>,
) -> ApiResult<(StatusCode, Json<Treatment>)> {
    Ok(created(state.services.treatments.create(req).await?))
}

#[utoipa::path(
    put,
    path = "/api/treatments/{id}",
    tag = "treatments",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Treatment id")),
    request_body = UpdateTreatmentRequest,
    responses(
        (status = 200, description = "Updated catalog entry", body = Treatment),
        (status = 400, description = "Invalid treatment data", body = ErrorBody),
        (status = 403, description = "Dentist role required", body = ErrorBody),
        (status = 404, description = "Treatment not found", body = ErrorBody)
    )
)]
pub async fn update_treatment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateTreatmentRequest>,
) -> ApiResult<Json<Treatment>> {
    Ok(Json(state.services.treatments.update(id, req).await?))
}

#[utoipa::path(
    delete,
    path = "/api/treatments/{id}",
    tag = "treatments",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Treatment id")),
    responses(
        (status = 200, description = "Catalog entry deleted", body = MessageResponse),
        (status = 403, description = "Dentist role required", body = ErrorBody),
        (status = 404, description = "Treatment not found", body = ErrorBody),
        (status = 409, description = "Treatment is still assigned or claimed", body = ErrorBody)
    )
)]
pub async fn delete_treatment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.treatments.delete(id).await?;
    Ok(deleted("Treatment"))
}
