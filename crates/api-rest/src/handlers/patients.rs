use super::{created, deleted};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;
use api_shared::ErrorBody;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use dental_core::models::{
    CreatePatientRequest, MessageResponse, Patient, PatientFilter, PatientStats,
    PatientTreatment, UpdatePatientRequest,
};

#[utoipa::path(
    get,
    path = "/api/patients",
    tag = "patients",
    security(("bearer" = [])),
    params(PatientFilter),
    responses(
        (status = 200, description = "Matching patients, newest first", body = [Patient]),
        (status = 400, description = "Invalid filter", body = ErrorBody)
    )
)]
/// List patients, optionally filtered by a search term and risk level
pub async fn list_patients(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<PatientFilter>,
) -> ApiResult<Json<Vec<Patient>>> {
    Ok(Json(state.services.patients.list(&filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/patients/stats",
    tag = "patients",
    security(("bearer" = [])),
    responses((status = 200, description = "Patient counts by risk level", body = PatientStats))
)]
pub async fn patient_stats(State(state): State<AppState>) -> ApiResult<Json<PatientStats>> {
    Ok(Json(state.services.patients.stats().await?))
}

#[utoipa::path(
    post,
    path = "/api/patients",
    tag = "patients",
    security(("bearer" = [])),
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient created", body = Patient),
        (status = 400, description = "Invalid patient data", body = ErrorBody)
    )
)]
pub async fn create_patient(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreatePatientRequest>,
) -> ApiResult<(StatusCode, Json<Patient>)> {
    Ok(created(state.services.patients.create(req).await?))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    tag = "patients",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "The patient", body = Patient),
        (status = 404, description = "Patient not found", body = ErrorBody)
    )
)]
pub async fn get_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Patient>> {
    Ok(Json(state.services.patients.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/patients/{id}",
    tag = "patients",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Patient id")),
    request_body = UpdatePatientRequest,
    responses(
        (status = 200, description = "Updated patient", body = Patient),
        (status = 400, description = "Invalid patient data", body = ErrorBody),
        (status = 404, description = "Patient not found", body = ErrorBody)
    )
)]
/// Partially update a patient
///
/// Keys missing from the body leave the stored value alone; `null` clears optional fields.
pub async fn update_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdatePatientRequest>,
) -> ApiResult<Json<Patient>> {
    Ok(Json(state.services.patients.update(id, req).await?))
}

#[utoipa::path(
    delete,
    path = "/api/patients/{id}",
    tag = "patients",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient deleted", body = MessageResponse),
        (status = 404, description = "Patient not found", body = ErrorBody),
        (status = 409, description = "Patient still has dependent records", body = ErrorBody)
    )
)]
pub async fn delete_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.patients.delete(id).await?;
    Ok(deleted("Patient"))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}/treatments",
    tag = "patients",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Treatments assigned to the patient", body = [PatientTreatment]),
        (status = 404, description = "Patient not found", body = ErrorBody)
    )
)]
pub async fn patient_treatments(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Vec<PatientTreatment>>> {
    Ok(Json(state.services.patients.treatments(id).await?))
}
