use super::{created, deleted};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::AuthUser;
use crate::state::AppState;
use api_shared::ErrorBody;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use dental_core::models::{
    CreatePatientTreatmentRequest, MessageResponse, PatientTreatment, PatientTreatmentFilter,
    UpdatePatientTreatmentRequest,
};

#[utoipa::path(
    get,
    path = "/api/patient-treatments",
    tag = "patient-treatments",
    security(("bearer" = [])),
    params(PatientTreatmentFilter),
    responses(
        (status = 200, description = "Assigned treatments, newest first", body = [PatientTreatment])
    )
)]
pub async fn list_assignments(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<PatientTreatmentFilter>,
) -> ApiResult<Json<Vec<PatientTreatment>>> {
    Ok(Json(
        state.services.treatments.list_assignments(&filter).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/patient-treatments",
    tag = "patient-treatments",
    security(("bearer" = [])),
    request_body = CreatePatientTreatmentRequest,
    responses(
        (status = 201, description = "Treatment assigned", body = PatientTreatment),
        (status = 400, description = "Invalid assignment or unknown reference", body = ErrorBody)
    )
)]
/// Assign a catalog treatment to a patient
///
/// Without a `dentistId` key the caller becomes the dentist; `"dentistId": null` leaves the
/// assignment without one.
pub async fn create_assignment(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(req): ApiJson<CreatePatientTreatmentRequest>,
) -> ApiResult<(StatusCode, Json<PatientTreatment>)> {
    Ok(created(
        state
            .services
            .treatments
            .assign(caller.user_id, req)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/patient-treatments/{id}",
    tag = "patient-treatments",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "The assignment", body = PatientTreatment),
        (status = 404, description = "Patient treatment not found", body = ErrorBody)
    )
)]
pub async fn get_assignment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<PatientTreatment>> {
    Ok(Json(state.services.treatments.get_assignment(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/patient-treatments/{id}",
    tag = "patient-treatments",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Assignment id")),
    request_body = UpdatePatientTreatmentRequest,
    responses(
        (status = 200, description = "Updated assignment", body = PatientTreatment),
        (status = 400, description = "Invalid assignment data", body = ErrorBody),
        (status = 404, description = "Patient treatment not found", body = ErrorBody)
    )
)]
pub async fn update_assignment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdatePatientTreatmentRequest>,
) -> ApiResult<Json<PatientTreatment>> {
    Ok(Json(
        state.services.treatments.update_assignment(id, req).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/patient-treatments/{id}",
    tag = "patient-treatments",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Assignment removed", body = MessageResponse),
        (status = 404, description = "Patient treatment not found", body = ErrorBody)
    )
)]
pub async fn delete_assignment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.treatments.remove_assignment(id).await?;
    Ok(deleted("Patient treatment"))
}
