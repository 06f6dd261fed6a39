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
    Appointment, AppointmentFilter, CreateAppointmentRequest, MessageResponse,
    UpdateAppointmentRequest,
};

// Every appointment route is scoped to the calling dentist. Another dentist's appointment
// answers 404 exactly like a missing one.

#[utoipa::path(
    get,
    path = "/api/appointments",
    tag = "appointments",
    security(("bearer" = [])),
    params(AppointmentFilter),
    responses(
        (status = 200, description = "The caller's appointments, latest date first", body = [Appointment]),
        (status = 400, description = "Invalid filter", body = ErrorBody)
    )
)]
pub async fn list_appointments(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiQuery(filter): ApiQuery<AppointmentFilter>,
) -> ApiResult<Json<Vec<Appointment>>> {
    Ok(Json(
        state
            .services
            .appointments
            .list(caller.user_id, &filter)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/appointments/today",
    tag = "appointments",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The caller's appointments today by start time", body = [Appointment])
    )
)]
pub async fn today_appointments(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<Json<Vec<Appointment>>> {
    Ok(Json(
        state.services.appointments.today(caller.user_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "appointments",
    security(("bearer" = [])),
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked for the caller", body = Appointment),
        (status = 400, description = "Past date, inverted times or unknown patient", body = ErrorBody)
    )
)]
/// Book an appointment with the caller as dentist
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - the date lies before today,
/// - `endTime` is not after `startTime`,
/// - the patient does not exist.
pub async fn create_appointment(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(req): ApiJson<CreateAppointmentRequest>,
) -> ApiResult<(StatusCode, Json<Appointment>)> {
    Ok(created(
        state
            .services
            .appointments
            .create(caller.user_id, req)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/appointments/{id}",
    tag = "appointments",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "The appointment", body = Appointment),
        (status = 404, description = "Appointment not found", body = ErrorBody)
    )
)]
pub async fn get_appointment(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Appointment>> {
    Ok(Json(
        state.services.appointments.get(caller.user_id, id).await?,
    ))
}

#[utoipa::path(
    put,
    path = "/api/appointments/{id}",
    tag = "appointments",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Appointment id")),
    request_body = UpdateAppointmentRequest,
    responses(
        (status = 200, description = "Updated appointment", body = Appointment),
        (status = 400, description = "Invalid appointment data", body = ErrorBody),
        (status = 404, description = "Appointment not found", body = ErrorBody)
    )
)]
pub async fn update_appointment(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateAppointmentRequest>,
) -> ApiResult<Json<Appointment>> {
    Ok(Json(
        state
            .services
            .appointments
            .update(caller.user_id, id, req)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/appointments/{id}",
    tag = "appointments",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment deleted", body = MessageResponse),
        (status = 404, description = "Appointment not found", body = ErrorBody)
    )
)]
pub async fn delete_appointment(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .services
        .appointments
        .delete(caller.user_id, id)
        .await?;
    Ok(deleted("Appointment"))
}
