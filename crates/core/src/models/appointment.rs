use super::TimeOfDay;
use chrono::{DateTime, NaiveDate, Utc};
use dental_types::{AppointmentStatus, Patch};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// A booked slot. `patient_name` and `dentist_name` are joined in at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub dentist_id: i64,
    pub patient_name: String,
    pub dentist_name: String,
    pub appointment_date: NaiveDate,
    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: TimeOfDay,
    #[schema(value_type = String, example = "09:30:00")]
    pub end_time: TimeOfDay,
    pub status: AppointmentStatus,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The dentist is always the caller; the body cannot book on someone else's behalf.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub patient_id: i64,
    pub appointment_date: NaiveDate,
    #[schema(value_type = String, example = "09:00")]
    pub start_time: TimeOfDay,
    #[schema(value_type = String, example = "09:30")]
    pub end_time: TimeOfDay,
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub patient_id: i64,
    pub dentist_id: i64,
    pub appointment_date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub status: AppointmentStatus,
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub patient_id: Patch<i64>,
    #[serde(default)]
    #[schema(value_type = Option<NaiveDate>)]
    pub appointment_date: Patch<NaiveDate>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub start_time: Patch<TimeOfDay>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub end_time: Patch<TimeOfDay>,
    #[serde(default)]
    #[schema(value_type = Option<AppointmentStatus>)]
    pub status: Patch<AppointmentStatus>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub notes: Patch<String>,
}

/// Query parameters for `GET /api/appointments`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AppointmentFilter {
    pub date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
    pub patient_id: Option<i64>,
}

impl AppointmentFilter {
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }
}
