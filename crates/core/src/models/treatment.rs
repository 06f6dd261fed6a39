use chrono::{DateTime, NaiveDate, Utc};
use dental_types::{Patch, Priority, TreatmentStatus};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ============================================================================
// CATALOG
// ============================================================================

/// A procedure the practice offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub cost: f64,
    /// Minutes.
    pub duration: i32,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTreatmentRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub cost: f64,
    pub duration: i32,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTreatment {
    pub name: String,
    pub description: String,
    pub cost: f64,
    pub duration: i32,
    pub category: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTreatmentRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub cost: Patch<f64>,
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub duration: Patch<i32>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub category: Patch<String>,
}

// ============================================================================
// PATIENT ASSIGNMENTS
// ============================================================================

/// A treatment assigned to a patient. Name fields are joined in at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientTreatment {
    pub id: i64,
    pub patient_id: i64,
    pub treatment_id: i64,
    pub dentist_id: Option<i64>,
    pub patient_name: String,
    pub treatment_name: String,
    pub dentist_name: Option<String>,
    pub status: TreatmentStatus,
    pub priority: Priority,
    pub start_date: NaiveDate,
    pub completion_date: Option<NaiveDate>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientTreatmentRequest {
    pub patient_id: i64,
    pub treatment_id: i64,
    /// Missing means the caller; `null` leaves the assignment unowned.
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub dentist_id: Patch<i64>,
    #[serde(default)]
    pub status: Option<TreatmentStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub completion_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPatientTreatment {
    pub patient_id: i64,
    pub treatment_id: i64,
    pub dentist_id: Option<i64>,
    pub status: TreatmentStatus,
    pub priority: Priority,
    pub start_date: NaiveDate,
    pub completion_date: Option<NaiveDate>,
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientTreatmentRequest {
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub patient_id: Patch<i64>,
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub treatment_id: Patch<i64>,
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub dentist_id: Patch<i64>,
    #[serde(default)]
    #[schema(value_type = Option<TreatmentStatus>)]
    pub status: Patch<TreatmentStatus>,
    #[serde(default)]
    #[schema(value_type = Option<Priority>)]
    pub priority: Patch<Priority>,
    #[serde(default)]
    #[schema(value_type = Option<NaiveDate>)]
    pub start_date: Patch<NaiveDate>,
    #[serde(default)]
    #[schema(value_type = Option<NaiveDate>)]
    pub completion_date: Patch<NaiveDate>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub notes: Patch<String>,
}

/// Query parameters for `GET /api/patient-treatments`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PatientTreatmentFilter {
    pub patient_id: Option<i64>,
    pub status: Option<TreatmentStatus>,
}

/// Query parameters for `GET /api/treatments/queue`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct QueueFilter {
    pub dentist_id: Option<i64>,
}
