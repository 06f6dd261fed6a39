use chrono::{DateTime, NaiveDate, Utc};
use dental_types::{Patch, RiskLevel};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub emergency_contact: String,
    pub insurance_provider: String,
    pub insurance_policy_number: String,
    pub medical_history: String,
    pub risk_level: RiskLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub insurance_provider: Option<String>,
    #[serde(default)]
    pub insurance_policy_number: Option<String>,
    #[serde(default)]
    pub medical_history: Option<String>,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
}

/// A validated patient ready to be inserted; optional text defaults to empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub emergency_contact: String,
    pub insurance_provider: String,
    pub insurance_policy_number: String,
    pub medical_history: String,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub first_name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub last_name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<NaiveDate>)]
    pub date_of_birth: Patch<NaiveDate>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub phone: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub email: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub address: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub emergency_contact: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub insurance_provider: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub insurance_policy_number: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub medical_history: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<RiskLevel>)]
    pub risk_level: Patch<RiskLevel>,
}

/// Query parameters for `GET /api/patients`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PatientFilter {
    /// Case-insensitive substring of first name, last name, email or phone.
    pub search: Option<String>,
    pub risk_level: Option<RiskLevel>,
}

impl PatientFilter {
    /// The search term, or `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
