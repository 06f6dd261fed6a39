use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// The caller's appointments today.
    pub today_appointments: i64,
    pub active_patients: i64,
    /// Assignments still in the treatment queue.
    pub pending_treatments: i64,
    pub monthly_revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientStats {
    pub total_patients: i64,
    pub low_risk_patients: i64,
    pub medium_risk_patients: i64,
    pub high_risk_patients: i64,
}
