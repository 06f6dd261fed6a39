use chrono::{DateTime, NaiveDate, Utc};
use dental_types::{ClaimStatus, InvoiceStatus, Patch};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ============================================================================
// INVOICES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub amount: f64,
    pub status: InvoiceStatus,
    pub due_date: NaiveDate,
    pub issued_date: NaiveDate,
    pub payment_method: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub patient_id: i64,
    pub amount: f64,
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
    pub due_date: NaiveDate,
    /// Defaults to today.
    #[serde(default)]
    pub issued_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub patient_id: i64,
    pub amount: f64,
    pub status: InvoiceStatus,
    pub due_date: NaiveDate,
    pub issued_date: NaiveDate,
    pub payment_method: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceRequest {
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub patient_id: Patch<i64>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub amount: Patch<f64>,
    #[serde(default)]
    #[schema(value_type = Option<InvoiceStatus>)]
    pub status: Patch<InvoiceStatus>,
    #[serde(default)]
    #[schema(value_type = Option<NaiveDate>)]
    pub due_date: Patch<NaiveDate>,
    #[serde(default)]
    #[schema(value_type = Option<NaiveDate>)]
    pub issued_date: Patch<NaiveDate>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub payment_method: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub notes: Patch<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub patient_id: Option<i64>,
}

// ============================================================================
// INSURANCE CLAIMS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceClaim {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub treatment_id: Option<i64>,
    pub treatment_name: Option<String>,
    pub claim_amount: f64,
    pub status: ClaimStatus,
    pub submission_date: NaiveDate,
    pub approval_date: Option<NaiveDate>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClaimRequest {
    pub patient_id: i64,
    #[serde(default)]
    pub treatment_id: Option<i64>,
    pub claim_amount: f64,
    #[serde(default)]
    pub status: Option<ClaimStatus>,
    /// Defaults to today.
    #[serde(default)]
    pub submission_date: Option<NaiveDate>,
    #[serde(default)]
    pub approval_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewClaim {
    pub patient_id: i64,
    pub treatment_id: Option<i64>,
    pub claim_amount: f64,
    pub status: ClaimStatus,
    pub submission_date: NaiveDate,
    pub approval_date: Option<NaiveDate>,
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClaimRequest {
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub patient_id: Patch<i64>,
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub treatment_id: Patch<i64>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub claim_amount: Patch<f64>,
    #[serde(default)]
    #[schema(value_type = Option<ClaimStatus>)]
    pub status: Patch<ClaimStatus>,
    #[serde(default)]
    #[schema(value_type = Option<NaiveDate>)]
    pub submission_date: Patch<NaiveDate>,
    #[serde(default)]
    #[schema(value_type = Option<NaiveDate>)]
    pub approval_date: Patch<NaiveDate>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub notes: Patch<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ClaimFilter {
    pub status: Option<ClaimStatus>,
    pub patient_id: Option<i64>,
}

/// Money totals shown on the billing page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillingStats {
    /// Paid invoices issued in the current calendar month.
    pub monthly_revenue: f64,
    pub pending_payments: f64,
    /// Submitted (undecided) claim amounts.
    pub insurance_claims: f64,
    /// All paid invoices.
    pub collections: f64,
}
