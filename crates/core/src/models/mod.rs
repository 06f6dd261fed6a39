//! Domain records, request payloads and list filters.
//!
//! Records serialise to camelCase JSON. Request payloads for partial updates wrap every field
//! in [`Patch`](dental_types::Patch) so that a missing key, an explicit `null` and a zero value
//! stay distinguishable all the way down to the store.

pub mod appointment;
pub mod billing;
pub mod patient;
pub mod stats;
pub mod time;
pub mod treatment;
pub mod user;

pub use appointment::{
    Appointment, AppointmentFilter, CreateAppointmentRequest, NewAppointment,
    UpdateAppointmentRequest,
};
pub use billing::{
    BillingStats, ClaimFilter, CreateClaimRequest, CreateInvoiceRequest, InsuranceClaim,
    Invoice, InvoiceFilter, NewClaim, NewInvoice, UpdateClaimRequest, UpdateInvoiceRequest,
};
pub use patient::{
    CreatePatientRequest, NewPatient, Patient, PatientFilter, UpdatePatientRequest,
};
pub use stats::{DashboardStats, PatientStats};
pub use time::TimeOfDay;
pub use treatment::{
    CreatePatientTreatmentRequest, CreateTreatmentRequest, NewPatientTreatment, NewTreatment,
    PatientTreatment, PatientTreatmentFilter, QueueFilter, Treatment,
    UpdatePatientTreatmentRequest, UpdateTreatmentRequest,
};
pub use user::{
    AuthSession, ChangePasswordRequest, FederatedIdentity, FederatedLoginRequest,
    FederatedRegisterRequest, LoginRequest, NewUser, RegisterRequest, UpdateProfileRequest, User,
    UserRecord,
};

/// Generic acknowledgement body, e.g. for deletions.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
