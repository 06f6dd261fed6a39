//! OpenAPI document served next to the Swagger UI.

use crate::handlers::{
    analysis, appointments, auth, billing, dashboard, health, patient_treatments, patients,
    treatments,
};
use api_shared::{ErrorBody, HealthResponse};
use dental_core::analysis::{ToothAnalysis, ToothFinding};
use dental_core::models::{
    Appointment, AuthSession, BillingStats, ChangePasswordRequest, CreateAppointmentRequest,
    CreateClaimRequest, CreateInvoiceRequest, CreatePatientRequest,
    CreatePatientTreatmentRequest, CreateTreatmentRequest, DashboardStats, FederatedIdentity,
    FederatedLoginRequest, FederatedRegisterRequest, InsuranceClaim, Invoice, LoginRequest,
    MessageResponse, Patient, PatientStats, PatientTreatment, RegisterRequest, Treatment,
    UpdateAppointmentRequest, UpdateClaimRequest, UpdateInvoiceRequest, UpdatePatientRequest,
    UpdatePatientTreatmentRequest, UpdateProfileRequest, UpdateTreatmentRequest, User,
};
use dental_types::{
    AppointmentStatus, ClaimStatus, InvoiceStatus, Priority, RiskLevel, Role, TreatmentStatus,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(title = "Dental Practice API"),
    paths(
        health::health,
        auth::register,
        auth::login,
        auth::google_login,
        auth::google_register,
        auth::current_user,
        auth::update_profile,
        auth::change_password,
        dashboard::dashboard_stats,
        patients::list_patients,
        patients::patient_stats,
        patients::create_patient,
        patients::get_patient,
        patients::update_patient,
        patients::delete_patient,
        patients::patient_treatments,
        appointments::list_appointments,
        appointments::today_appointments,
        appointments::create_appointment,
        appointments::get_appointment,
        appointments::update_appointment,
        appointments::delete_appointment,
        treatments::list_treatments,
        treatments::treatment_queue,
        treatments::get_treatment,
        treatments::create_treatment,
        treatments::update_treatment,
        treatments::delete_treatment,
        patient_treatments::list_assignments,
        patient_treatments::create_assignment,
        patient_treatments::get_assignment,
        patient_treatments::update_assignment,
        patient_treatments::delete_assignment,
        billing::billing_stats,
        billing::list_invoices,
        billing::create_invoice,
        billing::get_invoice,
        billing::update_invoice,
        billing::delete_invoice,
        billing::list_claims,
        billing::create_claim,
        billing::get_claim,
        billing::update_claim,
        billing::delete_claim,
        analysis::analyze_tooth,
    ),
    components(schemas(
        HealthResponse,
        ErrorBody,
        MessageResponse,
        Role,
        RiskLevel,
        AppointmentStatus,
        TreatmentStatus,
        Priority,
        InvoiceStatus,
        ClaimStatus,
        User,
        AuthSession,
        RegisterRequest,
        LoginRequest,
        FederatedIdentity,
        FederatedLoginRequest,
        FederatedRegisterRequest,
        UpdateProfileRequest,
        ChangePasswordRequest,
        DashboardStats,
        Patient,
        PatientStats,
        CreatePatientRequest,
        UpdatePatientRequest,
        Appointment,
        CreateAppointmentRequest,
        UpdateAppointmentRequest,
        Treatment,
        CreateTreatmentRequest,
        UpdateTreatmentRequest,
        PatientTreatment,
        CreatePatientTreatmentRequest,
        UpdatePatientTreatmentRequest,
        Invoice,
        CreateInvoiceRequest,
        UpdateInvoiceRequest,
        InsuranceClaim,
        CreateClaimRequest,
        UpdateClaimRequest,
        BillingStats,
        ToothAnalysis,
        ToothFinding,
        analysis::ToothAnalysisForm,
    )),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme referenced by protected operations.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_protected_routes_with_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/patients/{id}"));
        assert!(doc.paths.paths.contains_key("/api/treatments/queue"));
        let components = doc.components.expect("components should be present");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
