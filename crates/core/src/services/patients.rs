use super::{
    email, email_patch, found, non_null, optional_text, removed, required_text,
    required_text_patch, text_patch,
};
use crate::models::{
    CreatePatientRequest, NewPatient, Patient, PatientFilter, PatientStats, PatientTreatment,
    PatientTreatmentFilter, UpdatePatientRequest,
};
use crate::repositories::{Datastore, PatientStore, PatientTreatmentStore};
use crate::DentalResult;
use std::sync::Arc;

#[derive(Clone)]
pub struct PatientService {
    patients: Arc<dyn PatientStore>,
    patient_treatments: Arc<dyn PatientTreatmentStore>,
}

impl PatientService {
    pub fn new(store: &Datastore) -> Self {
        Self {
            patients: store.patients.clone(),
            patient_treatments: store.patient_treatments.clone(),
        }
    }

    pub async fn list(&self, filter: &PatientFilter) -> DentalResult<Vec<Patient>> {
        self.patients.list(filter).await
    }

    pub async fn get(&self, id: i64) -> DentalResult<Patient> {
        found("Patient", self.patients.get(id).await?)
    }

    pub async fn create(&self, req: CreatePatientRequest) -> DentalResult<Patient> {
        let new = NewPatient {
            first_name: required_text("firstName", &req.first_name)?,
            last_name: required_text("lastName", &req.last_name)?,
            date_of_birth: req.date_of_birth,
            phone: required_text("phone", &req.phone)?,
            email: email("email", &req.email)?,
            address: optional_text(req.address),
            emergency_contact: optional_text(req.emergency_contact),
            insurance_provider: optional_text(req.insurance_provider),
            insurance_policy_number: optional_text(req.insurance_policy_number),
            medical_history: optional_text(req.medical_history),
            risk_level: req.risk_level.unwrap_or_default(),
        };
        let patient = self.patients.create(&new).await?;
        tracing::info!(patient_id = patient.id, "created patient");
        Ok(patient)
    }

    pub async fn update(&self, id: i64, req: UpdatePatientRequest) -> DentalResult<Patient> {
        non_null("dateOfBirth", &req.date_of_birth)?;
        non_null("riskLevel", &req.risk_level)?;
        let patch = UpdatePatientRequest {
            first_name: required_text_patch("firstName", &req.first_name)?,
            last_name: required_text_patch("lastName", &req.last_name)?,
            date_of_birth: req.date_of_birth,
            phone: required_text_patch("phone", &req.phone)?,
            email: email_patch("email", &req.email)?,
            address: text_patch(&req.address),
            emergency_contact: text_patch(&req.emergency_contact),
            insurance_provider: text_patch(&req.insurance_provider),
            insurance_policy_number: text_patch(&req.insurance_policy_number),
            medical_history: text_patch(&req.medical_history),
            risk_level: req.risk_level,
        };
        found("Patient", self.patients.update(id, &patch).await?)
    }

    /// Fails with a conflict while other records still reference the patient.
    pub async fn delete(&self, id: i64) -> DentalResult<()> {
        removed("Patient", self.patients.delete(id).await?)?;
        tracing::info!(patient_id = id, "deleted patient");
        Ok(())
    }

    pub async fn stats(&self) -> DentalResult<PatientStats> {
        self.patients.stats().await
    }

    /// Treatment assignments of one patient, newest first.
    pub async fn treatments(&self, id: i64) -> DentalResult<Vec<PatientTreatment>> {
        self.get(id).await?;
        self.patient_treatments
            .list(&PatientTreatmentFilter {
                patient_id: Some(id),
                status: None,
            })
            .await
    }
}

impl std::fmt::Debug for PatientService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatientService").finish_non_exhaustive()
    }
}
