use super::{
    amount, amount_patch, found, non_null, optional_text, removed, required_text,
    required_text_patch, text_patch,
};
use crate::models::{
    CreatePatientTreatmentRequest, CreateTreatmentRequest, NewPatientTreatment, NewTreatment,
    PatientTreatment, PatientTreatmentFilter, QueueFilter, Treatment,
    UpdatePatientTreatmentRequest, UpdateTreatmentRequest,
};
use crate::repositories::{Datastore, PatientTreatmentStore, TreatmentStore};
use crate::{DentalError, DentalResult};
use dental_types::Patch;
use std::sync::Arc;

/// The treatment catalog and the treatments assigned to patients.
#[derive(Clone)]
pub struct TreatmentService {
    treatments: Arc<dyn TreatmentStore>,
    patient_treatments: Arc<dyn PatientTreatmentStore>,
}

impl TreatmentService {
    pub fn new(store: &Datastore) -> Self {
        Self {
            treatments: store.treatments.clone(),
            patient_treatments: store.patient_treatments.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    pub async fn list(&self) -> DentalResult<Vec<Treatment>> {
        self.treatments.list().await
    }

    pub async fn get(&self, id: i64) -> DentalResult<Treatment> {
        found("Treatment", self.treatments.get(id).await?)
    }

    pub async fn create(&self, req: CreateTreatmentRequest) -> DentalResult<Treatment> {
        let new = NewTreatment {
            name: required_text("name", &req.name)?,
            description: optional_text(req.description),
            cost: amount("cost", req.cost)?,
            duration: duration(req.duration)?,
            category: optional_text(req.category),
        };
        self.treatments.create(&new).await
    }

    pub async fn update(&self, id: i64, req: UpdateTreatmentRequest) -> DentalResult<Treatment> {
        non_null("duration", &req.duration)?;
        let patch = UpdateTreatmentRequest {
            name: required_text_patch("name", &req.name)?,
            description: text_patch(&req.description),
            cost: amount_patch("cost", &req.cost)?,
            duration: req.duration.try_map(duration)?,
            category: text_patch(&req.category),
        };
        found("Treatment", self.treatments.update(id, &patch).await?)
    }

    /// Fails with a conflict while assignments or claims still reference the treatment.
    pub async fn delete(&self, id: i64) -> DentalResult<()> {
        removed("Treatment", self.treatments.delete(id).await?)
    }

    // ------------------------------------------------------------------
    // Assignments
    // ------------------------------------------------------------------

    pub async fn list_assignments(
        &self,
        filter: &PatientTreatmentFilter,
    ) -> DentalResult<Vec<PatientTreatment>> {
        self.patient_treatments.list(filter).await
    }

    /// Pending and in-progress work, most urgent first.
    pub async fn queue(&self, filter: &QueueFilter) -> DentalResult<Vec<PatientTreatment>> {
        self.patient_treatments.queue(filter).await
    }

    pub async fn get_assignment(&self, id: i64) -> DentalResult<PatientTreatment> {
        found("Patient treatment", self.patient_treatments.get(id).await?)
    }

    /// A missing `dentistId` assigns the caller; an explicit `null` leaves it unassigned.
    pub async fn assign(
        &self,
        caller_id: i64,
        req: CreatePatientTreatmentRequest,
    ) -> DentalResult<PatientTreatment> {
        let dentist_id = match req.dentist_id {
            Patch::Absent => Some(caller_id),
            Patch::Null => None,
            Patch::Value(id) => Some(id),
        };
        let new = NewPatientTreatment {
            patient_id: req.patient_id,
            treatment_id: req.treatment_id,
            dentist_id,
            status: req.status.unwrap_or_default(),
            priority: req.priority.unwrap_or_default(),
            start_date: req.start_date,
            completion_date: req.completion_date,
            notes: optional_text(req.notes),
        };
        let assignment = self.patient_treatments.create(&new).await?;
        tracing::info!(
            assignment_id = assignment.id,
            patient_id = assignment.patient_id,
            "assigned treatment"
        );
        Ok(assignment)
    }

    pub async fn update_assignment(
        &self,
        id: i64,
        req: UpdatePatientTreatmentRequest,
    ) -> DentalResult<PatientTreatment> {
        non_null("patientId", &req.patient_id)?;
        non_null("treatmentId", &req.treatment_id)?;
        non_null("status", &req.status)?;
        non_null("priority", &req.priority)?;
        non_null("startDate", &req.start_date)?;
        let patch = UpdatePatientTreatmentRequest {
            notes: text_patch(&req.notes),
            ..req
        };
        found(
            "Patient treatment",
            self.patient_treatments.update(id, &patch).await?,
        )
    }

    pub async fn remove_assignment(&self, id: i64) -> DentalResult<()> {
        removed("Patient treatment", self.patient_treatments.delete(id).await?)
    }
}

impl std::fmt::Debug for TreatmentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreatmentService").finish_non_exhaustive()
    }
}

fn duration(minutes: i32) -> DentalResult<i32> {
    if minutes < 1 {
        return Err(DentalError::validation("duration must be at least 1 minute"));
    }
    Ok(minutes)
}
