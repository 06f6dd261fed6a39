use super::{apply, still_referenced, touch, MemoryStore, Tables};
use crate::models::{
    NewPatientTreatment, NewTreatment, PatientTreatment, PatientTreatmentFilter, QueueFilter,
    Treatment, UpdatePatientTreatmentRequest, UpdateTreatmentRequest,
};
use crate::repositories::{PatientTreatmentStore, TreatmentStore};
use crate::DentalResult;
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
impl TreatmentStore for MemoryStore {
    async fn list(&self) -> DentalResult<Vec<Treatment>> {
        let tables = self.tables.read().await;
        let mut treatments: Vec<Treatment> = tables.treatments.values().cloned().collect();
        treatments.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(treatments)
    }

    async fn get(&self, id: i64) -> DentalResult<Option<Treatment>> {
        Ok(self.tables.read().await.treatments.get(id).cloned())
    }

    async fn create(&self, new: &NewTreatment) -> DentalResult<Treatment> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        Ok(tables.treatments.insert_with(|id| Treatment {
            id,
            name: new.name.clone(),
            description: new.description.clone(),
            cost: new.cost,
            duration: new.duration,
            category: new.category.clone(),
            created_at: now,
            updated_at: now,
        }))
    }

    async fn update(
        &self,
        id: i64,
        patch: &UpdateTreatmentRequest,
    ) -> DentalResult<Option<Treatment>> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.treatments.get_mut(id) else {
            return Ok(None);
        };

        let mut treatment = stored.clone();
        apply("name", &patch.name, &mut treatment.name)?;
        apply("description", &patch.description, &mut treatment.description)?;
        apply("cost", &patch.cost, &mut treatment.cost)?;
        apply("duration", &patch.duration, &mut treatment.duration)?;
        apply("category", &patch.category, &mut treatment.category)?;
        treatment.updated_at = touch(treatment.updated_at);

        *stored = treatment.clone();
        Ok(Some(treatment))
    }

    async fn delete(&self, id: i64) -> DentalResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.treatments.contains(id) {
            return Ok(false);
        }
        let referenced = tables
            .patient_treatments
            .values()
            .any(|pt| pt.treatment_id == id)
            || tables
                .claims
                .values()
                .any(|c| c.treatment_id == Some(id));
        if referenced {
            return Err(still_referenced());
        }
        Ok(tables.treatments.remove(id))
    }
}

fn hydrate(tables: &Tables, assignment: &PatientTreatment) -> PatientTreatment {
    PatientTreatment {
        patient_name: tables.patient_name(assignment.patient_id),
        treatment_name: tables
            .treatment_name(assignment.treatment_id)
            .unwrap_or_default(),
        dentist_name: assignment.dentist_id.and_then(|id| tables.user_name(id)),
        ..assignment.clone()
    }
}

#[async_trait]
impl PatientTreatmentStore for MemoryStore {
    async fn list(&self, filter: &PatientTreatmentFilter) -> DentalResult<Vec<PatientTreatment>> {
        let tables = self.tables.read().await;
        let mut assignments: Vec<PatientTreatment> = tables
            .patient_treatments
            .values()
            .filter(|pt| filter.patient_id.map_or(true, |p| pt.patient_id == p))
            .filter(|pt| filter.status.map_or(true, |s| pt.status == s))
            .map(|pt| hydrate(&tables, pt))
            .collect();
        assignments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(assignments)
    }

    async fn queue(&self, filter: &QueueFilter) -> DentalResult<Vec<PatientTreatment>> {
        let tables = self.tables.read().await;
        let mut queue: Vec<PatientTreatment> = tables
            .patient_treatments
            .values()
            .filter(|pt| pt.status.is_queued())
            .filter(|pt| filter.dentist_id.map_or(true, |d| pt.dentist_id == Some(d)))
            .map(|pt| hydrate(&tables, pt))
            .collect();
        queue.sort_by(|a, b| {
            a.priority
                .rank()
                .cmp(&b.priority.rank())
                .then(a.start_date.cmp(&b.start_date))
                .then(a.id.cmp(&b.id))
        });
        Ok(queue)
    }

    async fn queued_count(&self) -> DentalResult<i64> {
        let tables = self.tables.read().await;
        let count = tables
            .patient_treatments
            .values()
            .filter(|pt| pt.status.is_queued())
            .count();
        Ok(count as i64)
    }

    async fn get(&self, id: i64) -> DentalResult<Option<PatientTreatment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .patient_treatments
            .get(id)
            .map(|pt| hydrate(&tables, pt)))
    }

    async fn create(&self, new: &NewPatientTreatment) -> DentalResult<PatientTreatment> {
        let mut tables = self.tables.write().await;
        tables.require_patient(new.patient_id)?;
        tables.require_treatment(new.treatment_id)?;
        if let Some(dentist_id) = new.dentist_id {
            tables.require_user(dentist_id)?;
        }

        let now = Utc::now();
        let stored = tables.patient_treatments.insert_with(|id| PatientTreatment {
            id,
            patient_id: new.patient_id,
            treatment_id: new.treatment_id,
            dentist_id: new.dentist_id,
            patient_name: String::new(),
            treatment_name: String::new(),
            dentist_name: None,
            status: new.status,
            priority: new.priority,
            start_date: new.start_date,
            completion_date: new.completion_date,
            notes: new.notes.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(hydrate(&tables, &stored))
    }

    async fn update(
        &self,
        id: i64,
        patch: &UpdatePatientTreatmentRequest,
    ) -> DentalResult<Option<PatientTreatment>> {
        let mut tables = self.tables.write().await;
        let Some(current) = tables.patient_treatments.get(id).cloned() else {
            return Ok(None);
        };
        if let Some(patient_id) = patch.patient_id.value() {
            tables.require_patient(*patient_id)?;
        }
        if let Some(treatment_id) = patch.treatment_id.value() {
            tables.require_treatment(*treatment_id)?;
        }
        if let Some(dentist_id) = patch.dentist_id.value() {
            tables.require_user(*dentist_id)?;
        }

        let mut assignment = current;
        apply("patientId", &patch.patient_id, &mut assignment.patient_id)?;
        apply("treatmentId", &patch.treatment_id, &mut assignment.treatment_id)?;
        patch.dentist_id.clone().apply_to_option(&mut assignment.dentist_id);
        apply("status", &patch.status, &mut assignment.status)?;
        apply("priority", &patch.priority, &mut assignment.priority)?;
        apply("startDate", &patch.start_date, &mut assignment.start_date)?;
        patch
            .completion_date
            .clone()
            .apply_to_option(&mut assignment.completion_date);
        apply("notes", &patch.notes, &mut assignment.notes)?;
        assignment.updated_at = touch(assignment.updated_at);

        if let Some(stored) = tables.patient_treatments.get_mut(id) {
            *stored = assignment.clone();
        }
        Ok(Some(hydrate(&tables, &assignment)))
    }

    async fn delete(&self, id: i64) -> DentalResult<bool> {
        Ok(self.tables.write().await.patient_treatments.remove(id))
    }
}
