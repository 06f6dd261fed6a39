use super::{apply, contains_ignore_case, still_referenced, touch, MemoryStore};
use crate::models::{NewPatient, Patient, PatientFilter, PatientStats, UpdatePatientRequest};
use crate::repositories::PatientStore;
use crate::DentalResult;
use async_trait::async_trait;
use chrono::Utc;
use dental_types::RiskLevel;

fn matches(patient: &Patient, filter: &PatientFilter) -> bool {
    if let Some(risk) = filter.risk_level {
        if patient.risk_level != risk {
            return false;
        }
    }
    match filter.search_term() {
        None => true,
        Some(term) => {
            let needle = term.to_lowercase();
            [
                &patient.first_name,
                &patient.last_name,
                &patient.email,
                &patient.phone,
            ]
            .iter()
            .any(|field| contains_ignore_case(field, &needle))
        }
    }
}

#[async_trait]
impl PatientStore for MemoryStore {
    async fn list(&self, filter: &PatientFilter) -> DentalResult<Vec<Patient>> {
        let tables = self.tables.read().await;
        let mut patients: Vec<Patient> = tables
            .patients
            .values()
            .filter(|p| matches(p, filter))
            .cloned()
            .collect();
        patients.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(patients)
    }

    async fn get(&self, id: i64) -> DentalResult<Option<Patient>> {
        Ok(self.tables.read().await.patients.get(id).cloned())
    }

    async fn create(&self, new: &NewPatient) -> DentalResult<Patient> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        Ok(tables.patients.insert_with(|id| Patient {
            id,
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            date_of_birth: new.date_of_birth,
            phone: new.phone.clone(),
            email: new.email.clone(),
            address: new.address.clone(),
            emergency_contact: new.emergency_contact.clone(),
            insurance_provider: new.insurance_provider.clone(),
            insurance_policy_number: new.insurance_policy_number.clone(),
            medical_history: new.medical_history.clone(),
            risk_level: new.risk_level,
            created_at: now,
            updated_at: now,
        }))
    }

    async fn update(
        &self,
        id: i64,
        patch: &UpdatePatientRequest,
    ) -> DentalResult<Option<Patient>> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.patients.get_mut(id) else {
            return Ok(None);
        };

        let mut patient = stored.clone();
        apply("firstName", &patch.first_name, &mut patient.first_name)?;
        apply("lastName", &patch.last_name, &mut patient.last_name)?;
        apply("dateOfBirth", &patch.date_of_birth, &mut patient.date_of_birth)?;
        apply("phone", &patch.phone, &mut patient.phone)?;
        apply("email", &patch.email, &mut patient.email)?;
        apply("address", &patch.address, &mut patient.address)?;
        apply("emergencyContact", &patch.emergency_contact, &mut patient.emergency_contact)?;
        apply("insuranceProvider", &patch.insurance_provider, &mut patient.insurance_provider)?;
        apply(
            "insurancePolicyNumber",
            &patch.insurance_policy_number,
            &mut patient.insurance_policy_number,
        )?;
        apply("medicalHistory", &patch.medical_history, &mut patient.medical_history)?;
        apply("riskLevel", &patch.risk_level, &mut patient.risk_level)?;
        patient.updated_at = touch(patient.updated_at);

        *stored = patient.clone();
        Ok(Some(patient))
    }

    async fn delete(&self, id: i64) -> DentalResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.patients.contains(id) {
            return Ok(false);
        }
        let referenced = tables.appointments.values().any(|a| a.patient_id == id)
            || tables.patient_treatments.values().any(|pt| pt.patient_id == id)
            || tables.invoices.values().any(|i| i.patient_id == id)
            || tables.claims.values().any(|c| c.patient_id == id);
        if referenced {
            return Err(still_referenced());
        }
        Ok(tables.patients.remove(id))
    }

    async fn stats(&self) -> DentalResult<PatientStats> {
        let tables = self.tables.read().await;
        let count = |risk: RiskLevel| {
            tables
                .patients
                .values()
                .filter(|p| p.risk_level == risk)
                .count() as i64
        };
        Ok(PatientStats {
            total_patients: tables.patients.values().count() as i64,
            low_risk_patients: count(RiskLevel::Low),
            medium_risk_patients: count(RiskLevel::Medium),
            high_risk_patients: count(RiskLevel::High),
        })
    }
}
