use crate::clock;
use crate::models::DashboardStats;
use crate::repositories::{
    AppointmentStore, Datastore, InvoiceStore, PatientStore, PatientTreatmentStore,
};
use crate::DentalResult;
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardService {
    appointments: Arc<dyn AppointmentStore>,
    patients: Arc<dyn PatientStore>,
    patient_treatments: Arc<dyn PatientTreatmentStore>,
    invoices: Arc<dyn InvoiceStore>,
}

impl DashboardService {
    pub fn new(store: &Datastore) -> Self {
        Self {
            appointments: store.appointments.clone(),
            patients: store.patients.clone(),
            patient_treatments: store.patient_treatments.clone(),
            invoices: store.invoices.clone(),
        }
    }

    /// Headline numbers for the caller's dashboard.
    pub async fn stats(&self, dentist_id: i64) -> DentalResult<DashboardStats> {
        let today = clock::today();
        let (from, until) = clock::month_bounds(today);

        let today_appointments = self.appointments.count_on(dentist_id, today).await?;
        let patients = self.patients.stats().await?;
        let pending_treatments = self.patient_treatments.queued_count().await?;
        let totals = self.invoices.totals(from, until).await?;

        Ok(DashboardStats {
            today_appointments,
            active_patients: patients.total_patients,
            pending_treatments,
            monthly_revenue: totals.revenue,
        })
    }
}

impl std::fmt::Debug for DashboardService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CreateAppointmentRequest, CreatePatientRequest, CreatePatientTreatmentRequest,
        CreateTreatmentRequest, NewUser, TimeOfDay,
    };
    use crate::repositories::UserStore;
    use crate::services::{AppointmentService, PatientService, TreatmentService};
    use chrono::{Duration, NaiveDate};
    use dental_types::{EmailAddress, NonEmptyText, Patch, Priority, Role, TreatmentStatus};

    async fn dentist(store: &Datastore, email: &str) -> i64 {
        store
            .users
            .create(&NewUser {
                email: EmailAddress::parse(email).expect("valid email"),
                password_hash: None,
                google_id: None,
                first_name: NonEmptyText::new("Dee").expect("valid name"),
                last_name: NonEmptyText::new("Ntist").expect("valid name"),
                role: Role::Dentist,
                phone: String::new(),
            })
            .await
            .expect("dentist should be created")
            .id
    }

    fn visit(patient_id: i64, date: NaiveDate) -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            patient_id,
            appointment_date: date,
            start_time: TimeOfDay::hm(9, 0).expect("valid time"),
            end_time: TimeOfDay::hm(9, 30).expect("valid time"),
            status: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_stats_count_callers_day_and_open_queue() {
        let store = Datastore::in_memory();
        let me = dentist(&store, "me@example.com").await;
        let colleague = dentist(&store, "them@example.com").await;
        let patient_id = PatientService::new(&store)
            .create(CreatePatientRequest {
                first_name: "Pat".into(),
                last_name: "Ient".into(),
                date_of_birth: NaiveDate::from_ymd_opt(1980, 1, 1).expect("valid date"),
                phone: "555-0100".into(),
                email: "pat@example.com".into(),
                address: None,
                emergency_contact: None,
                insurance_provider: None,
                insurance_policy_number: None,
                medical_history: None,
                risk_level: None,
            })
            .await
            .expect("patient should be created")
            .id;

        let today = clock::today();
        let appointments = AppointmentService::new(&store);
        for (owner, date) in [
            (me, today),
            (me, today),
            (me, today + Duration::days(1)),
            (colleague, today),
        ] {
            appointments
                .create(owner, visit(patient_id, date))
                .await
                .expect("appointment should be created");
        }

        let treatments = TreatmentService::new(&store);
        let treatment_id = treatments
            .create(CreateTreatmentRequest {
                name: "Filling".into(),
                description: None,
                cost: 90.0,
                duration: 30,
                category: None,
            })
            .await
            .expect("treatment should be created")
            .id;
        for status in [
            TreatmentStatus::Pending,
            TreatmentStatus::InProgress,
            TreatmentStatus::Completed,
        ] {
            treatments
                .assign(
                    me,
                    CreatePatientTreatmentRequest {
                        patient_id,
                        treatment_id,
                        dentist_id: Patch::Absent,
                        status: Some(status),
                        priority: Some(Priority::Normal),
                        start_date: today,
                        completion_date: None,
                        notes: None,
                    },
                )
                .await
                .expect("assignment should be created");
        }

        let stats = DashboardService::new(&store)
            .stats(me)
            .await
            .expect("stats should succeed");
        assert_eq!(stats.today_appointments, 2);
        assert_eq!(stats.active_patients, 1);
        assert_eq!(stats.pending_treatments, 2);
    }

    #[tokio::test]
    async fn test_empty_practice_has_zero_stats() {
        let service = DashboardService::new(&Datastore::in_memory());
        let stats = service.stats(1).await.expect("stats should succeed");
        assert_eq!(stats, DashboardStats::default());
    }
}
