//! Entity stores.
//!
//! Each entity has a store trait with the same shape: `list(filter)`, `get(id)`, `create`,
//! `update(id, patch)` and `delete(id)`. A missing row is a value (`None` or `false`), not an
//! error; the services turn it into [`DentalError::NotFound`](crate::DentalError::NotFound).
//!
//! Two implementations exist:
//! - [`postgres::PgStore`] issues parameterised SQL against a shared `PgPool`
//! - [`memory::MemoryStore`] keeps tables in process memory for tests and local demos
//!
//! Both enforce the same rules: denormalised names are joined at read time, `updated_at`
//! strictly increases on every successful update, and a patient or treatment that is still
//! referenced cannot be deleted.

pub mod memory;
pub mod postgres;
pub mod update;

use crate::models::{
    Appointment, AppointmentFilter, ClaimFilter, InsuranceClaim, Invoice, InvoiceFilter,
    NewAppointment, NewClaim, NewInvoice, NewPatient, NewPatientTreatment, NewTreatment,
    NewUser, Patient, PatientFilter, PatientStats, PatientTreatment, PatientTreatmentFilter,
    QueueFilter, Treatment, UpdateAppointmentRequest, UpdateClaimRequest, UpdateInvoiceRequest,
    UpdatePatientRequest, UpdatePatientTreatmentRequest, UpdateProfileRequest,
    UpdateTreatmentRequest, User, UserRecord,
};
use crate::DentalResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use std::sync::Arc;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> DentalResult<Option<UserRecord>>;

    async fn get(&self, id: i64) -> DentalResult<Option<UserRecord>>;

    /// Inserts a new account; a taken email is a [`Conflict`](crate::DentalError::Conflict).
    async fn create(&self, new: &NewUser) -> DentalResult<User>;

    async fn update_profile(
        &self,
        id: i64,
        patch: &UpdateProfileRequest,
    ) -> DentalResult<Option<User>>;

    async fn set_password(&self, id: i64, password_hash: &str) -> DentalResult<bool>;
}

#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Newest first.
    async fn list(&self, filter: &PatientFilter) -> DentalResult<Vec<Patient>>;

    async fn get(&self, id: i64) -> DentalResult<Option<Patient>>;

    async fn create(&self, new: &NewPatient) -> DentalResult<Patient>;

    async fn update(&self, id: i64, patch: &UpdatePatientRequest)
        -> DentalResult<Option<Patient>>;

    /// Fails with a conflict while appointments, assignments, invoices or claims reference
    /// the patient.
    async fn delete(&self, id: i64) -> DentalResult<bool>;

    async fn stats(&self) -> DentalResult<PatientStats>;
}

/// Appointments are always read and written on behalf of one dentist.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Date descending, then start time ascending.
    async fn list(
        &self,
        dentist_id: i64,
        filter: &AppointmentFilter,
    ) -> DentalResult<Vec<Appointment>>;

    async fn get(&self, dentist_id: i64, id: i64) -> DentalResult<Option<Appointment>>;

    async fn create(&self, new: &NewAppointment) -> DentalResult<Appointment>;

    async fn update(
        &self,
        dentist_id: i64,
        id: i64,
        patch: &UpdateAppointmentRequest,
    ) -> DentalResult<Option<Appointment>>;

    async fn delete(&self, dentist_id: i64, id: i64) -> DentalResult<bool>;

    /// Number of the dentist's appointments on `date`, any status.
    async fn count_on(&self, dentist_id: i64, date: NaiveDate) -> DentalResult<i64>;
}

#[async_trait]
pub trait TreatmentStore: Send + Sync {
    /// Alphabetical by name.
    async fn list(&self) -> DentalResult<Vec<Treatment>>;

    async fn get(&self, id: i64) -> DentalResult<Option<Treatment>>;

    async fn create(&self, new: &NewTreatment) -> DentalResult<Treatment>;

    async fn update(
        &self,
        id: i64,
        patch: &UpdateTreatmentRequest,
    ) -> DentalResult<Option<Treatment>>;

    async fn delete(&self, id: i64) -> DentalResult<bool>;
}

#[async_trait]
pub trait PatientTreatmentStore: Send + Sync {
    /// Newest first.
    async fn list(&self, filter: &PatientTreatmentFilter) -> DentalResult<Vec<PatientTreatment>>;

    /// Pending and in-progress assignments: priority rank, then start date, then id.
    async fn queue(&self, filter: &QueueFilter) -> DentalResult<Vec<PatientTreatment>>;

    /// Size of the whole queue.
    async fn queued_count(&self) -> DentalResult<i64>;

    async fn get(&self, id: i64) -> DentalResult<Option<PatientTreatment>>;

    async fn create(&self, new: &NewPatientTreatment) -> DentalResult<PatientTreatment>;

    async fn update(
        &self,
        id: i64,
        patch: &UpdatePatientTreatmentRequest,
    ) -> DentalResult<Option<PatientTreatment>>;

    async fn delete(&self, id: i64) -> DentalResult<bool>;
}

/// Invoice sums over a calendar window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InvoiceTotals {
    /// Paid invoices issued within the window.
    pub revenue: f64,
    pub pending: f64,
    /// Paid invoices regardless of date.
    pub collected: f64,
}

#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn list(&self, filter: &InvoiceFilter) -> DentalResult<Vec<Invoice>>;

    async fn get(&self, id: i64) -> DentalResult<Option<Invoice>>;

    async fn create(&self, new: &NewInvoice) -> DentalResult<Invoice>;

    async fn update(&self, id: i64, patch: &UpdateInvoiceRequest)
        -> DentalResult<Option<Invoice>>;

    async fn delete(&self, id: i64) -> DentalResult<bool>;

    /// Totals with revenue restricted to `issued_date` in `[from, until)`.
    async fn totals(&self, from: NaiveDate, until: NaiveDate) -> DentalResult<InvoiceTotals>;
}

#[async_trait]
pub trait ClaimStore: Send + Sync {
    async fn list(&self, filter: &ClaimFilter) -> DentalResult<Vec<InsuranceClaim>>;

    async fn get(&self, id: i64) -> DentalResult<Option<InsuranceClaim>>;

    async fn create(&self, new: &NewClaim) -> DentalResult<InsuranceClaim>;

    async fn update(
        &self,
        id: i64,
        patch: &UpdateClaimRequest,
    ) -> DentalResult<Option<InsuranceClaim>>;

    async fn delete(&self, id: i64) -> DentalResult<bool>;

    /// Sum of claim amounts still awaiting a decision.
    async fn submitted_total(&self) -> DentalResult<f64>;
}

/// Handles to every store, injected into the services.
#[derive(Clone)]
pub struct Datastore {
    pub users: Arc<dyn UserStore>,
    pub patients: Arc<dyn PatientStore>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub treatments: Arc<dyn TreatmentStore>,
    pub patient_treatments: Arc<dyn PatientTreatmentStore>,
    pub invoices: Arc<dyn InvoiceStore>,
    pub claims: Arc<dyn ClaimStore>,
}

impl Datastore {
    /// Builds every store over one shared connection pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self::from_store(Arc::new(postgres::PgStore::new(pool)))
    }

    /// Builds every store over one fresh in-process database.
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(memory::MemoryStore::new()))
    }

    fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserStore
            + PatientStore
            + AppointmentStore
            + TreatmentStore
            + PatientTreatmentStore
            + InvoiceStore
            + ClaimStore
            + 'static,
    {
        Self {
            users: store.clone(),
            patients: store.clone(),
            appointments: store.clone(),
            treatments: store.clone(),
            patient_treatments: store.clone(),
            invoices: store.clone(),
            claims: store,
        }
    }
}

impl std::fmt::Debug for Datastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Datastore").finish_non_exhaustive()
    }
}
