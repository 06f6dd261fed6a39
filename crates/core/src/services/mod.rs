//! # Services
//!
//! Validation and orchestration on top of the [`Datastore`]. Each service owns the checks that
//! do not belong in SQL (text shape, money and duration ranges, calendar rules) and turns a
//! store's "no such row" into [`DentalError::NotFound`].
//!
//! **No HTTP concerns**: status codes and response bodies belong in `api-rest`.

pub mod appointments;
pub mod auth;
pub mod billing;
pub mod dashboard;
pub mod patients;
pub mod treatments;

pub use appointments::AppointmentService;
pub use auth::AuthService;
pub use billing::BillingService;
pub use dashboard::DashboardService;
pub use patients::PatientService;
pub use treatments::TreatmentService;

use crate::error::field_error;
use crate::repositories::Datastore;
use crate::{DentalError, DentalResult};
use dental_types::{EmailAddress, NonEmptyText, Patch};

/// Every service, built over one datastore.
#[derive(Clone, Debug)]
pub struct Services {
    pub auth: AuthService,
    pub patients: PatientService,
    pub appointments: AppointmentService,
    pub treatments: TreatmentService,
    pub billing: BillingService,
    pub dashboard: DashboardService,
}

impl Services {
    pub fn new(store: &Datastore, auth: AuthService) -> Self {
        Self {
            auth,
            patients: PatientService::new(store),
            appointments: AppointmentService::new(store),
            treatments: TreatmentService::new(store),
            billing: BillingService::new(store),
            dashboard: DashboardService::new(store),
        }
    }
}

fn found<T>(entity: &'static str, row: Option<T>) -> DentalResult<T> {
    row.ok_or(DentalError::NotFound(entity))
}

fn removed(entity: &'static str, deleted: bool) -> DentalResult<()> {
    if deleted {
        Ok(())
    } else {
        Err(DentalError::NotFound(entity))
    }
}

/// Trimmed, non-empty text.
fn required_text(field: &str, value: &str) -> DentalResult<String> {
    NonEmptyText::new(value)
        .map(NonEmptyText::into_inner)
        .map_err(|err| field_error(field, err))
}

fn email(field: &str, value: &str) -> DentalResult<String> {
    EmailAddress::parse(value)
        .map(EmailAddress::into_inner)
        .map_err(|err| field_error(field, err))
}

fn optional_text(value: Option<String>) -> String {
    value.map(|v| v.trim().to_owned()).unwrap_or_default()
}

/// Money must be a finite, non-negative number.
fn amount(field: &str, value: f64) -> DentalResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(DentalError::Validation(format!(
            "{field} must be a non-negative number"
        )))
    }
}

fn non_null<T>(field: &'static str, patch: &Patch<T>) -> DentalResult<()> {
    patch.require_non_null(field)?;
    Ok(())
}

/// Rejects `null` and validates a present value as required text.
fn required_text_patch(field: &'static str, patch: &Patch<String>) -> DentalResult<Patch<String>> {
    non_null(field, patch)?;
    patch.clone().try_map(|v| required_text(field, &v))
}

fn email_patch(field: &'static str, patch: &Patch<String>) -> DentalResult<Patch<String>> {
    non_null(field, patch)?;
    patch.clone().try_map(|v| email(field, &v))
}

fn amount_patch(field: &'static str, patch: &Patch<f64>) -> DentalResult<Patch<f64>> {
    non_null(field, patch)?;
    patch.clone().try_map(|v| amount(field, v))
}

/// Free text columns are never NULL; `null` is read as "clear".
fn text_patch(patch: &Patch<String>) -> Patch<String> {
    match patch {
        Patch::Absent => Patch::Absent,
        Patch::Null => Patch::Value(String::new()),
        Patch::Value(v) => Patch::Value(v.trim().to_owned()),
    }
}
