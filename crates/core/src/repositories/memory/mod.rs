//! In-process stores.
//!
//! [`MemoryStore`] keeps every table behind a single `tokio::sync::RwLock`, held only for the
//! duration of one operation. It mirrors the Postgres behaviour the services rely on:
//! ids are never reused, names are joined at read time, foreign keys are checked on write,
//! referenced patients and treatments cannot be deleted, and `updated_at` strictly increases.

mod appointments;
mod billing;
mod patients;
mod treatments;
mod users;

use crate::{DentalError, DentalResult};
use chrono::{DateTime, Duration, Utc};
use dental_types::patch::NullNotAllowed;
use dental_types::Patch;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::models::{
    Appointment, InsuranceClaim, Invoice, Patient, PatientTreatment, Treatment, UserRecord,
};

/// One table: rows by id plus the last id handed out.
#[derive(Debug)]
pub(crate) struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T: Clone> Table<T> {
    /// Allocates the next id and stores the row built for it.
    pub(crate) fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> T {
        self.last_id += 1;
        let row = build(self.last_id);
        self.rows.insert(self.last_id, row.clone());
        row
    }

    pub(crate) fn get(&self, id: i64) -> Option<&T> {
        self.rows.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: i64) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    pub(crate) fn contains(&self, id: i64) -> bool {
        self.rows.contains_key(&id)
    }

    pub(crate) fn remove(&mut self, id: i64) -> bool {
        self.rows.remove(&id).is_some()
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }
}

#[derive(Debug, Default)]
pub(crate) struct Tables {
    users: Table<UserRecord>,
    patients: Table<Patient>,
    appointments: Table<Appointment>,
    treatments: Table<Treatment>,
    patient_treatments: Table<PatientTreatment>,
    invoices: Table<Invoice>,
    claims: Table<InsuranceClaim>,
}

impl Tables {
    fn patient_name(&self, id: i64) -> String {
        self.patients
            .get(id)
            .map(Patient::full_name)
            .unwrap_or_default()
    }

    fn user_name(&self, id: i64) -> Option<String> {
        self.users.get(id).map(|record| record.user.full_name())
    }

    fn treatment_name(&self, id: i64) -> Option<String> {
        self.treatments.get(id).map(|t| t.name.clone())
    }

    fn require_patient(&self, id: i64) -> DentalResult<()> {
        if self.patients.contains(id) {
            Ok(())
        } else {
            Err(missing_reference())
        }
    }

    fn require_treatment(&self, id: i64) -> DentalResult<()> {
        if self.treatments.contains(id) {
            Ok(())
        } else {
            Err(missing_reference())
        }
    }

    fn require_user(&self, id: i64) -> DentalResult<()> {
        if self.users.contains(id) {
            Ok(())
        } else {
            Err(missing_reference())
        }
    }
}

/// Process-local datastore implementing every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing_reference() -> DentalError {
    DentalError::validation("Referenced record does not exist")
}

fn still_referenced() -> DentalError {
    DentalError::conflict("Record is still referenced by other records")
}

/// The next `updated_at`: now, or one microsecond past the previous value if the clock has
/// not moved on.
pub(crate) fn touch(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

/// Applies a patch to a non-nullable column.
pub(crate) fn apply<T>(field: &'static str, patch: &Patch<T>, slot: &mut T) -> DentalResult<()>
where
    T: Clone,
{
    patch
        .clone()
        .apply_to(slot)
        .map_err(|NullNotAllowed| DentalError::Validation(format!("{field} cannot be null")))
}

/// Case-insensitive substring match, the in-memory counterpart of `ILIKE '%term%'`.
pub(crate) fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_is_strictly_increasing() {
        let future = Utc::now() + Duration::seconds(60);
        assert!(touch(future) > future);
        let past = Utc::now() - Duration::seconds(60);
        assert!(touch(past) > past);
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let mut table: Table<i64> = Table::default();
        let first = table.insert_with(|id| id);
        assert!(table.remove(first));
        let second = table.insert_with(|id| id);
        assert_eq!(second, first + 1);
    }

    #[test]
    fn test_apply_rejects_null_for_required_column() {
        let mut name = "Ann".to_string();
        let err = apply("firstName", &Patch::Null, &mut name).expect_err("null must fail");
        assert_eq!(err.to_string(), "firstName cannot be null");
        assert_eq!(name, "Ann");
    }

    #[tokio::test]
    async fn test_find_by_email_returns_stored_user() {
        use crate::models::NewUser;
        use crate::repositories::UserStore;
        use dental_types::{EmailAddress, NonEmptyText, Role};

        let store = MemoryStore::new();
        let created = store
            .create(&NewUser {
                email: EmailAddress::parse("doc@example.com").expect("valid email"),
                password_hash: None,
                google_id: None,
                first_name: NonEmptyText::new("Dee").expect("valid name"),
                last_name: NonEmptyText::new("Ntist").expect("valid name"),
                role: Role::Dentist,
                phone: String::new(),
            })
            .await
            .expect("user should be created");

        let found = store
            .find_by_email("doc@example.com")
            .await
            .expect("lookup should succeed")
            .expect("user should be found");
        assert_eq!(found.user.id, created.id);
        assert!(store
            .find_by_email("nobody@example.com")
            .await
            .expect("lookup should succeed")
            .is_none());
    }
}
