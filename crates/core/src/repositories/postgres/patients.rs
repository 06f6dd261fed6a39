use super::{corrupt, like_pattern, map_delete_error, map_write_error, PgStore};
use crate::models::{NewPatient, Patient, PatientFilter, PatientStats, UpdatePatientRequest};
use crate::repositories::update::UpdateBuilder;
use crate::repositories::PatientStore;
use crate::{DentalError, DentalResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dental_types::RiskLevel;
use sqlx::{Postgres, QueryBuilder};

const PATIENT_COLUMNS: &str = "id, first_name, last_name, date_of_birth, phone, email, address, \
                               emergency_contact, insurance_provider, insurance_policy_number, \
                               medical_history, risk_level, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct PatientRow {
    id: i64,
    first_name: String,
    last_name: String,
    date_of_birth: NaiveDate,
    phone: String,
    email: String,
    address: String,
    emergency_contact: String,
    insurance_provider: String,
    insurance_policy_number: String,
    medical_history: String,
    risk_level: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PatientRow> for Patient {
    type Error = DentalError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        Ok(Patient {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            date_of_birth: row.date_of_birth,
            phone: row.phone,
            email: row.email,
            address: row.address,
            emergency_contact: row.emergency_contact,
            insurance_provider: row.insurance_provider,
            insurance_policy_number: row.insurance_policy_number,
            medical_history: row.medical_history,
            risk_level: row.risk_level.parse().map_err(corrupt)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// `SELECT` for the patient list; absent filters add no conditions.
fn list_query(filter: &PatientFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE TRUE"));

    if let Some(term) = filter.search_term() {
        let pattern = like_pattern(term);
        query.push(" AND (");
        let mut columns = query.separated(" OR ");
        for column in ["first_name", "last_name", "email", "phone"] {
            columns
                .push(column)
                .push_unseparated(" ILIKE ")
                .push_bind_unseparated(pattern.clone());
        }
        query.push(")");
    }
    if let Some(risk) = filter.risk_level {
        query.push(" AND risk_level = ").push_bind(risk.as_str());
    }

    query.push(" ORDER BY created_at DESC, id DESC");
    query
}

#[async_trait]
impl PatientStore for PgStore {
    async fn list(&self, filter: &PatientFilter) -> DentalResult<Vec<Patient>> {
        let rows = list_query(filter)
            .build_query_as::<PatientRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Patient::try_from).collect()
    }

    async fn get(&self, id: i64) -> DentalResult<Option<Patient>> {
        let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1");
        let row = sqlx::query_as::<_, PatientRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Patient::try_from).transpose()
    }

    async fn create(&self, new: &NewPatient) -> DentalResult<Patient> {
        let sql = format!(
            "INSERT INTO patients (first_name, last_name, date_of_birth, phone, email, address, \
             emergency_contact, insurance_provider, insurance_policy_number, medical_history, \
             risk_level) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {PATIENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PatientRow>(&sql)
            .bind(&new.first_name)
            .bind(&new.last_name)
            .bind(new.date_of_birth)
            .bind(&new.phone)
            .bind(&new.email)
            .bind(&new.address)
            .bind(&new.emergency_contact)
            .bind(&new.insurance_provider)
            .bind(&new.insurance_policy_number)
            .bind(&new.medical_history)
            .bind(new.risk_level.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;
        Patient::try_from(row)
    }

    async fn update(
        &self,
        id: i64,
        patch: &UpdatePatientRequest,
    ) -> DentalResult<Option<Patient>> {
        let mut update = UpdateBuilder::new("patients");
        update
            .set("first_name", patch.first_name.clone())
            .set("last_name", patch.last_name.clone())
            .set("date_of_birth", patch.date_of_birth.clone())
            .set("phone", patch.phone.clone())
            .set("email", patch.email.clone())
            .set("address", patch.address.clone())
            .set("emergency_contact", patch.emergency_contact.clone())
            .set("insurance_provider", patch.insurance_provider.clone())
            .set("insurance_policy_number", patch.insurance_policy_number.clone())
            .set("medical_history", patch.medical_history.clone())
            .set_text("risk_level", patch.risk_level.clone())
            .filter("id", id);

        let result = update
            .into_query_builder()
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        PatientStore::get(self, id).await
    }

    async fn delete(&self, id: i64) -> DentalResult<bool> {
        let result = sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn stats(&self) -> DentalResult<PatientStats> {
        let (total, low, medium, high): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COUNT(*) FILTER (WHERE risk_level = $1), \
                    COUNT(*) FILTER (WHERE risk_level = $2), \
                    COUNT(*) FILTER (WHERE risk_level = $3) \
             FROM patients",
        )
        .bind(RiskLevel::Low.as_str())
        .bind(RiskLevel::Medium.as_str())
        .bind(RiskLevel::High.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(PatientStats {
            total_patients: total,
            low_risk_patients: low,
            medium_risk_patients: medium,
            high_risk_patients: high,
        })
    }
}
