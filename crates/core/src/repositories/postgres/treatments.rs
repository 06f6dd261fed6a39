use super::{corrupt, map_delete_error, map_write_error, priority_rank_sql, PgStore};
use crate::models::{
    NewPatientTreatment, NewTreatment, PatientTreatment, PatientTreatmentFilter, QueueFilter,
    Treatment, UpdatePatientTreatmentRequest, UpdateTreatmentRequest,
};
use crate::repositories::update::UpdateBuilder;
use crate::repositories::{PatientTreatmentStore, TreatmentStore};
use crate::{DentalError, DentalResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dental_types::TreatmentStatus;
use sqlx::{Postgres, QueryBuilder};

// ============================================================================
// CATALOG
// ============================================================================

const TREATMENT_COLUMNS: &str = "id, name, description, cost, duration_minutes AS duration, \
                                 category, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct TreatmentRow {
    id: i64,
    name: String,
    description: String,
    cost: f64,
    duration: i32,
    category: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TreatmentRow> for Treatment {
    fn from(row: TreatmentRow) -> Self {
        Treatment {
            id: row.id,
            name: row.name,
            description: row.description,
            cost: row.cost,
            duration: row.duration,
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl TreatmentStore for PgStore {
    async fn list(&self) -> DentalResult<Vec<Treatment>> {
        let sql = format!("SELECT {TREATMENT_COLUMNS} FROM treatments ORDER BY name ASC, id ASC");
        let rows = sqlx::query_as::<_, TreatmentRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Treatment::from).collect())
    }

    async fn get(&self, id: i64) -> DentalResult<Option<Treatment>> {
        let sql = format!("SELECT {TREATMENT_COLUMNS} FROM treatments WHERE id = $1");
        let row = sqlx::query_as::<_, TreatmentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Treatment::from))
    }

    async fn create(&self, new: &NewTreatment) -> DentalResult<Treatment> {
        let sql = format!(
            "INSERT INTO treatments (name, description, cost, duration_minutes, category) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {TREATMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TreatmentRow>(&sql)
            .bind(&new.name)
            .bind(&new.description)
            .bind(new.cost)
            .bind(new.duration)
            .bind(&new.category)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(row.into())
    }

    async fn update(
        &self,
        id: i64,
        patch: &UpdateTreatmentRequest,
    ) -> DentalResult<Option<Treatment>> {
        let mut update = UpdateBuilder::new("treatments");
        update
            .set("name", patch.name.clone())
            .set("description", patch.description.clone())
            .set("cost", patch.cost.clone())
            .set("duration_minutes", patch.duration.clone())
            .set("category", patch.category.clone())
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
        TreatmentStore::get(self, id).await
    }

    async fn delete(&self, id: i64) -> DentalResult<bool> {
        let result = sqlx::query("DELETE FROM treatments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;
        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// PATIENT ASSIGNMENTS
// ============================================================================

const PATIENT_TREATMENT_SELECT: &str = "SELECT pt.id, pt.patient_id, pt.treatment_id, pt.dentist_id, \
     p.first_name || ' ' || p.last_name AS patient_name, \
     t.name AS treatment_name, \
     u.first_name || ' ' || u.last_name AS dentist_name, \
     pt.status, pt.priority, pt.start_date, pt.completion_date, pt.notes, \
     pt.created_at, pt.updated_at \
     FROM patient_treatments pt \
     JOIN patients p ON p.id = pt.patient_id \
     JOIN treatments t ON t.id = pt.treatment_id \
     LEFT JOIN users u ON u.id = pt.dentist_id";

#[derive(sqlx::FromRow)]
struct PatientTreatmentRow {
    id: i64,
    patient_id: i64,
    treatment_id: i64,
    dentist_id: Option<i64>,
    patient_name: String,
    treatment_name: String,
    dentist_name: Option<String>,
    status: String,
    priority: String,
    start_date: NaiveDate,
    completion_date: Option<NaiveDate>,
    notes: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PatientTreatmentRow> for PatientTreatment {
    type Error = DentalError;

    fn try_from(row: PatientTreatmentRow) -> Result<Self, Self::Error> {
        Ok(PatientTreatment {
            id: row.id,
            patient_id: row.patient_id,
            treatment_id: row.treatment_id,
            dentist_id: row.dentist_id,
            patient_name: row.patient_name,
            treatment_name: row.treatment_name,
            dentist_name: row.dentist_name,
            status: row.status.parse().map_err(corrupt)?,
            priority: row.priority.parse().map_err(corrupt)?,
            start_date: row.start_date,
            completion_date: row.completion_date,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn list_query(filter: &PatientTreatmentFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(PATIENT_TREATMENT_SELECT);
    query.push(" WHERE TRUE");
    if let Some(patient_id) = filter.patient_id {
        query.push(" AND pt.patient_id = ").push_bind(patient_id);
    }
    if let Some(status) = filter.status {
        query.push(" AND pt.status = ").push_bind(status.as_str());
    }
    query.push(" ORDER BY pt.created_at DESC, pt.id DESC");
    query
}

/// Queued assignments, most urgent first, then oldest start date.
fn queued_statuses() -> Vec<String> {
    TreatmentStatus::QUEUED
        .iter()
        .map(|status| status.as_str().to_owned())
        .collect()
}

fn queue_query(filter: &QueueFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(PATIENT_TREATMENT_SELECT);
    query
        .push(" WHERE pt.status = ANY(")
        .push_bind(queued_statuses())
        .push(")");
    if let Some(dentist_id) = filter.dentist_id {
        query.push(" AND pt.dentist_id = ").push_bind(dentist_id);
    }
    query
        .push(" ORDER BY ")
        .push(priority_rank_sql("pt.priority"))
        .push(", pt.start_date ASC, pt.id ASC");
    query
}

#[async_trait]
impl PatientTreatmentStore for PgStore {
    async fn list(&self, filter: &PatientTreatmentFilter) -> DentalResult<Vec<PatientTreatment>> {
        let rows = list_query(filter)
            .build_query_as::<PatientTreatmentRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(PatientTreatment::try_from).collect()
    }

    async fn queue(&self, filter: &QueueFilter) -> DentalResult<Vec<PatientTreatment>> {
        let rows = queue_query(filter)
            .build_query_as::<PatientTreatmentRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(PatientTreatment::try_from).collect()
    }

    async fn queued_count(&self) -> DentalResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM patient_treatments WHERE status = ANY($1)")
                .bind(queued_statuses())
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn get(&self, id: i64) -> DentalResult<Option<PatientTreatment>> {
        let sql = format!("{PATIENT_TREATMENT_SELECT} WHERE pt.id = $1");
        let row = sqlx::query_as::<_, PatientTreatmentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(PatientTreatment::try_from).transpose()
    }

    async fn create(&self, new: &NewPatientTreatment) -> DentalResult<PatientTreatment> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO patient_treatments \
             (patient_id, treatment_id, dentist_id, status, priority, start_date, \
              completion_date, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(new.patient_id)
        .bind(new.treatment_id)
        .bind(new.dentist_id)
        .bind(new.status.as_str())
        .bind(new.priority.as_str())
        .bind(new.start_date)
        .bind(new.completion_date)
        .bind(&new.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        PatientTreatmentStore::get(self, id).await?.ok_or_else(|| {
            DentalError::Internal(format!("patient treatment {id} vanished after insert"))
        })
    }

    async fn update(
        &self,
        id: i64,
        patch: &UpdatePatientTreatmentRequest,
    ) -> DentalResult<Option<PatientTreatment>> {
        let mut update = UpdateBuilder::new("patient_treatments");
        update
            .set("patient_id", patch.patient_id.clone())
            .set("treatment_id", patch.treatment_id.clone())
            .set("dentist_id", patch.dentist_id.clone())
            .set_text("status", patch.status.clone())
            .set_text("priority", patch.priority.clone())
            .set("start_date", patch.start_date.clone())
            .set("completion_date", patch.completion_date.clone())
            .set("notes", patch.notes.clone())
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
        PatientTreatmentStore::get(self, id).await
    }

    async fn delete(&self, id: i64) -> DentalResult<bool> {
        let result = sqlx::query("DELETE FROM patient_treatments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_orders_by_priority_then_start_date() {
        let query = queue_query(&QueueFilter::default());
        let sql = query.sql();
        assert!(sql.contains("WHERE pt.status = ANY($1) ORDER BY CASE pt.priority"));
        assert!(sql.ends_with("END, pt.start_date ASC, pt.id ASC"));
    }

    #[test]
    fn test_queue_can_be_limited_to_one_dentist() {
        let query = queue_query(&QueueFilter {
            dentist_id: Some(2),
        });
        assert!(query.sql().contains("AND pt.dentist_id = $2 ORDER BY"));
    }

    #[test]
    fn test_assignment_list_filters() {
        let query = list_query(&PatientTreatmentFilter {
            patient_id: Some(1),
            status: Some(TreatmentStatus::Completed),
        });
        assert!(query
            .sql()
            .contains("WHERE TRUE AND pt.patient_id = $1 AND pt.status = $2 ORDER BY"));
    }
}
