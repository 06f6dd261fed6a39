use super::{corrupt, map_write_error, PgStore};
use crate::models::{
    Appointment, AppointmentFilter, NewAppointment, TimeOfDay, UpdateAppointmentRequest,
};
use crate::repositories::update::UpdateBuilder;
use crate::repositories::AppointmentStore;
use crate::{DentalError, DentalResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Postgres, QueryBuilder};

const APPOINTMENT_SELECT: &str = "SELECT a.id, a.patient_id, a.dentist_id, \
     p.first_name || ' ' || p.last_name AS patient_name, \
     u.first_name || ' ' || u.last_name AS dentist_name, \
     a.appointment_date, a.start_time, a.end_time, a.status, a.notes, a.created_at, a.updated_at \
     FROM appointments a \
     JOIN patients p ON p.id = a.patient_id \
     JOIN users u ON u.id = a.dentist_id";

#[derive(sqlx::FromRow)]
struct AppointmentRow {
    id: i64,
    patient_id: i64,
    dentist_id: i64,
    patient_name: String,
    dentist_name: String,
    appointment_date: NaiveDate,
    start_time: TimeOfDay,
    end_time: TimeOfDay,
    status: String,
    notes: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = DentalError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        Ok(Appointment {
            id: row.id,
            patient_id: row.patient_id,
            dentist_id: row.dentist_id,
            patient_name: row.patient_name,
            dentist_name: row.dentist_name,
            appointment_date: row.appointment_date,
            start_time: row.start_time,
            end_time: row.end_time,
            status: row.status.parse().map_err(corrupt)?,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn list_query(dentist_id: i64, filter: &AppointmentFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(APPOINTMENT_SELECT);
    query.push(" WHERE a.dentist_id = ").push_bind(dentist_id);

    if let Some(date) = filter.date {
        query.push(" AND a.appointment_date = ").push_bind(date);
    }
    if let Some(status) = filter.status {
        query.push(" AND a.status = ").push_bind(status.as_str());
    }
    if let Some(patient_id) = filter.patient_id {
        query.push(" AND a.patient_id = ").push_bind(patient_id);
    }

    query.push(" ORDER BY a.appointment_date DESC, a.start_time ASC, a.id ASC");
    query
}

#[async_trait]
impl AppointmentStore for PgStore {
    async fn list(
        &self,
        dentist_id: i64,
        filter: &AppointmentFilter,
    ) -> DentalResult<Vec<Appointment>> {
        let rows = list_query(dentist_id, filter)
            .build_query_as::<AppointmentRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Appointment::try_from).collect()
    }

    async fn get(&self, dentist_id: i64, id: i64) -> DentalResult<Option<Appointment>> {
        let sql = format!("{APPOINTMENT_SELECT} WHERE a.id = $1 AND a.dentist_id = $2");
        let row = sqlx::query_as::<_, AppointmentRow>(&sql)
            .bind(id)
            .bind(dentist_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Appointment::try_from).transpose()
    }

    async fn create(&self, new: &NewAppointment) -> DentalResult<Appointment> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO appointments \
             (patient_id, dentist_id, appointment_date, start_time, end_time, status, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(new.patient_id)
        .bind(new.dentist_id)
        .bind(new.appointment_date)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(new.status.as_str())
        .bind(&new.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        AppointmentStore::get(self, new.dentist_id, id)
            .await?
            .ok_or_else(|| DentalError::Internal(format!("appointment {id} vanished after insert")))
    }

    async fn update(
        &self,
        dentist_id: i64,
        id: i64,
        patch: &UpdateAppointmentRequest,
    ) -> DentalResult<Option<Appointment>> {
        let mut update = UpdateBuilder::new("appointments");
        update
            .set("patient_id", patch.patient_id.clone())
            .set("appointment_date", patch.appointment_date.clone())
            .set("start_time", patch.start_time.clone())
            .set("end_time", patch.end_time.clone())
            .set_text("status", patch.status.clone())
            .set("notes", patch.notes.clone())
            .filter("id", id)
            .filter("dentist_id", dentist_id);

        let result = update
            .into_query_builder()
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        AppointmentStore::get(self, dentist_id, id).await
    }

    async fn delete(&self, dentist_id: i64, id: i64) -> DentalResult<bool> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1 AND dentist_id = $2")
            .bind(id)
            .bind(dentist_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_on(&self, dentist_id: i64, date: NaiveDate) -> DentalResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments WHERE dentist_id = $1 AND appointment_date = $2",
        )
        .bind(dentist_id)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_is_always_scoped_to_dentist() {
        let query = list_query(4, &AppointmentFilter::default());
        assert!(query.sql().contains("WHERE a.dentist_id = $1 ORDER BY"));
    }

    #[test]
    fn test_filters_append_in_order() {
        let filter = AppointmentFilter {
            date: NaiveDate::from_ymd_opt(2030, 1, 2),
            status: Some(dental_types::AppointmentStatus::Scheduled),
            patient_id: Some(9),
        };
        let query = list_query(4, &filter);
        assert!(query.sql().contains(
            "a.dentist_id = $1 AND a.appointment_date = $2 AND a.status = $3 AND a.patient_id = $4"
        ));
    }
}
