use super::{corrupt, map_write_error, PgStore};
use crate::models::{
    ClaimFilter, InsuranceClaim, Invoice, InvoiceFilter, NewClaim, NewInvoice,
    UpdateClaimRequest, UpdateInvoiceRequest,
};
use crate::repositories::update::UpdateBuilder;
use crate::repositories::{ClaimStore, InvoiceStore, InvoiceTotals};
use crate::{DentalError, DentalResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dental_types::{ClaimStatus, InvoiceStatus};
use sqlx::{Postgres, QueryBuilder};

// ============================================================================
// INVOICES
// ============================================================================

const INVOICE_SELECT: &str = "SELECT i.id, i.patient_id, \
     p.first_name || ' ' || p.last_name AS patient_name, \
     i.amount, i.status, i.due_date, i.issued_date, i.payment_method, i.notes, \
     i.created_at, i.updated_at \
     FROM invoices i \
     JOIN patients p ON p.id = i.patient_id";

#[derive(sqlx::FromRow)]
struct InvoiceRow {
    id: i64,
    patient_id: i64,
    patient_name: String,
    amount: f64,
    status: String,
    due_date: NaiveDate,
    issued_date: NaiveDate,
    payment_method: String,
    notes: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = DentalError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        Ok(Invoice {
            id: row.id,
            patient_id: row.patient_id,
            patient_name: row.patient_name,
            amount: row.amount,
            status: row.status.parse().map_err(corrupt)?,
            due_date: row.due_date,
            issued_date: row.issued_date,
            payment_method: row.payment_method,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn invoice_list_query(filter: &InvoiceFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(INVOICE_SELECT);
    query.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        query.push(" AND i.status = ").push_bind(status.as_str());
    }
    if let Some(patient_id) = filter.patient_id {
        query.push(" AND i.patient_id = ").push_bind(patient_id);
    }
    query.push(" ORDER BY i.created_at DESC, i.id DESC");
    query
}

#[async_trait]
impl InvoiceStore for PgStore {
    async fn list(&self, filter: &InvoiceFilter) -> DentalResult<Vec<Invoice>> {
        let rows = invoice_list_query(filter)
            .build_query_as::<InvoiceRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Invoice::try_from).collect()
    }

    async fn get(&self, id: i64) -> DentalResult<Option<Invoice>> {
        let sql = format!("{INVOICE_SELECT} WHERE i.id = $1");
        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Invoice::try_from).transpose()
    }

    async fn create(&self, new: &NewInvoice) -> DentalResult<Invoice> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO invoices \
             (patient_id, amount, status, due_date, issued_date, payment_method, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(new.patient_id)
        .bind(new.amount)
        .bind(new.status.as_str())
        .bind(new.due_date)
        .bind(new.issued_date)
        .bind(&new.payment_method)
        .bind(&new.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        InvoiceStore::get(self, id)
            .await?
            .ok_or_else(|| DentalError::Internal(format!("invoice {id} vanished after insert")))
    }

    async fn update(
        &self,
        id: i64,
        patch: &UpdateInvoiceRequest,
    ) -> DentalResult<Option<Invoice>> {
        let mut update = UpdateBuilder::new("invoices");
        update
            .set("patient_id", patch.patient_id.clone())
            .set("amount", patch.amount.clone())
            .set_text("status", patch.status.clone())
            .set("due_date", patch.due_date.clone())
            .set("issued_date", patch.issued_date.clone())
            .set("payment_method", patch.payment_method.clone())
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
        InvoiceStore::get(self, id).await
    }

    async fn delete(&self, id: i64) -> DentalResult<bool> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn totals(&self, from: NaiveDate, until: NaiveDate) -> DentalResult<InvoiceTotals> {
        let (revenue, pending, collected): (f64, f64, f64) = sqlx::query_as(
            "SELECT \
               COALESCE(SUM(amount) FILTER (WHERE status = $1 AND issued_date >= $3 AND issued_date < $4), 0), \
               COALESCE(SUM(amount) FILTER (WHERE status = $2), 0), \
               COALESCE(SUM(amount) FILTER (WHERE status = $1), 0) \
             FROM invoices",
        )
        .bind(InvoiceStatus::Paid.as_str())
        .bind(InvoiceStatus::Pending.as_str())
        .bind(from)
        .bind(until)
        .fetch_one(&self.pool)
        .await?;

        Ok(InvoiceTotals {
            revenue,
            pending,
            collected,
        })
    }
}

// ============================================================================
// INSURANCE CLAIMS
// ============================================================================

const CLAIM_SELECT: &str = "SELECT c.id, c.patient_id, \
     p.first_name || ' ' || p.last_name AS patient_name, \
     c.treatment_id, t.name AS treatment_name, \
     c.claim_amount, c.status, c.submission_date, c.approval_date, c.notes, \
     c.created_at, c.updated_at \
     FROM insurance_claims c \
     JOIN patients p ON p.id = c.patient_id \
     LEFT JOIN treatments t ON t.id = c.treatment_id";

#[derive(sqlx::FromRow)]
struct ClaimRow {
    id: i64,
    patient_id: i64,
    patient_name: String,
    treatment_id: Option<i64>,
    treatment_name: Option<String>,
    claim_amount: f64,
    status: String,
    submission_date: NaiveDate,
    approval_date: Option<NaiveDate>,
    notes: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ClaimRow> for InsuranceClaim {
    type Error = DentalError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        Ok(InsuranceClaim {
            id: row.id,
            patient_id: row.patient_id,
            patient_name: row.patient_name,
            treatment_id: row.treatment_id,
            treatment_name: row.treatment_name,
            claim_amount: row.claim_amount,
            status: row.status.parse().map_err(corrupt)?,
            submission_date: row.submission_date,
            approval_date: row.approval_date,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn claim_list_query(filter: &ClaimFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(CLAIM_SELECT);
    query.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        query.push(" AND c.status = ").push_bind(status.as_str());
    }
    if let Some(patient_id) = filter.patient_id {
        query.push(" AND c.patient_id = ").push_bind(patient_id);
    }
    query.push(" ORDER BY c.created_at DESC, c.id DESC");
    query
}

#[async_trait]
impl ClaimStore for PgStore {
    async fn list(&self, filter: &ClaimFilter) -> DentalResult<Vec<InsuranceClaim>> {
        let rows = claim_list_query(filter)
            .build_query_as::<ClaimRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(InsuranceClaim::try_from).collect()
    }

    async fn get(&self, id: i64) -> DentalResult<Option<InsuranceClaim>> {
        let sql = format!("{CLAIM_SELECT} WHERE c.id = $1");
        let row = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(InsuranceClaim::try_from).transpose()
    }

    async fn create(&self, new: &NewClaim) -> DentalResult<InsuranceClaim> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO insurance_claims \
             (patient_id, treatment_id, claim_amount, status, submission_date, approval_date, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(new.patient_id)
        .bind(new.treatment_id)
        .bind(new.claim_amount)
        .bind(new.status.as_str())
        .bind(new.submission_date)
        .bind(new.approval_date)
        .bind(&new.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        ClaimStore::get(self, id).await?.ok_or_else(|| {
            DentalError::Internal(format!("insurance claim {id} vanished after insert"))
        })
    }

    async fn update(
        &self,
        id: i64,
        patch: &UpdateClaimRequest,
    ) -> DentalResult<Option<InsuranceClaim>> {
        let mut update = UpdateBuilder::new("insurance_claims");
        update
            .set("patient_id", patch.patient_id.clone())
            .set("treatment_id", patch.treatment_id.clone())
            .set("claim_amount", patch.claim_amount.clone())
            .set_text("status", patch.status.clone())
            .set("submission_date", patch.submission_date.clone())
            .set("approval_date", patch.approval_date.clone())
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
        ClaimStore::get(self, id).await
    }

    async fn delete(&self, id: i64) -> DentalResult<bool> {
        let result = sqlx::query("DELETE FROM insurance_claims WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn submitted_total(&self) -> DentalResult<f64> {
        let total: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(claim_amount), 0) FROM insurance_claims WHERE status = $1",
        )
        .bind(ClaimStatus::Submitted.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_filters() {
        let query = invoice_list_query(&InvoiceFilter {
            status: Some(InvoiceStatus::Overdue),
            patient_id: None,
        });
        assert!(query
            .sql()
            .contains("WHERE TRUE AND i.status = $1 ORDER BY i.created_at DESC"));
    }

    #[test]
    fn test_claim_list_left_joins_treatment() {
        let query = claim_list_query(&ClaimFilter::default());
        assert!(query.sql().contains("LEFT JOIN treatments t ON t.id = c.treatment_id"));
    }
}
