use super::{apply, touch, MemoryStore, Tables};
use crate::models::{
    ClaimFilter, InsuranceClaim, Invoice, InvoiceFilter, NewClaim, NewInvoice,
    UpdateClaimRequest, UpdateInvoiceRequest,
};
use crate::repositories::{ClaimStore, InvoiceStore, InvoiceTotals};
use crate::DentalResult;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dental_types::{ClaimStatus, InvoiceStatus};

fn hydrate_invoice(tables: &Tables, invoice: &Invoice) -> Invoice {
    Invoice {
        patient_name: tables.patient_name(invoice.patient_id),
        ..invoice.clone()
    }
}

fn hydrate_claim(tables: &Tables, claim: &InsuranceClaim) -> InsuranceClaim {
    InsuranceClaim {
        patient_name: tables.patient_name(claim.patient_id),
        treatment_name: claim.treatment_id.and_then(|id| tables.treatment_name(id)),
        ..claim.clone()
    }
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn list(&self, filter: &InvoiceFilter) -> DentalResult<Vec<Invoice>> {
        let tables = self.tables.read().await;
        let mut invoices: Vec<Invoice> = tables
            .invoices
            .values()
            .filter(|i| filter.status.map_or(true, |s| i.status == s))
            .filter(|i| filter.patient_id.map_or(true, |p| i.patient_id == p))
            .map(|i| hydrate_invoice(&tables, i))
            .collect();
        invoices.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(invoices)
    }

    async fn get(&self, id: i64) -> DentalResult<Option<Invoice>> {
        let tables = self.tables.read().await;
        Ok(tables.invoices.get(id).map(|i| hydrate_invoice(&tables, i)))
    }

    async fn create(&self, new: &NewInvoice) -> DentalResult<Invoice> {
        let mut tables = self.tables.write().await;
        tables.require_patient(new.patient_id)?;

        let now = Utc::now();
        let stored = tables.invoices.insert_with(|id| Invoice {
            id,
            patient_id: new.patient_id,
            patient_name: String::new(),
            amount: new.amount,
            status: new.status,
            due_date: new.due_date,
            issued_date: new.issued_date,
            payment_method: new.payment_method.clone(),
            notes: new.notes.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(hydrate_invoice(&tables, &stored))
    }

    async fn update(
        &self,
        id: i64,
        patch: &UpdateInvoiceRequest,
    ) -> DentalResult<Option<Invoice>> {
        let mut tables = self.tables.write().await;
        let Some(current) = tables.invoices.get(id).cloned() else {
            return Ok(None);
        };
        if let Some(patient_id) = patch.patient_id.value() {
            tables.require_patient(*patient_id)?;
        }

        let mut invoice = current;
        apply("patientId", &patch.patient_id, &mut invoice.patient_id)?;
        apply("amount", &patch.amount, &mut invoice.amount)?;
        apply("status", &patch.status, &mut invoice.status)?;
        apply("dueDate", &patch.due_date, &mut invoice.due_date)?;
        apply("issuedDate", &patch.issued_date, &mut invoice.issued_date)?;
        apply("paymentMethod", &patch.payment_method, &mut invoice.payment_method)?;
        apply("notes", &patch.notes, &mut invoice.notes)?;
        invoice.updated_at = touch(invoice.updated_at);

        if let Some(stored) = tables.invoices.get_mut(id) {
            *stored = invoice.clone();
        }
        Ok(Some(hydrate_invoice(&tables, &invoice)))
    }

    async fn delete(&self, id: i64) -> DentalResult<bool> {
        Ok(self.tables.write().await.invoices.remove(id))
    }

    async fn totals(&self, from: NaiveDate, until: NaiveDate) -> DentalResult<InvoiceTotals> {
        let tables = self.tables.read().await;
        let mut totals = InvoiceTotals::default();
        for invoice in tables.invoices.values() {
            match invoice.status {
                InvoiceStatus::Paid => {
                    totals.collected += invoice.amount;
                    if invoice.issued_date >= from && invoice.issued_date < until {
                        totals.revenue += invoice.amount;
                    }
                }
                InvoiceStatus::Pending => totals.pending += invoice.amount,
                InvoiceStatus::Overdue => {}
            }
        }
        Ok(totals)
    }
}

#[async_trait]
impl ClaimStore for MemoryStore {
    async fn list(&self, filter: &ClaimFilter) -> DentalResult<Vec<InsuranceClaim>> {
        let tables = self.tables.read().await;
        let mut claims: Vec<InsuranceClaim> = tables
            .claims
            .values()
            .filter(|c| filter.status.map_or(true, |s| c.status == s))
            .filter(|c| filter.patient_id.map_or(true, |p| c.patient_id == p))
            .map(|c| hydrate_claim(&tables, c))
            .collect();
        claims.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(claims)
    }

    async fn get(&self, id: i64) -> DentalResult<Option<InsuranceClaim>> {
        let tables = self.tables.read().await;
        Ok(tables.claims.get(id).map(|c| hydrate_claim(&tables, c)))
    }

    async fn create(&self, new: &NewClaim) -> DentalResult<InsuranceClaim> {
        let mut tables = self.tables.write().await;
        tables.require_patient(new.patient_id)?;
        if let Some(treatment_id) = new.treatment_id {
            tables.require_treatment(treatment_id)?;
        }

        let now = Utc::now();
        let stored = tables.claims.insert_with(|id| InsuranceClaim {
            id,
            patient_id: new.patient_id,
            patient_name: String::new(),
            treatment_id: new.treatment_id,
            treatment_name: None,
            claim_amount: new.claim_amount,
            status: new.status,
            submission_date: new.submission_date,
            approval_date: new.approval_date,
            notes: new.notes.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(hydrate_claim(&tables, &stored))
    }

    async fn update(
        &self,
        id: i64,
        patch: &UpdateClaimRequest,
    ) -> DentalResult<Option<InsuranceClaim>> {
        let mut tables = self.tables.write().await;
        let Some(current) = tables.claims.get(id).cloned() else {
            return Ok(None);
        };
        if let Some(patient_id) = patch.patient_id.value() {
            tables.require_patient(*patient_id)?;
        }
        if let Some(treatment_id) = patch.treatment_id.value() {
            tables.require_treatment(*treatment_id)?;
        }

        let mut claim = current;
        apply("patientId", &patch.patient_id, &mut claim.patient_id)?;
        patch.treatment_id.clone().apply_to_option(&mut claim.treatment_id);
        apply("claimAmount", &patch.claim_amount, &mut claim.claim_amount)?;
        apply("status", &patch.status, &mut claim.status)?;
        apply("submissionDate", &patch.submission_date, &mut claim.submission_date)?;
        patch
            .approval_date
            .clone()
            .apply_to_option(&mut claim.approval_date);
        apply("notes", &patch.notes, &mut claim.notes)?;
        claim.updated_at = touch(claim.updated_at);

        if let Some(stored) = tables.claims.get_mut(id) {
            *stored = claim.clone();
        }
        Ok(Some(hydrate_claim(&tables, &claim)))
    }

    async fn delete(&self, id: i64) -> DentalResult<bool> {
        Ok(self.tables.write().await.claims.remove(id))
    }

    async fn submitted_total(&self) -> DentalResult<f64> {
        let tables = self.tables.read().await;
        Ok(tables
            .claims
            .values()
            .filter(|c| c.status == ClaimStatus::Submitted)
            .map(|c| c.claim_amount)
            .sum())
    }
}
