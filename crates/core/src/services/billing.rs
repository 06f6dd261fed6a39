use super::{amount, amount_patch, found, non_null, optional_text, removed, text_patch};
use crate::clock;
use crate::models::{
    BillingStats, ClaimFilter, CreateClaimRequest, CreateInvoiceRequest, InsuranceClaim,
    Invoice, InvoiceFilter, NewClaim, NewInvoice, UpdateClaimRequest, UpdateInvoiceRequest,
};
use crate::repositories::{ClaimStore, Datastore, InvoiceStore};
use crate::DentalResult;
use std::sync::Arc;

/// Invoices, insurance claims and the money totals over them.
#[derive(Clone)]
pub struct BillingService {
    invoices: Arc<dyn InvoiceStore>,
    claims: Arc<dyn ClaimStore>,
}

impl BillingService {
    pub fn new(store: &Datastore) -> Self {
        Self {
            invoices: store.invoices.clone(),
            claims: store.claims.clone(),
        }
    }

    pub async fn list_invoices(&self, filter: &InvoiceFilter) -> DentalResult<Vec<Invoice>> {
        self.invoices.list(filter).await
    }

    pub async fn get_invoice(&self, id: i64) -> DentalResult<Invoice> {
        found("Invoice", self.invoices.get(id).await?)
    }

    pub async fn create_invoice(&self, req: CreateInvoiceRequest) -> DentalResult<Invoice> {
        let new = NewInvoice {
            patient_id: req.patient_id,
            amount: amount("amount", req.amount)?,
            status: req.status.unwrap_or_default(),
            due_date: req.due_date,
            issued_date: req.issued_date.unwrap_or_else(clock::today),
            payment_method: optional_text(req.payment_method),
            notes: optional_text(req.notes),
        };
        let invoice = self.invoices.create(&new).await?;
        tracing::info!(invoice_id = invoice.id, patient_id = invoice.patient_id, "issued invoice");
        Ok(invoice)
    }

    pub async fn update_invoice(
        &self,
        id: i64,
        req: UpdateInvoiceRequest,
    ) -> DentalResult<Invoice> {
        non_null("patientId", &req.patient_id)?;
        non_null("status", &req.status)?;
        non_null("dueDate", &req.due_date)?;
        non_null("issuedDate", &req.issued_date)?;
        let patch = UpdateInvoiceRequest {
            amount: amount_patch("amount", &req.amount)?,
            payment_method: text_patch(&req.payment_method),
            notes: text_patch(&req.notes),
            ..req
        };
        found("Invoice", self.invoices.update(id, &patch).await?)
    }

    pub async fn delete_invoice(&self, id: i64) -> DentalResult<()> {
        removed("Invoice", self.invoices.delete(id).await?)
    }

    pub async fn list_claims(&self, filter: &ClaimFilter) -> DentalResult<Vec<InsuranceClaim>> {
        self.claims.list(filter).await
    }

    pub async fn get_claim(&self, id: i64) -> DentalResult<InsuranceClaim> {
        found("Insurance claim", self.claims.get(id).await?)
    }

    pub async fn create_claim(&self, req: CreateClaimRequest) -> DentalResult<InsuranceClaim> {
        let new = NewClaim {
            patient_id: req.patient_id,
            treatment_id: req.treatment_id,
            claim_amount: amount("claimAmount", req.claim_amount)?,
            status: req.status.unwrap_or_default(),
            submission_date: req.submission_date.unwrap_or_else(clock::today),
            approval_date: req.approval_date,
            notes: optional_text(req.notes),
        };
        let claim = self.claims.create(&new).await?;
        tracing::info!(claim_id = claim.id, patient_id = claim.patient_id, "submitted claim");
        Ok(claim)
    }

    pub async fn update_claim(
        &self,
        id: i64,
        req: UpdateClaimRequest,
    ) -> DentalResult<InsuranceClaim> {
        non_null("patientId", &req.patient_id)?;
        non_null("status", &req.status)?;
        non_null("submissionDate", &req.submission_date)?;
        let patch = UpdateClaimRequest {
            claim_amount: amount_patch("claimAmount", &req.claim_amount)?,
            notes: text_patch(&req.notes),
            ..req
        };
        found("Insurance claim", self.claims.update(id, &patch).await?)
    }

    pub async fn delete_claim(&self, id: i64) -> DentalResult<()> {
        removed("Insurance claim", self.claims.delete(id).await?)
    }

    /// Revenue covers paid invoices issued in the current calendar month.
    pub async fn stats(&self) -> DentalResult<BillingStats> {
        let (from, until) = clock::month_bounds(clock::today());
        let totals = self.invoices.totals(from, until).await?;
        let insurance_claims = self.claims.submitted_total().await?;
        Ok(BillingStats {
            monthly_revenue: totals.revenue,
            pending_payments: totals.pending,
            insurance_claims,
            collections: totals.collected,
        })
    }
}

impl std::fmt::Debug for BillingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingService").finish_non_exhaustive()
    }
}
