use super::{created, deleted};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;
use api_shared::ErrorBody;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use dental_core::models::{
    BillingStats, ClaimFilter, CreateClaimRequest, CreateInvoiceRequest, InsuranceClaim,
    Invoice, InvoiceFilter, MessageResponse, UpdateClaimRequest, UpdateInvoiceRequest,
};

#[utoipa::path(
    get,
    path = "/api/billing/stats",
    tag = "billing",
    security(("bearer" = [])),
    responses((status = 200, description = "Money totals", body = BillingStats))
)]
/// Revenue this month, outstanding payments, undecided claims and all collections
pub async fn billing_stats(State(state): State<AppState>) -> ApiResult<Json<BillingStats>> {
    Ok(Json(state.services.billing.stats().await?))
}

// ============================================================================
// INVOICES
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/billing/invoices",
    tag = "billing",
    security(("bearer" = [])),
    params(InvoiceFilter),
    responses((status = 200, description = "Invoices, newest first", body = [Invoice]))
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<InvoiceFilter>,
) -> ApiResult<Json<Vec<Invoice>>> {
    Ok(Json(state.services.billing.list_invoices(&filter).await?))
}

#[utoipa::path(
    post,
    path = "/api/billing/invoices",
    tag = "billing",
    security(("bearer" = [])),
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice issued", body = Invoice),
        (status = 400, description = "Negative amount or unknown patient", body = ErrorBody)
    )
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateInvoiceRequest>,
) -> ApiResult<(StatusCode, Json<Invoice>)> {
    Ok(created(state.services.billing.create_invoice(req).await?))
}

#[utoipa::path(
    get,
    path = "/api/billing/invoices/{id}",
    tag = "billing",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "The invoice", body = Invoice),
        (status = 404, description = "Invoice not found", body = ErrorBody)
    )
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Invoice>> {
    Ok(Json(state.services.billing.get_invoice(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/billing/invoices/{id}",
    tag = "billing",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Invoice id")),
    request_body = UpdateInvoiceRequest,
    responses(
        (status = 200, description = "Updated invoice", body = Invoice),
        (status = 400, description = "Invalid invoice data", body = ErrorBody),
        (status = 404, description = "Invoice not found", body = ErrorBody)
    )
)]
pub async fn update_invoice(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateInvoiceRequest>,
) -> ApiResult<Json<Invoice>> {
    Ok(Json(state.services.billing.update_invoice(id, req).await?))
}

#[utoipa::path(
    delete,
    path = "/api/billing/invoices/{id}",
    tag = "billing",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice deleted", body = MessageResponse),
        (status = 404, description = "Invoice not found", body = ErrorBody)
    )
)]
pub async fn delete_invoice(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.billing.delete_invoice(id).await?;
    Ok(deleted("Invoice"))
}

// ============================================================================
// INSURANCE CLAIMS
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/billing/claims",
    tag = "billing",
    security(("bearer" = [])),
    params(ClaimFilter),
    responses((status = 200, description = "Insurance claims, newest first", body = [InsuranceClaim]))
)]
pub async fn list_claims(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ClaimFilter>,
) -> ApiResult<Json<Vec<InsuranceClaim>>> {
    Ok(Json(state.services.billing.list_claims(&filter).await?))
}

#[utoipa::path(
    post,
    path = "/api/billing/claims",
    tag = "billing",
    security(("bearer" = [])),
    request_body = CreateClaimRequest,
    responses(
        (status = 201, description = "Claim submitted", body = InsuranceClaim),
        (status = 400, description = "Negative amount or unknown reference", body = ErrorBody)
    )
)]
pub async fn create_claim(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateClaimRequest>,
) -> ApiResult<(StatusCode, Json<InsuranceClaim>)> {
    Ok(created(state.services.billing.create_claim(req).await?))
}

#[utoipa::path(
    get,
    path = "/api/billing/claims/{id}",
    tag = "billing",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Claim id")),
    responses(
        (status = 200, description = "The claim", body = InsuranceClaim),
        (status = 404, description = "Insurance claim not found", body = ErrorBody)
    )
)]
pub async fn get_claim(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<InsuranceClaim>> {
    Ok(Json(state.services.billing.get_claim(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/billing/claims/{id}",
    tag = "billing",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Claim id")),
    request_body = UpdateClaimRequest,
    responses(
        (status = 200, description = "Updated claim", body = InsuranceClaim),
        (status = 400, description = "Invalid claim data", body = ErrorBody),
        (status = 404, description = "Insurance claim not found", body = ErrorBody)
    )
)]
pub async fn update_claim(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateClaimRequest>,
) -> ApiResult<Json<InsuranceClaim>> {
    Ok(Json(state.services.billing.update_claim(id, req).await?))
}

#[utoipa::path(
    delete,
    path = "/api/billing/claims/{id}",
    tag = "billing",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "Claim id")),
    responses(
        (status = 200, description = "Claim deleted", body = MessageResponse),
        (status = 404, description = "Insurance claim not found", body = ErrorBody)
    )
)]
pub async fn delete_claim(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.services.billing.delete_claim(id).await?;
    Ok(deleted("Insurance claim"))
}
