//! # API REST
//!
//! REST API implementation for the dental practice backend.
//!
//! Handles:
//! - HTTP endpoints with axum, one handler module per area
//! - Bearer authentication and role guards ([`middleware`])
//! - Mapping of core errors onto statuses and JSON bodies ([`error`])
//! - OpenAPI/Swagger documentation ([`docs`])
//! - Serving with a bounded graceful shutdown ([`server`])
//!
//! Business rules live in `dental-core`; this crate only speaks HTTP.

#![warn(rust_2018_idioms)]

pub mod docs;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use server::serve;
pub use state::AppState;

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::Router;
use dental_core::constants::MAX_ANALYSIS_IMAGE_BYTES;
use dental_types::Role;
use handlers::{
    analysis, appointments, auth, billing, dashboard, health, patient_treatments, patients,
    treatments,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Room for the multipart framing around the largest accepted image.
const UPLOAD_BODY_LIMIT: usize = MAX_ANALYSIS_IMAGE_BYTES + 64 * 1024;

/// Builds the complete application router.
///
/// Public routes: `/health` and the sign-in/registration endpoints. Everything under
/// `/api` besides those requires a bearer token. Treatment catalog writes additionally
/// require the dentist role. `/api/tooth-analysis` only exists when `state` carries an
/// analysis client.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/google", post(auth::google_login))
        .route("/api/auth/google/register", post(auth::google_register));

    let catalog_writes = Router::new()
        .route("/api/treatments", post(treatments::create_treatment))
        .route(
            "/api/treatments/:id",
            put(treatments::update_treatment).delete(treatments::delete_treatment),
        )
        .route_layer(from_fn_with_state(Role::Dentist, middleware::require_role));

    let mut protected = Router::new()
        .route(
            "/api/auth/user",
            get(auth::current_user).put(auth::update_profile),
        )
        .route("/api/auth/password", put(auth::change_password))
        .route("/api/dashboard/stats", get(dashboard::dashboard_stats))
        .route(
            "/api/patients",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route("/api/patients/stats", get(patients::patient_stats))
        .route(
            "/api/patients/:id",
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route(
            "/api/patients/:id/treatments",
            get(patients::patient_treatments),
        )
        .route(
            "/api/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/api/appointments/today",
            get(appointments::today_appointments),
        )
        .route(
            "/api/appointments/:id",
            get(appointments::get_appointment)
                .put(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
        .route("/api/treatments", get(treatments::list_treatments))
        .route("/api/treatments/queue", get(treatments::treatment_queue))
        .route("/api/treatments/:id", get(treatments::get_treatment))
        .merge(catalog_writes)
        .route(
            "/api/patient-treatments",
            get(patient_treatments::list_assignments)
                .post(patient_treatments::create_assignment),
        )
        .route(
            "/api/patient-treatments/:id",
            get(patient_treatments::get_assignment)
                .put(patient_treatments::update_assignment)
                .delete(patient_treatments::delete_assignment),
        )
        .route("/api/billing/stats", get(billing::billing_stats))
        .route(
            "/api/billing/invoices",
            get(billing::list_invoices).post(billing::create_invoice),
        )
        .route(
            "/api/billing/invoices/:id",
            get(billing::get_invoice)
                .put(billing::update_invoice)
                .delete(billing::delete_invoice),
        )
        .route(
            "/api/billing/claims",
            get(billing::list_claims).post(billing::create_claim),
        )
        .route(
            "/api/billing/claims/:id",
            get(billing::get_claim)
                .put(billing::update_claim)
                .delete(billing::delete_claim),
        );

    if state.analysis.is_some() {
        protected = protected.route(
            "/api/tooth-analysis",
            post(analysis::analyze_tooth).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        );
    }

    let protected =
        protected.route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id
    )
}
