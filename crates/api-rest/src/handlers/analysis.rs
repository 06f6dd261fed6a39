use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use api_shared::ErrorBody;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use dental_core::analysis::{AnalysisImage, ToothAnalysis};

/// Multipart form accepted by the tooth analysis endpoint. Documentation only.
#[derive(serde::Deserialize, utoipa::ToSchema)]
#[allow(dead_code)]
#[serde(rename_all = "camelCase")]
pub struct ToothAnalysisForm {
    patient_id: i64,
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/api/tooth-analysis",
    tag = "tooth-analysis",
    security(("bearer" = [])),
    request_body(content = ToothAnalysisForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Findings for the uploaded image", body = ToothAnalysis),
        (status = 400, description = "Missing patient id or unsupported image", body = ErrorBody),
        (status = 500, description = "Analysis service failed", body = ErrorBody)
    )
)]
/// Forward a tooth image to the analysis service
///
/// Expects `patientId` and a PNG or JPEG `image` part. Only mounted when an analysis
/// service is configured.
///
/// # Errors
/// Returns `400 Bad Request` for a missing or non-numeric `patientId`, a missing image or an
/// unsupported image type, and `500 Internal Server Error` when the analysis service cannot
/// be reached or fails.
pub async fn analyze_tooth(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ToothAnalysis>> {
    let client = state.analysis.clone().ok_or_else(|| {
        ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Tooth analysis is not configured")
    })?;
    let mut multipart = multipart?;

    let mut patient_id = None;
    let mut image = None;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("patientId") => {
                let raw = field.text().await?;
                let id = raw
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| ApiError::bad_request("Invalid patient ID"))?;
                patient_id = Some(id);
            }
            Some("image") => {
                let file_name = field.file_name().unwrap_or("image").to_owned();
                let content_type = field.content_type().unwrap_or_default().to_owned();
                let bytes = field.bytes().await?;
                image = Some(AnalysisImage {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    let patient_id = patient_id.ok_or_else(|| ApiError::bad_request("Invalid patient ID"))?;
    let image = image.ok_or_else(|| ApiError::bad_request("Image file is required"))?;

    let analysis = client.analyze(patient_id, image).await?;
    tracing::info!(
        patient_id,
        findings = analysis.findings.len(),
        "tooth image analysed"
    );
    Ok(Json(analysis))
}
