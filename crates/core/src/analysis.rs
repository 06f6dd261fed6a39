//! Client for the external tooth-image analysis service.
//!
//! The service takes a multipart `image` at `POST {base}/analyze` and answers
//! `{findings: [String], annotatedImageUrl}`. Findings are numbered from 1 on the way back.

use crate::constants::{ANALYSIS_IMAGE_TYPES, MAX_ANALYSIS_IMAGE_BYTES};
use crate::{DentalError, DentalResult};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(60);

/// An uploaded image, already read into memory.
#[derive(Debug, Clone)]
pub struct AnalysisImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl AnalysisImage {
    /// Only PNG and JPEG images up to the upload limit are forwarded.
    pub fn validate(&self) -> DentalResult<()> {
        if !ANALYSIS_IMAGE_TYPES.contains(&self.content_type.as_str()) {
            return Err(DentalError::validation(
                "Only PNG and JPG images are supported",
            ));
        }
        if self.bytes.is_empty() {
            return Err(DentalError::validation("Image file is required"));
        }
        if self.bytes.len() > MAX_ANALYSIS_IMAGE_BYTES {
            return Err(DentalError::Validation(format!(
                "Image must be at most {} MiB",
                MAX_ANALYSIS_IMAGE_BYTES / (1024 * 1024)
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ToothFinding {
    /// 1-based position in the service's answer.
    pub id: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToothAnalysis {
    pub patient_id: String,
    pub findings: Vec<ToothFinding>,
    pub annotated_image_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceAnswer {
    #[serde(default)]
    findings: Vec<String>,
    #[serde(default)]
    annotated_image_url: String,
}

#[derive(Debug, Clone)]
pub struct ToothAnalysisClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ToothAnalysisClient {
    pub fn new(base_url: &str) -> DentalResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(ANALYSIS_TIMEOUT)
            .build()
            .map_err(|err| DentalError::Config(format!("analysis client: {err}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/analyze", base_url.trim_end_matches('/')),
        })
    }

    /// Forwards the image and translates the answer.
    ///
    /// # Errors
    ///
    /// [`DentalError::Validation`] for an unacceptable image, [`DentalError::Downstream`] when
    /// the service cannot be reached, answers with a non-success status, or sends an
    /// unreadable body.
    pub async fn analyze(
        &self,
        patient_id: i64,
        image: AnalysisImage,
    ) -> DentalResult<ToothAnalysis> {
        image.validate()?;

        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|err| DentalError::validation(format!("invalid image type: {err}")))?;
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|err| DentalError::Downstream(format!("analysis service unreachable: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DentalError::Downstream(format!(
                "analysis service answered {status}: {body}"
            )));
        }

        let answer: ServiceAnswer = response.json().await.map_err(|err| {
            DentalError::Downstream(format!("analysis service sent an unreadable body: {err}"))
        })?;

        Ok(ToothAnalysis {
            patient_id: patient_id.to_string(),
            findings: answer
                .findings
                .into_iter()
                .zip(1..)
                .map(|(description, id)| ToothFinding { id, description })
                .collect(),
            annotated_image_url: answer.annotated_image_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("should have address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake service should run");
        });
        format!("http://{addr}")
    }

    fn png() -> AnalysisImage {
        AnalysisImage {
            file_name: "tooth.png".into(),
            content_type: "image/png".into(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[tokio::test]
    async fn test_findings_are_numbered_from_one() {
        let app = Router::new().route(
            "/analyze",
            post(|body: Bytes| async move {
                assert!(String::from_utf8_lossy(&body).contains("name=\"image\""));
                Json(serde_json::json!({
                    "findings": ["Cavity on molar", "Plaque build-up"],
                    "annotatedImageUrl": "http://ml/annotated.png"
                }))
            }),
        );
        let client = ToothAnalysisClient::new(&spawn(app).await).expect("client");

        let analysis = client.analyze(7, png()).await.expect("analysis");
        assert_eq!(analysis.patient_id, "7");
        assert_eq!(analysis.findings.len(), 2);
        assert_eq!(analysis.findings[0].id, 1);
        assert_eq!(analysis.findings[1].description, "Plaque build-up");
        assert_eq!(analysis.annotated_image_url, "http://ml/annotated.png");
    }

    #[tokio::test]
    async fn test_service_failure_is_downstream() {
        let app = Router::new().route(
            "/analyze",
            post(|| async { (StatusCode::BAD_GATEWAY, "model offline") }),
        );
        let client = ToothAnalysisClient::new(&spawn(app).await).expect("client");

        let err = client.analyze(7, png()).await.expect_err("must fail");
        assert!(matches!(err, DentalError::Downstream(_)));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn test_unsupported_type_is_rejected_before_sending() {
        let client = ToothAnalysisClient::new("http://127.0.0.1:9").expect("client");
        let mut gif = png();
        gif.content_type = "image/gif".into();
        let err = client.analyze(7, gif).await.expect_err("must fail");
        assert!(matches!(err, DentalError::Validation(_)));
    }

    #[test]
    fn test_oversized_image_is_rejected() {
        let mut big = png();
        big.bytes = vec![0; MAX_ANALYSIS_IMAGE_BYTES + 1];
        assert!(big.validate().is_err());
    }
}
