mod common;

use axum::body::{Body, Bytes};
use axum::http::{header, Method, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use common::{app, app_with_analysis, TestApp};

const BOUNDARY: &str = "dental-test-boundary";

async fn fake_service(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = listener.local_addr().expect("should have address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake service should run");
    });
    format!("http://{addr}")
}

fn multipart(patient_id: Option<&str>, image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(id) = patient_id {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"patientId\"\r\n\r\n{id}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"tooth\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(app: &TestApp, token: &str, body: Vec<u8>) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/tooth-analysis")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request should build");
    app.send(request).await
}

#[tokio::test]
async fn test_findings_are_translated() {
    let service = fake_service(Router::new().route(
        "/analyze",
        post(|body: Bytes| async move {
            assert!(String::from_utf8_lossy(&body).contains("name=\"image\""));
            Json(serde_json::json!({
                "findings": ["Caries on 36", "Calculus on lower incisors"],
                "annotatedImageUrl": "http://ml/out/1.png"
            }))
        }),
    ))
    .await;
    let app = app_with_analysis(&service);
    let (token, _) = app.register("doc@example.com", "dentist").await;

    let (status, body) = upload(
        &app,
        &token,
        multipart(Some("12"), Some(("image/png", b"\x89PNG fake"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["patientId"], "12");
    assert_eq!(body["findings"][0]["id"], 1);
    assert_eq!(body["findings"][1]["id"], 2);
    assert_eq!(body["findings"][1]["description"], "Calculus on lower incisors");
    assert_eq!(body["annotatedImageUrl"], "http://ml/out/1.png");
}

#[tokio::test]
async fn test_bad_uploads_are_rejected() {
    let app = app_with_analysis("http://127.0.0.1:9");
    let (token, _) = app.register("doc@example.com", "dentist").await;

    let (status, body) = upload(
        &app,
        &token,
        multipart(Some("12"), Some(("image/gif", b"GIF89a"))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Only PNG and JPG images are supported");

    let (status, body) = upload(&app, &token, multipart(Some("12"), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Image file is required");

    let (status, body) = upload(
        &app,
        &token,
        multipart(Some("twelve"), Some(("image/png", b"png"))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid patient ID");
}

#[tokio::test]
async fn test_downstream_failure_is_a_generic_server_error() {
    let service = fake_service(Router::new().route(
        "/analyze",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model warming up") }),
    ))
    .await;
    let app = app_with_analysis(&service);
    let (token, _) = app.register("doc@example.com", "dentist").await;

    let (status, body) = upload(
        &app,
        &token,
        multipart(Some("3"), Some(("image/jpeg", b"\xff\xd8jpeg"))),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn test_route_is_absent_without_analysis_service() {
    let app = app();
    let (token, _) = app.register("doc@example.com", "dentist").await;
    let (status, _) = upload(
        &app,
        &token,
        multipart(Some("3"), Some(("image/png", b"png"))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
