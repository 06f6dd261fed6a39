mod common;

use axum::http::{header, Method, Request, StatusCode};
use axum::body::Body;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use common::app;
use serde_json::json;

#[tokio::test]
async fn test_health_is_public() {
    let app = app();
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_register_login_and_current_user() {
    let app = app();
    let (token, id) = app.register("dana@example.com", "dentist").await;

    let (status, me) = app.get("/api/auth/user", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], id);
    assert_eq!(me["role"], "dentist");
    assert!(me.get("passwordHash").is_none());

    let (status, session) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "DANA@example.com", "password": "secret123"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["user"]["email"], "dana@example.com");
    assert!(session["token"].as_str().is_some_and(|t| t.split('.').count() == 3));
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let app = app();
    app.register("dana@example.com", "dentist").await;

    let (wrong_status, wrong_body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "dana@example.com", "password": "nope-nope"})),
        )
        .await;
    let (unknown_status, unknown_body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ghost@example.com", "password": "secret123"})),
        )
        .await;
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_registration_rules() {
    let app = app();
    app.register("dana@example.com", "dentist").await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": "dana@example.com",
                "password": "secret123",
                "firstName": "Other",
                "lastName": "Person",
                "role": "staff"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": "short@example.com",
                "password": "12345",
                "firstName": "Short",
                "lastName": "Password",
                "role": "staff"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("password")));

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "email": "owner@example.com",
                "password": "secret123",
                "firstName": "Own",
                "lastName": "Er",
                "role": "owner"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_missing_and_malformed_authorization() {
    let app = app();

    let (status, body) = app.request(Method::GET, "/api/patients", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authorization header required");

    let request = Request::builder()
        .uri("/api/patients")
        .header(header::AUTHORIZATION, "Basic ZGFuYTpzZWNyZXQ=")
        .body(Body::empty())
        .expect("request should build");
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid authorization header");

    let (status, body) = app.get("/api/patients", "not.a.token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn test_profile_update_and_password_change() {
    let app = app();
    let (token, _) = app.register("dana@example.com", "hygienist").await;

    let (status, user) = app
        .put(
            "/api/auth/user",
            &token,
            json!({"phone": "555-0199", "role": "admin"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["phone"], "555-0199");
    assert_eq!(user["firstName"], "Dana");
    assert_eq!(user["role"], "hygienist");

    let (status, body) = app
        .put(
            "/api/auth/password",
            &token,
            json!({"currentPassword": "wrong-one", "newPassword": "brand-new"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Current password is incorrect");

    let (status, _) = app
        .put(
            "/api/auth/password",
            &token,
            json!({"currentPassword": "secret123", "newPassword": "brand-new"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "dana@example.com", "password": "brand-new"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

fn credential(email: &str) -> String {
    STANDARD.encode(
        json!({"email": email, "name": "Gail Oogle", "id": "google-42"}).to_string(),
    )
}

#[tokio::test]
async fn test_google_login_requires_registration_first() {
    let app = app();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/google",
            None,
            Some(json!({"idToken": credential("gail@example.com")})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["details"]["email"], "gail@example.com");
    assert_eq!(body["details"]["firstName"], "Gail");
    assert_eq!(body["details"]["lastName"], "Oogle");
    assert_eq!(body["details"]["googleId"], "google-42");

    let (status, session) = app
        .request(
            Method::POST,
            "/api/auth/google/register",
            None,
            Some(json!({"idToken": credential("gail@example.com"), "role": "staff"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(session["user"]["role"], "staff");

    let (status, session) = app
        .request(
            Method::POST,
            "/api/auth/google",
            None,
            Some(json!({"credential": credential("gail@example.com")})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["user"]["email"], "gail@example.com");

    // Federated accounts have no password to sign in with.
    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "gail@example.com", "password": "anything"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_google_assertion_is_unauthorized() {
    let app = app();
    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/google",
            None,
            Some(json!({"idToken": "%%% not base64 %%%"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid Google ID token");
}
