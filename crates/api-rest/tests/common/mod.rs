#![allow(dead_code)]

use api_rest::{router, AppState};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use dental_core::analysis::ToothAnalysisClient;
use dental_core::services::AuthService;
use dental_core::{AuthConfig, Datastore, Services};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Router over a fresh in-memory datastore.
#[derive(Clone)]
pub struct TestApp {
    pub router: Router,
}

fn services() -> Services {
    let store = Datastore::in_memory();
    let config = AuthConfig {
        bcrypt_cost: 4,
        google_tokeninfo_url: None,
        ..AuthConfig::default()
    };
    let auth = AuthService::from_config(&store, &config).expect("auth service should build");
    Services::new(&store, auth)
}

pub fn app() -> TestApp {
    TestApp {
        router: router(AppState::new(services())),
    }
}

pub fn app_with_analysis(base_url: &str) -> TestApp {
    let client = ToothAnalysisClient::new(base_url).expect("analysis client should build");
    TestApp {
        router: router(AppState::new(services()).with_analysis(client)),
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router should not fail");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should be readable")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body should be JSON")
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Registers an account and returns its token and id.
    pub async fn register(&self, email: &str, role: &str) -> (String, i64) {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": "secret123",
                    "firstName": "Dana",
                    "lastName": "Smile",
                    "role": role
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let token = body["token"].as_str().expect("token").to_owned();
        let id = body["user"]["id"].as_i64().expect("user id");
        (token, id)
    }

    pub async fn create_patient(&self, token: &str, last_name: &str) -> i64 {
        let (status, body) = self
            .post(
                "/api/patients",
                token,
                json!({
                    "firstName": "Pat",
                    "lastName": last_name,
                    "dateOfBirth": "1985-04-12",
                    "phone": "555-0100",
                    "email": format!("{}@example.com", last_name.to_lowercase()),
                    "address": "1 Main Street"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create patient failed: {body}");
        body["id"].as_i64().expect("patient id")
    }

    pub async fn create_treatment(&self, token: &str, name: &str) -> i64 {
        let (status, body) = self
            .post(
                "/api/treatments",
                token,
                json!({"name": name, "cost": 150.0, "duration": 45, "category": "restorative"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create treatment failed: {body}");
        body["id"].as_i64().expect("treatment id")
    }
}
