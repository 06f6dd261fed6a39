mod common;

use axum::http::StatusCode;
use chrono::{Duration, Local, NaiveDate};
use common::app;
use serde_json::{json, Value};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn booking(patient_id: i64, date: NaiveDate, start: &str, end: &str) -> Value {
    json!({
        "patientId": patient_id,
        "appointmentDate": date.to_string(),
        "startTime": start,
        "endTime": end,
        "notes": "check-up"
    })
}

#[tokio::test]
async fn test_today_excludes_tomorrow_and_date_filter_includes_it() {
    let app = app();
    let (token, dentist_id) = app.register("doc@example.com", "dentist").await;
    let patient_id = app.create_patient(&token, "Bicuspid").await;
    let tomorrow = today() + Duration::days(1);

    let (status, created) = app
        .post(
            "/api/appointments",
            &token,
            booking(patient_id, tomorrow, "09:00", "09:45"),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["dentistId"], dentist_id);
    assert_eq!(created["status"], "scheduled");
    assert_eq!(created["startTime"], "09:00:00");
    assert_eq!(created["patientName"], "Pat Bicuspid");

    let (status, todays) = app.get("/api/appointments/today", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(todays.as_array().expect("list").is_empty());

    let (status, on_date) = app
        .get(&format!("/api/appointments?date={tomorrow}"), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    let on_date = on_date.as_array().expect("list");
    assert_eq!(on_date.len(), 1);
    assert_eq!(on_date[0]["id"], created["id"]);

    let (_, dashboard) = app.get("/api/dashboard/stats", &token).await;
    assert_eq!(dashboard["todayAppointments"], 0);
    assert_eq!(dashboard["activePatients"], 1);
}

#[tokio::test]
async fn test_past_booking_is_rejected_and_not_stored() {
    let app = app();
    let (token, _) = app.register("doc@example.com", "dentist").await;
    let patient_id = app.create_patient(&token, "Wisdom").await;
    let yesterday = today() - Duration::days(1);

    let (status, body) = app
        .post(
            "/api/appointments",
            &token,
            booking(patient_id, yesterday, "09:00", "10:00"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "appointmentDate cannot be in the past");

    let (_, all) = app.get("/api/appointments", &token).await;
    assert!(all.as_array().expect("list").is_empty());
}

#[tokio::test]
async fn test_times_must_be_ordered() {
    let app = app();
    let (token, _) = app.register("doc@example.com", "dentist").await;
    let patient_id = app.create_patient(&token, "Root").await;

    let (status, _) = app
        .post(
            "/api/appointments",
            &token,
            booking(patient_id, today(), "11:00", "10:00"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/appointments",
            &token,
            booking(patient_id, today(), "25:00", "26:00"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_today_is_sorted_and_updates_are_partial() {
    let app = app();
    let (token, _) = app.register("doc@example.com", "dentist").await;
    let patient_id = app.create_patient(&token, "Crown").await;

    let (_, late) = app
        .post("/api/appointments", &token, booking(patient_id, today(), "15:00", "15:30"))
        .await;
    app.post("/api/appointments", &token, booking(patient_id, today(), "08:00", "08:30"))
        .await;

    let (_, todays) = app.get("/api/appointments/today", &token).await;
    let starts: Vec<&str> = todays
        .as_array()
        .expect("list")
        .iter()
        .map(|a| a["startTime"].as_str().expect("start time"))
        .collect();
    assert_eq!(starts, ["08:00:00", "15:00:00"]);

    let id = late["id"].as_i64().expect("id");
    let (status, updated) = app
        .put(
            &format!("/api/appointments/{id}"),
            &token,
            json!({"status": "completed"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["startTime"], "15:00:00");
    assert_eq!(updated["notes"], "check-up");
}

#[tokio::test]
async fn test_appointments_are_private_to_their_dentist() {
    let app = app();
    let (owner, _) = app.register("one@example.com", "dentist").await;
    let (other, _) = app.register("two@example.com", "dentist").await;
    let patient_id = app.create_patient(&owner, "Gum").await;

    let (_, created) = app
        .post("/api/appointments", &owner, booking(patient_id, today(), "10:00", "11:00"))
        .await;
    let id = created["id"].as_i64().expect("id");

    let (status, _) = app.get(&format!("/api/appointments/{id}"), &other).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .put(&format!("/api/appointments/{id}"), &other, json!({"notes": "mine"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, listed) = app.get("/api/appointments", &other).await;
    assert!(listed.as_array().expect("list").is_empty());

    let (status, body) = app.delete(&format!("/api/appointments/{id}"), &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Appointment deleted successfully");
}
