mod common;

use axum::http::StatusCode;
use common::app;
use serde_json::json;

#[tokio::test]
async fn test_catalog_writes_need_dentist_role() {
    let app = app();
    let (staff, _) = app.register("front@example.com", "staff").await;
    let (dentist, _) = app.register("doc@example.com", "dentist").await;
    let (admin, _) = app.register("boss@example.com", "admin").await;

    let (status, body) = app
        .post(
            "/api/treatments",
            &staff,
            json!({"name": "Filling", "cost": 90.0, "duration": 30}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    let filling = app.create_treatment(&dentist, "Filling").await;
    app.create_treatment(&admin, "Bleaching").await;

    // Reads stay open to every signed-in role.
    let (status, catalog) = app.get("/api/treatments", &staff).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = catalog
        .as_array()
        .expect("list")
        .iter()
        .map(|t| t["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, ["Bleaching", "Filling"]);

    let (status, _) = app
        .put(&format!("/api/treatments/{filling}"), &staff, json!({"cost": 10.0}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&format!("/api/treatments/{filling}"), &staff).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = app
        .put(&format!("/api/treatments/{filling}"), &dentist, json!({"cost": 0}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["cost"], 0.0);
    assert_eq!(updated["duration"], 45);
}

#[tokio::test]
async fn test_catalog_validation() {
    let app = app();
    let (dentist, _) = app.register("doc@example.com", "dentist").await;

    let (status, _) = app
        .post(
            "/api/treatments",
            &dentist,
            json!({"name": "Scaling", "cost": -1.0, "duration": 30}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/treatments",
            &dentist,
            json!({"name": "Scaling", "cost": 50.0, "duration": 0}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/treatments",
            &dentist,
            json!({"name": "  ", "cost": 50.0, "duration": 20}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_queue_ranks_urgent_high_normal_low() {
    let app = app();
    let (token, _) = app.register("doc@example.com", "dentist").await;
    let patient_id = app.create_patient(&token, "Molar").await;
    let treatment_id = app.create_treatment(&token, "Scaling").await;

    for priority in ["low", "normal", "high", "urgent"] {
        let (status, body) = app
            .post(
                "/api/patient-treatments",
                &token,
                json!({
                    "patientId": patient_id,
                    "treatmentId": treatment_id,
                    "priority": priority,
                    "startDate": "2030-02-01"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, queue) = app.get("/api/treatments/queue", &token).await;
    assert_eq!(status, StatusCode::OK);
    let priorities: Vec<&str> = queue
        .as_array()
        .expect("list")
        .iter()
        .map(|pt| pt["priority"].as_str().expect("priority"))
        .collect();
    assert_eq!(priorities, ["urgent", "high", "normal", "low"]);
}

#[tokio::test]
async fn test_queue_orders_by_priority_then_start_date() {
    let app = app();
    let (token, dentist_id) = app.register("doc@example.com", "dentist").await;
    let patient_id = app.create_patient(&token, "Cusp").await;
    let treatment_id = app.create_treatment(&token, "Root canal").await;

    let mut ids = Vec::new();
    for (priority, start) in [
        ("low", "2030-01-01"),
        ("urgent", "2030-01-09"),
        ("normal", "2030-01-01"),
        ("urgent", "2030-01-02"),
    ] {
        let (status, body) = app
            .post(
                "/api/patient-treatments",
                &token,
                json!({
                    "patientId": patient_id,
                    "treatmentId": treatment_id,
                    "priority": priority,
                    "startDate": start
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["dentistId"], dentist_id);
        assert_eq!(body["status"], "pending");
        ids.push(body["id"].as_i64().expect("id"));
    }

    let (status, _) = app
        .put(
            &format!("/api/patient-treatments/{}", ids[2]),
            &token,
            json!({"status": "completed", "completionDate": "2030-01-05"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, queue) = app.get("/api/treatments/queue", &token).await;
    assert_eq!(status, StatusCode::OK);
    let order: Vec<i64> = queue
        .as_array()
        .expect("list")
        .iter()
        .map(|pt| pt["id"].as_i64().expect("id"))
        .collect();
    assert_eq!(order, [ids[3], ids[1], ids[0]]);
    assert_eq!(queue[0]["treatmentName"], "Root canal");

    let (_, mine) = app
        .get(&format!("/api/treatments/queue?dentistId={dentist_id}"), &token)
        .await;
    assert_eq!(mine.as_array().expect("list").len(), 3);

    let (_, by_patient) = app
        .get(&format!("/api/patients/{patient_id}/treatments"), &token)
        .await;
    assert_eq!(by_patient.as_array().expect("list").len(), 4);
}

#[tokio::test]
async fn test_assignment_references_and_restrict() {
    let app = app();
    let (token, _) = app.register("doc@example.com", "dentist").await;
    let patient_id = app.create_patient(&token, "Fissure").await;
    let treatment_id = app.create_treatment(&token, "Sealant").await;

    let (status, _) = app
        .post(
            "/api/patient-treatments",
            &token,
            json!({"patientId": 4040, "treatmentId": treatment_id, "startDate": "2030-02-01"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, unowned) = app
        .post(
            "/api/patient-treatments",
            &token,
            json!({
                "patientId": patient_id,
                "treatmentId": treatment_id,
                "dentistId": null,
                "startDate": "2030-02-01"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(unowned["dentistId"].is_null());

    let (status, _) = app.delete(&format!("/api/treatments/{treatment_id}"), &token).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let id = unowned["id"].as_i64().expect("id");
    let (status, body) = app
        .delete(&format!("/api/patient-treatments/{id}"), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Patient treatment deleted successfully");

    let (status, _) = app.delete(&format!("/api/treatments/{treatment_id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
}
