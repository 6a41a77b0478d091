use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower::ServiceExt;

use health_pulse_domain::services::{ManualClock, Permission};

use crate::api::create_app;
use crate::context::AppContext;

fn test_app() -> (Router, Arc<AppContext>) {
    let context = Arc::new(AppContext::in_memory(Permission::Granted));
    (create_app(context.clone()), context)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["documentStore"]["status"], "ok");
}

#[tokio::test]
async fn test_classify_endpoint() {
    let (app, _) = test_app();

    let (status, body) = send(&app, "POST", "/api/v1/classify", Some(json!({"systolic": 185, "diastolic": 95}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Hypertensive Crisis");
    assert_eq!(body["severity"], "critical");
    assert!(!body["recommendation"].as_str().unwrap().is_empty());

    let (status, body) = send(&app, "POST", "/api/v1/classify", Some(json!({"systolic": -5, "diastolic": 80}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_record_and_list_readings() {
    let (app, _) = test_app();

    for (systolic, diastolic, timestamp) in [
        (130, 80, "2024-05-05T08:00:00Z"),
        (145, 85, "2024-05-06T08:00:00Z"),
        (160, 90, "2024-05-07T08:00:00Z"),
    ] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/readings",
            Some(json!({
                "ownerId": "alice",
                "systolic": systolic,
                "diastolic": diastolic,
                "pulse": 72,
                "timestamp": timestamp,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["persistedId"].is_string());
    }

    let (status, body) = send(&app, "GET", "/api/v1/readings?owner_id=alice&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    let readings = body.as_array().unwrap();
    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0]["systolic"], 160);

    let (status, body) = send(&app, "GET", "/api/v1/readings/chart?owner_id=alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["systolic"], json!([130, 145, 160]));
}

#[tokio::test]
async fn test_reading_outcome_includes_insights() {
    let (app, _) = test_app();
    send(
        &app,
        "POST",
        "/api/v1/readings",
        Some(json!({"ownerId": "bob", "systolic": 130, "diastolic": 80, "timestamp": "2024-05-06T08:00:00Z"})),
    )
    .await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/v1/readings",
        Some(json!({"ownerId": "bob", "systolic": 160, "diastolic": 85, "timestamp": "2024-05-07T08:00:00Z"})),
    )
    .await;

    assert_eq!(body["analysis"]["status"], "Stage 2 Hypertension");
    assert_eq!(body["analysis"]["insights"][0]["kind"], "significant_change");
    assert_eq!(body["analysis"]["insights"][0]["severity"], "high");
}

#[tokio::test]
async fn test_invalid_reading_is_rejected() {
    let (app, _) = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/readings",
        Some(json!({"ownerId": "alice", "systolic": 500, "diastolic": 80})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_health_score_endpoint() {
    let (app, _) = test_app();
    send(
        &app,
        "POST",
        "/api/v1/moods",
        Some(json!({"ownerId": "alice", "mood": "Great", "timestamp": "2024-05-07T09:00:00Z"})),
    )
    .await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/medication-events",
        Some(json!({
            "ownerId": "alice",
            "medication": "Lisinopril",
            "status": "TAKEN",
            "timestamp": "2024-05-07T09:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", "/api/v1/health-score?owner_id=alice&date=2024-05-07&window_days=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["components"]["mood"], 100);
    assert_eq!(body["components"]["medication"], 100);
    assert_eq!(body["components"]["bloodPressure"], 0);
    assert_eq!(body["samples"]["readings"], 0);
    assert_eq!(body["overall"], 67);
}

#[tokio::test]
async fn test_reminder_lifecycle() {
    let start = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap().and_hms_opt(14, 0, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let context = Arc::new(AppContext::with_clock(Permission::Granted, clock.clone()));
    let app = create_app(context.clone());

    let (status, reminder) = send(
        &app,
        "POST",
        "/api/v1/reminders",
        Some(json!({"name": "Aspirin", "dosage": "81mg", "frequency": "weekly", "time": "1,3,5"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reminder["nextDose"], "2024-05-08T09:00:00");
    assert_eq!(reminder["state"], "scheduled");

    let id = reminder["id"].as_str().unwrap().to_string();

    // Due on Wednesday morning
    clock.set(NaiveDate::from_ymd_opt(2024, 5, 8).unwrap().and_hms_opt(9, 0, 0).unwrap());
    assert_eq!(context.scheduler.lock().await.sweep(), 1);

    let (_, notifications) = send(&app, "GET", "/api/v1/notifications", None).await;
    assert_eq!(notifications.as_array().unwrap().len(), 1);
    assert_eq!(notifications[0]["options"]["reminderId"], id.as_str());

    let (status, taken) = send(&app, "POST", &format!("/api/v1/reminders/{}/taken", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(taken["nextDose"], "2024-05-10T09:00:00");
    assert_eq!(taken["lastTaken"], "2024-05-08T09:00:00");

    let (_, list) = send(&app, "GET", "/api/v1/reminders", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_reminder_is_not_found() {
    let (app, _) = test_app();
    let (status, body) = send(&app, "POST", "/api/v1/reminders/404/taken", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_invalid_reminder_is_rejected() {
    let (app, _) = test_app();
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/reminders",
        Some(json!({"name": "", "dosage": "10mg", "frequency": "daily", "time": "08:00"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_permission_request() {
    let context = Arc::new(AppContext::in_memory(Permission::Default));
    let app = create_app(context);

    let (status, body) = send(&app, "POST", "/api/v1/notifications/permission", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["permission"], "granted");
}
