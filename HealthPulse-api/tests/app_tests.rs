use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use health_pulse_api::config::{AppConfig, StorageBackend};
use health_pulse_api::context::AppContext;
use health_pulse_api::create_application;
use health_pulse_data::database::DatabaseConfig;
use health_pulse_domain::entities::{Frequency, Medication};

/// SQLite file removed when the test ends
struct TempDatabase(PathBuf);

impl TempDatabase {
    fn new(name: &str) -> Self {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        Self(std::env::temp_dir().join(format!("health_pulse_{}_{}_{}.db", name, std::process::id(), nanos)))
    }

    fn config(&self) -> AppConfig {
        AppConfig {
            storage: StorageBackend::Sqlite,
            database: DatabaseConfig {
                sqlite_path: Some(self.0.to_string_lossy().to_string()),
                max_connections: 2,
                timeout_seconds: 5,
            },
            ..AppConfig::default()
        }
    }
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

async fn request(app: &axum::Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
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
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_reminders_survive_restart_with_sqlite() {
    let db = TempDatabase::new("reminders");

    let first = AppContext::from_config(&db.config()).unwrap();
    let added = first
        .scheduler
        .lock()
        .await
        .add_reminder(Medication {
            name: "Metformin".to_string(),
            dosage: "500mg".to_string(),
            frequency: Frequency::TwiceDaily,
            time: "08:00,20:00".to_string(),
        })
        .unwrap();
    drop(first);

    let second = AppContext::from_config(&db.config()).unwrap();
    let scheduler = second.scheduler.lock().await;
    assert_eq!(scheduler.reminders(), &[added.clone()]);
    assert_eq!(scheduler.next_timer_deadline(), Some(added.next_dose));
}

#[tokio::test]
async fn test_readings_and_score_over_sqlite() {
    let db = TempDatabase::new("records");
    let context = Arc::new(AppContext::from_config(&db.config()).unwrap());
    let app = create_application(context);

    for (systolic, diastolic, timestamp) in [
        (118, 76, "2024-05-07T07:00:00Z"),
        (142, 91, "2024-05-07T19:00:00Z"),
    ] {
        let (status, body) = request(
            &app,
            Method::POST,
            "/api/v1/readings",
            Some(json!({"ownerId": "carol", "systolic": systolic, "diastolic": diastolic, "timestamp": timestamp})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["persistedId"].is_string());
    }

    let (status, body) = request(
        &app,
        Method::GET,
        "/api/v1/health-score?owner_id=carol&date=2024-05-07&window_days=1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["components"]["bloodPressure"], 50);
    assert_eq!(body["samples"]["readings"], 2);
    assert_eq!(body["overall"], 17);

    let (status, body) = request(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["components"]["reminderStorage"]["status"], "ok");
}
