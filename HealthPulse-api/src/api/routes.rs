use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use crate::api::handlers::{
    classify, create_medication_event, create_mood, create_reading, create_reminder, get_health_score, health_check,
    list_notifications, list_readings, list_reminders, mark_taken, reading_chart, request_permission,
};
use crate::context::AppContext;
use crate::openapi::configure_swagger_routes;

/// Create the application router
pub fn create_app(context: Arc<AppContext>) -> Router {
    debug!("Creating application router");

    let api_routes = Router::new()
        .route("/classify", post(classify))
        // Define specific routes before parametrized routes to avoid conflicts
        .route("/readings/chart", get(reading_chart))
        .route("/readings", get(list_readings).post(create_reading))
        .route("/moods", post(create_mood))
        .route("/medication-events", post(create_medication_event))
        .route("/health-score", get(get_health_score))
        .route("/reminders", get(list_reminders).post(create_reminder))
        .route("/reminders/:id/taken", post(mark_taken))
        .route("/notifications", get(list_notifications))
        .route("/notifications/permission", post(request_permission));

    debug!("API routes configured");

    let app = Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes)
        .with_state(context);

    let app = add_swagger_ui(app);
    debug!("Swagger UI merged");

    app.layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive())
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    app.merge(configure_swagger_routes())
}
