use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Blood pressure endpoints
        crate::api::handlers::readings::classify,
        crate::api::handlers::readings::create_reading,
        crate::api::handlers::readings::list_readings,
        crate::api::handlers::readings::reading_chart,

        // Mood, medication and score endpoints
        crate::api::handlers::records::create_mood,
        crate::api::handlers::records::create_medication_event,
        crate::api::handlers::records::get_health_score,

        // Reminder endpoints
        crate::api::handlers::reminders::list_reminders,
        crate::api::handlers::reminders::create_reminder,
        crate::api::handlers::reminders::mark_taken,

        // Notification endpoints
        crate::api::handlers::notifications::list_notifications,
        crate::api::handlers::notifications::request_permission,
    ),
    components(
        schemas(
            // Domain entities
            health_pulse_domain::entities::BloodPressureReading,
            health_pulse_domain::entities::CreateBloodPressureRequest,
            health_pulse_domain::entities::BloodPressureCategory,
            health_pulse_domain::entities::Severity,
            health_pulse_domain::entities::Mood,
            health_pulse_domain::entities::MoodEntry,
            health_pulse_domain::entities::CreateMoodEntryRequest,
            health_pulse_domain::entities::MedicationEvent,
            health_pulse_domain::entities::CreateMedicationEventRequest,
            health_pulse_domain::entities::Medication,
            health_pulse_domain::entities::Reminder,
            health_pulse_domain::entities::ReminderState,
            health_pulse_domain::entities::HealthScore,
            health_pulse_domain::entities::ScoreComponents,
            health_pulse_domain::entities::SampleCounts,
            health_pulse_domain::entities::DailyHealthScore,
            health_pulse_domain::entities::Insight,
            health_pulse_domain::entities::InsightKind,
            health_pulse_domain::entities::Metric,
            health_pulse_domain::entities::BloodPressureAnalysis,
            health_pulse_domain::entities::ChartSeries,
            health_pulse_domain::services::ReadingOutcome,
            health_pulse_domain::services::NotificationOptions,
            health_pulse_domain::services::Permission,

            // API entities
            crate::entities::blood_pressure::ClassifyRequest,
            crate::entities::blood_pressure::ClassificationResponse,
            crate::entities::blood_pressure::HealthScoreQuery,
            crate::entities::common::ErrorResponse,
            crate::entities::common::OwnerQuery,
            crate::notifications::ShownNotification,

            // Handler responses
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentHealthStatus,
            crate::api::handlers::notifications::PermissionResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "blood_pressure", description = "Blood pressure classification and readings"),
        (name = "records", description = "Mood and medication logs and the health score"),
        (name = "reminders", description = "Medication reminders"),
        (name = "notifications", description = "Notifications raised by reminders")
    ),
    info(
        title = "HealthPulse API",
        version = "0.1.0",
        description = "Blood pressure insights, health scores and medication reminders",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "HealthPulse API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().expect("tags are defined");
        assert!(tags.iter().any(|tag| tag.name == "reminders"));
        assert!(tags.iter().any(|tag| tag.name == "blood_pressure"));

        for path in [
            "/health",
            "/api/v1/classify",
            "/api/v1/readings",
            "/api/v1/readings/chart",
            "/api/v1/moods",
            "/api/v1/medication-events",
            "/api/v1/health-score",
            "/api/v1/reminders",
            "/api/v1/reminders/{id}/taken",
            "/api/v1/notifications",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
