use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::instrument;

use health_pulse_domain::entities::{
    CreateMedicationEventRequest, CreateMoodEntryRequest, DailyHealthScore, MedicationEvent, MoodEntry,
};

use crate::context::AppContext;
use crate::entities::blood_pressure::HealthScoreQuery;
use crate::entities::common::ErrorResponse;

const DEFAULT_WINDOW_DAYS: u32 = 7;
const MAX_WINDOW_DAYS: u32 = 365;

/// Log a mood entry
#[utoipa::path(
    post,
    path = "/api/v1/moods",
    request_body = CreateMoodEntryRequest,
    responses(
        (status = 201, description = "Mood logged", body = MoodEntry),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "records"
)]
#[instrument(skip(context, request))]
pub async fn create_mood(
    State(context): State<Arc<AppContext>>,
    Json(request): Json<CreateMoodEntryRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let entry = context.records.record_mood(request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Log a medication event (taken, skipped or missed)
#[utoipa::path(
    post,
    path = "/api/v1/medication-events",
    request_body = CreateMedicationEventRequest,
    responses(
        (status = 201, description = "Event logged", body = MedicationEvent),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "records"
)]
#[instrument(skip(context, request))]
pub async fn create_medication_event(
    State(context): State<Arc<AppContext>>,
    Json(request): Json<CreateMedicationEventRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let event = context.records.record_medication_event(request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Compute (and cache) an owner's health score
#[utoipa::path(
    get,
    path = "/api/v1/health-score",
    params(HealthScoreQuery),
    responses(
        (status = 200, description = "Health score", body = DailyHealthScore),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "records"
)]
#[instrument(skip(context))]
pub async fn get_health_score(
    State(context): State<Arc<AppContext>>,
    Query(query): Query<HealthScoreQuery>,
) -> Result<Json<DailyHealthScore>, ErrorResponse> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let window_days = query.window_days.unwrap_or(DEFAULT_WINDOW_DAYS).clamp(1, MAX_WINDOW_DAYS);

    let score = context.records.health_score(&query.owner_id, date, window_days).await?;
    Ok(Json(score))
}
