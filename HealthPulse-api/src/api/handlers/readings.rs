use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, instrument, warn};

use health_pulse_domain::entities::{BloodPressureReading, ChartSeries, CreateBloodPressureRequest};
use health_pulse_domain::services::{classify_vitals, ReadingOutcome};

use crate::context::AppContext;
use crate::entities::blood_pressure::{ClassificationResponse, ClassifyRequest};
use crate::entities::common::{ErrorResponse, OwnerQuery};

/// Classify a pair of vitals without storing them
#[utoipa::path(
    post,
    path = "/api/v1/classify",
    request_body = ClassifyRequest,
    responses(
        (status = 200, description = "Vitals classified", body = ClassificationResponse),
        (status = 400, description = "Vitals are not positive whole numbers", body = ErrorResponse),
    ),
    tag = "blood_pressure"
)]
#[instrument]
pub async fn classify(Json(request): Json<ClassifyRequest>) -> Result<Json<ClassificationResponse>, ErrorResponse> {
    let status = classify_vitals(request.systolic, request.diastolic).map_err(|e| {
        warn!("Rejected vitals: {}", e);
        ErrorResponse::from(e)
    })?;
    Ok(Json(status.into()))
}

/// Record a blood pressure reading and return its classification
///
/// The reading is classified even when it could not be saved; `persistedId`
/// is then null.
#[utoipa::path(
    post,
    path = "/api/v1/readings",
    request_body = CreateBloodPressureRequest,
    responses(
        (status = 201, description = "Reading recorded", body = ReadingOutcome),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "blood_pressure"
)]
#[instrument(skip(context, request))]
pub async fn create_reading(
    State(context): State<Arc<AppContext>>,
    Json(request): Json<CreateBloodPressureRequest>,
) -> Result<impl IntoResponse, ErrorResponse> {
    info!("Recording blood pressure reading");
    let outcome = context.records.record_reading(request).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// Most recent readings for an owner, newest first
#[utoipa::path(
    get,
    path = "/api/v1/readings",
    params(OwnerQuery),
    responses(
        (status = 200, description = "Readings retrieved", body = [BloodPressureReading]),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "blood_pressure"
)]
#[instrument(skip(context))]
pub async fn list_readings(
    State(context): State<Arc<AppContext>>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<BloodPressureReading>>, ErrorResponse> {
    let readings = context.records.recent_readings(&query.owner_id, query.limit()).await?;
    Ok(Json(readings))
}

/// Chart series for an owner's recent readings, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/readings/chart",
    params(OwnerQuery),
    responses(
        (status = 200, description = "Chart series", body = ChartSeries),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "blood_pressure"
)]
#[instrument(skip(context))]
pub async fn reading_chart(
    State(context): State<Arc<AppContext>>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<ChartSeries>, ErrorResponse> {
    let series = context.records.chart_series(&query.owner_id, query.limit()).await?;
    Ok(Json(series))
}
