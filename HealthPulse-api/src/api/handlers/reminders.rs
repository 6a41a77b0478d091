use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, instrument};

use health_pulse_domain::entities::{Medication, Reminder};

use crate::context::AppContext;
use crate::entities::common::ErrorResponse;

/// All medication reminders
#[utoipa::path(
    get,
    path = "/api/v1/reminders",
    responses(
        (status = 200, description = "Reminders", body = [Reminder]),
    ),
    tag = "reminders"
)]
#[instrument(skip(context))]
pub async fn list_reminders(State(context): State<Arc<AppContext>>) -> Json<Vec<Reminder>> {
    let scheduler = context.scheduler.lock().await;
    Json(scheduler.reminders().to_vec())
}

/// Add a reminder for a medication
#[utoipa::path(
    post,
    path = "/api/v1/reminders",
    request_body = Medication,
    responses(
        (status = 201, description = "Reminder scheduled", body = Reminder),
        (status = 400, description = "Invalid medication", body = ErrorResponse),
    ),
    tag = "reminders"
)]
#[instrument(skip(context, medication))]
pub async fn create_reminder(
    State(context): State<Arc<AppContext>>,
    Json(medication): Json<Medication>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let reminder = context.scheduler.lock().await.add_reminder(medication)?;
    context.reminders_changed.notify_one();
    Ok((StatusCode::CREATED, Json(reminder)))
}

/// Record the current dose as taken and schedule the next one
#[utoipa::path(
    post,
    path = "/api/v1/reminders/{id}/taken",
    params(
        ("id" = String, Path, description = "Reminder ID")
    ),
    responses(
        (status = 200, description = "Dose recorded", body = Reminder),
        (status = 404, description = "Reminder not found", body = ErrorResponse),
    ),
    tag = "reminders"
)]
#[instrument(skip(context))]
pub async fn mark_taken(
    State(context): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Reminder>, ErrorResponse> {
    let reminder = context.scheduler.lock().await.mark_as_taken(&id)?;
    context.reminders_changed.notify_one();
    info!(reminder_id = %id, "Dose marked as taken");
    Ok(Json(reminder))
}
