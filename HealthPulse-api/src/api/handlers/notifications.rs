use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use health_pulse_domain::services::Permission;

use crate::context::AppContext;
use crate::notifications::ShownNotification;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PermissionResponse {
    pub permission: Permission,
}

/// Notifications raised so far, newest first
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses(
        (status = 200, description = "Shown notifications", body = [ShownNotification]),
    ),
    tag = "notifications"
)]
#[instrument(skip(context))]
pub async fn list_notifications(State(context): State<Arc<AppContext>>) -> Json<Vec<ShownNotification>> {
    Json(context.inbox.recent())
}

/// Ask for permission to show notifications
#[utoipa::path(
    post,
    path = "/api/v1/notifications/permission",
    responses(
        (status = 200, description = "Resulting permission", body = PermissionResponse),
    ),
    tag = "notifications"
)]
#[instrument(skip(context))]
pub async fn request_permission(State(context): State<Arc<AppContext>>) -> Json<PermissionResponse> {
    let permission = context.scheduler.lock().await.request_permission();
    Json(PermissionResponse { permission })
}
