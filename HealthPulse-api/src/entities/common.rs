use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::{IntoParams, ToSchema};

use health_pulse_domain::services::{ClassifierError, RecordServiceError, SchedulerError};

/// Default and maximum number of records returned by list endpoints
pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 500;

/// Error response format for API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    /// Create a not found error response
    pub fn not_found(resource: &str) -> Self {
        Self {
            error: "not_found".to_string(),
            message: format!("The requested {} could not be found", resource),
        }
    }

    /// Create a validation error response
    pub fn validation_error(message: &str) -> Self {
        Self {
            error: "validation_error".to_string(),
            message: message.to_string(),
        }
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self {
            error: "internal_error".to_string(),
            message: "An unexpected error occurred".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<RecordServiceError> for ErrorResponse {
    fn from(err: RecordServiceError) -> Self {
        match err {
            RecordServiceError::ValidationError(msg) => {
                warn!("Rejected record: {}", msg);
                ErrorResponse::validation_error(&msg)
            }
            RecordServiceError::RepositoryError(e) => {
                error!("Record store failure: {}", e);
                ErrorResponse::internal_error()
            }
        }
    }
}

impl From<SchedulerError> for ErrorResponse {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::ReminderNotFound(_) => ErrorResponse::not_found("reminder"),
            SchedulerError::ValidationError(msg) => ErrorResponse::validation_error(&msg),
        }
    }
}

impl From<ClassifierError> for ErrorResponse {
    fn from(err: ClassifierError) -> Self {
        ErrorResponse::validation_error(&err.to_string())
    }
}

/// Owner and page size for list endpoints
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct OwnerQuery {
    /// User whose records to return
    pub owner_id: String,

    /// Maximum number of results (default: 20, max: 500)
    pub limit: Option<usize>,
}

impl OwnerQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(ErrorResponse::not_found("reminder").status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorResponse::validation_error("bad").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorResponse::internal_error().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err: ErrorResponse = SchedulerError::ReminderNotFound("42".to_string()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_owner_query_limit_is_clamped() {
        let query = |limit| OwnerQuery {
            owner_id: "alice".to_string(),
            limit,
        };
        assert_eq!(query(None).limit(), DEFAULT_LIMIT);
        assert_eq!(query(Some(0)).limit(), 1);
        assert_eq!(query(Some(10_000)).limit(), MAX_LIMIT);
    }
}
