use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use health_pulse_domain::entities::{BloodPressureCategory, Severity};

/// A bare pair of vitals to classify without storing anything
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassifyRequest {
    /// Systolic blood pressure (the higher number)
    #[schema(example = 128)]
    pub systolic: f64,

    /// Diastolic blood pressure (the lower number)
    #[schema(example = 82)]
    pub diastolic: f64,
}

/// Category, severity and advice for a pair of vitals
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassificationResponse {
    pub status: BloodPressureCategory,
    pub severity: Severity,
    pub recommendation: String,
}

impl From<BloodPressureCategory> for ClassificationResponse {
    fn from(status: BloodPressureCategory) -> Self {
        Self {
            status,
            severity: status.severity(),
            recommendation: status.recommendation().to_string(),
        }
    }
}

/// Query parameters for the health score
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct HealthScoreQuery {
    /// User to score
    pub owner_id: String,

    /// Last day of the window (default: today, UTC)
    pub date: Option<NaiveDate>,

    /// Window length in days (default: 7, max: 365)
    pub window_days: Option<u32>,
}
