use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::blood_pressure::{BloodPressureCategory, Severity};

/// Which vital an insight refers to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum Metric {
    Systolic,
    Diastolic,
}

/// Kind of history-based insight
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    TrendingUp,
    TrendingDown,
    SignificantChange,
}

/// Observation derived from recent readings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
    pub severity: Severity,
    /// Metrics that triggered the insight
    pub metrics: Vec<Metric>,
}

/// Full classification of the newest reading in a history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct BloodPressureAnalysis {
    pub status: BloodPressureCategory,
    pub severity: Severity,
    pub recommendation: String,
    pub insights: Vec<Insight>,
}

/// Labels and aligned numeric series for the charting collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub systolic: Vec<u16>,
    pub diastolic: Vec<u16>,
    /// `None` where a reading has no pulse
    pub pulse: Vec<Option<u16>>,
}
