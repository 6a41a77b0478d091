use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Per-dimension sub-scores, each 0-100
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponents {
    pub blood_pressure: u8,
    pub mood: u8,
    pub medication: u8,
}

/// How many records fed each sub-score
///
/// A zero count means the matching component is 0 because nothing was
/// logged, not because the logged data scored 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SampleCounts {
    pub readings: usize,
    pub mood_entries: usize,
    pub medication_events: usize,
}

/// Aggregate 0-100 health score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct HealthScore {
    pub overall: u8,
    pub components: ScoreComponents,
    #[serde(default)]
    pub samples: SampleCounts,
}

impl HealthScore {
    /// Whether at least one record contributed to the score
    pub fn has_data(&self) -> bool {
        self.samples.readings + self.samples.mood_entries + self.samples.medication_events > 0
    }
}

/// A health score cached for one owner and day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DailyHealthScore {
    pub owner_id: String,
    #[cfg_attr(feature = "with-api", schema(value_type = String, example = "2024-05-01"))]
    pub date: NaiveDate,
    #[serde(flatten)]
    pub score: HealthScore,
}
