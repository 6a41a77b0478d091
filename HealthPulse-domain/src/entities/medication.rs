use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// How often a medication is taken
///
/// Values outside the known set deserialize to `Unknown` rather than
/// failing, so a stored list with an unexpected entry still loads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    /// `time` is a single `HH:MM`
    Daily,
    /// `time` is `HH:MM,HH:MM` (morning, evening)
    TwiceDaily,
    /// `time` is a comma-separated list of weekdays, 0 = Sunday
    Weekly,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Frequency::Daily => "daily",
            Frequency::TwiceDaily => "twice-daily",
            Frequency::Weekly => "weekly",
            Frequency::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Outcome of a scheduled dose
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MedicationEventStatus {
    Taken,
    Skipped,
    Missed,
    #[serde(other)]
    Unknown,
}

/// A logged medication event, used for adherence scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MedicationEvent {
    #[serde(default)]
    pub id: String,
    pub owner_id: String,
    pub medication: String,
    #[cfg_attr(feature = "with-api", schema(value_type = String, example = "TAKEN"))]
    pub status: MedicationEventStatus,
    pub timestamp: DateTime<Utc>,
}

/// Request payload for logging a medication event
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateMedicationEventRequest {
    #[validate(length(min = 1, message = "ownerId must not be empty"))]
    pub owner_id: String,

    #[validate(length(min = 1, max = 200, message = "medication must be between 1 and 200 characters"))]
    pub medication: String,

    #[cfg_attr(feature = "with-api", schema(value_type = String, example = "TAKEN"))]
    pub status: MedicationEventStatus,

    pub timestamp: Option<DateTime<Utc>>,
}

/// Where a reminder sits in its notify/take cycle
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ReminderState {
    /// Waiting for `next_dose`
    #[default]
    Scheduled,
    /// A notification went out for the current `next_dose`
    Notified,
}

/// The medication details a reminder is computed from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    #[validate(length(min = 1, max = 200, message = "name must be between 1 and 200 characters"))]
    pub name: String,

    #[validate(length(max = 100, message = "dosage cannot exceed 100 characters"))]
    pub dosage: String,

    #[cfg_attr(feature = "with-api", schema(value_type = String, example = "twice-daily"))]
    pub frequency: Frequency,

    /// `HH:MM`, `HH:MM,HH:MM`, or a weekday list depending on frequency
    #[validate(length(min = 1, max = 64, message = "time must not be empty"))]
    pub time: String,
}

/// A scheduled recurring medication dose
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub name: String,
    pub dosage: String,
    #[cfg_attr(feature = "with-api", schema(value_type = String, example = "daily"))]
    pub frequency: Frequency,
    pub time: String,
    #[cfg_attr(feature = "with-api", schema(value_type = String, example = "2024-05-01T08:00:00"))]
    pub next_dose: NaiveDateTime,
    #[cfg_attr(feature = "with-api", schema(value_type = Option<String>))]
    pub last_taken: Option<NaiveDateTime>,
    #[serde(default)]
    pub state: ReminderState,
}

impl Reminder {
    /// The medication this reminder was created from
    pub fn medication(&self) -> Medication {
        Medication {
            name: self.name.clone(),
            dosage: self.dosage.clone(),
            frequency: self.frequency,
            time: self.time.clone(),
        }
    }

    /// Whether the reminder is due at `now`
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.next_dose <= now
    }
}
