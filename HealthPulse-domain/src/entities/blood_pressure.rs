use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::mood::Mood;

/// Domain model for a blood pressure reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BloodPressureReading {
    /// Identifier assigned by the document store
    #[serde(default)]
    pub id: String,

    /// User that owns the reading
    pub owner_id: String,

    /// Systolic blood pressure (the higher number)
    pub systolic: u16,

    /// Diastolic blood pressure (the lower number)
    pub diastolic: u16,

    /// Optional pulse rate in beats per minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulse: Option<u16>,

    /// Optional mood logged alongside the reading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,

    /// When the reading was taken
    pub timestamp: DateTime<Utc>,
}

/// Request payload for recording a new blood pressure reading
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateBloodPressureRequest {
    /// User that owns the reading
    #[validate(length(min = 1, message = "ownerId must not be empty"))]
    pub owner_id: String,

    /// Systolic blood pressure (the higher number)
    #[validate(range(min = 40, max = 300, message = "Systolic must be between 40 and 300"))]
    pub systolic: u16,

    /// Diastolic blood pressure (the lower number)
    #[validate(range(min = 20, max = 200, message = "Diastolic must be between 20 and 200"))]
    pub diastolic: u16,

    /// Optional pulse rate in beats per minute
    #[validate(range(min = 20, max = 250, message = "Pulse must be between 20 and 250"))]
    pub pulse: Option<u16>,

    /// Optional mood at the time of the reading
    pub mood: Option<Mood>,

    /// When the reading was taken. Defaults to the current time.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Clinical blood pressure category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum BloodPressureCategory {
    /// Systolic < 120 and diastolic < 80
    #[serde(rename = "Normal")]
    Normal,

    /// Systolic 120-129 and diastolic < 80
    #[serde(rename = "Elevated")]
    Elevated,

    /// Systolic 130-139 or diastolic 80-89
    #[serde(rename = "Stage 1 Hypertension")]
    Hypertension1,

    /// Systolic 140-179 or diastolic 90-119
    #[serde(rename = "Stage 2 Hypertension")]
    Hypertension2,

    /// Systolic ≥ 180 or diastolic ≥ 120
    #[serde(rename = "Hypertensive Crisis")]
    HypertensiveCrisis,
}

impl BloodPressureCategory {
    /// All categories, mildest first
    pub const ALL: [BloodPressureCategory; 5] = [
        BloodPressureCategory::Normal,
        BloodPressureCategory::Elevated,
        BloodPressureCategory::Hypertension1,
        BloodPressureCategory::Hypertension2,
        BloodPressureCategory::HypertensiveCrisis,
    ];

    /// The label shown to users and persisted with readings
    pub fn label(&self) -> &'static str {
        match self {
            BloodPressureCategory::Normal => "Normal",
            BloodPressureCategory::Elevated => "Elevated",
            BloodPressureCategory::Hypertension1 => "Stage 1 Hypertension",
            BloodPressureCategory::Hypertension2 => "Stage 2 Hypertension",
            BloodPressureCategory::HypertensiveCrisis => "Hypertensive Crisis",
        }
    }

    /// Parse a persisted label back into a category
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.label() == label)
    }

    /// Severity bucket for this category
    pub fn severity(&self) -> Severity {
        match self {
            BloodPressureCategory::Normal => Severity::Normal,
            BloodPressureCategory::Elevated => Severity::Low,
            BloodPressureCategory::Hypertension1 => Severity::Moderate,
            BloodPressureCategory::Hypertension2 => Severity::High,
            BloodPressureCategory::HypertensiveCrisis => Severity::Critical,
        }
    }

    /// Advice shown next to a classified reading
    pub fn recommendation(&self) -> &'static str {
        match self {
            BloodPressureCategory::Normal => {
                "Your blood pressure is in the normal range. Keep up your healthy habits."
            }
            BloodPressureCategory::Elevated => {
                "Your blood pressure is elevated. Reduce sodium, stay active and recheck regularly."
            }
            BloodPressureCategory::Hypertension1 => {
                "Stage 1 hypertension. Discuss lifestyle changes and monitoring with your doctor."
            }
            BloodPressureCategory::Hypertension2 => {
                "Stage 2 hypertension. Contact your doctor about treatment options."
            }
            BloodPressureCategory::HypertensiveCrisis => {
                "Hypertensive crisis. Wait five minutes and measure again; if it stays this high, seek emergency care immediately."
            }
        }
    }
}

impl fmt::Display for BloodPressureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse urgency bucket, ordered from least to most urgent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Low,
    Moderate,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Normal => "normal",
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        for category in BloodPressureCategory::ALL {
            assert_eq!(BloodPressureCategory::from_label(category.label()), Some(category));
        }
        assert_eq!(BloodPressureCategory::from_label("Hypertension Stage 1"), None);
    }

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&BloodPressureCategory::Hypertension2).unwrap();
        assert_eq!(json, "\"Stage 2 Hypertension\"");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Low > Severity::Normal);
        assert_eq!(Severity::Moderate.to_string(), "moderate");
    }

    #[test]
    fn test_create_request_validation() {
        let request = CreateBloodPressureRequest {
            owner_id: "alice".to_string(),
            systolic: 350,
            diastolic: 80,
            pulse: Some(72),
            mood: None,
            timestamp: None,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("systolic"));

        let request = CreateBloodPressureRequest { systolic: 120, ..request };
        assert!(request.validate().is_ok());
    }
}
