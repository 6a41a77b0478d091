use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Self-reported mood
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub enum Mood {
    Great,
    Good,
    Okay,
    Poor,
    Bad,
}

impl Mood {
    /// Contribution of this mood to the mood score
    pub fn score(&self) -> u8 {
        match self {
            Mood::Great => 100,
            Mood::Good => 80,
            Mood::Okay => 60,
            Mood::Poor => 40,
            Mood::Bad => 20,
        }
    }

    /// Parse a free-text label, ignoring case and surrounding whitespace
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "great" => Some(Mood::Great),
            "good" => Some(Mood::Good),
            "okay" => Some(Mood::Okay),
            "poor" => Some(Mood::Poor),
            "bad" => Some(Mood::Bad),
            _ => None,
        }
    }
}

/// A logged mood entry
///
/// The label is stored as written so entries the score table does not know
/// still count towards the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    #[serde(default)]
    pub id: String,
    pub owner_id: String,
    pub mood: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl MoodEntry {
    /// Mapped mood, if the label is known
    pub fn mood(&self) -> Option<Mood> {
        Mood::from_label(&self.mood)
    }
}

/// Request payload for logging a mood
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateMoodEntryRequest {
    #[validate(length(min = 1, message = "ownerId must not be empty"))]
    pub owner_id: String,

    #[validate(length(min = 1, max = 32, message = "mood must be between 1 and 32 characters"))]
    pub mood: String,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    pub timestamp: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_labels() {
        assert_eq!(Mood::from_label("Great"), Some(Mood::Great));
        assert_eq!(Mood::from_label(" okay "), Some(Mood::Okay));
        assert_eq!(Mood::from_label("Meh"), None);
    }

    #[test]
    fn test_mood_scores() {
        let scores: Vec<u8> = [Mood::Great, Mood::Good, Mood::Okay, Mood::Poor, Mood::Bad]
            .iter()
            .map(Mood::score)
            .collect();
        assert_eq!(scores, vec![100, 80, 60, 40, 20]);
    }
}
