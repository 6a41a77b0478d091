// Domain entities and value objects
pub mod blood_pressure;
pub mod health_score;
pub mod insight;
pub mod medication;
pub mod mood;

// Re-export common types for easier imports
pub use blood_pressure::{BloodPressureCategory, BloodPressureReading, CreateBloodPressureRequest, Severity};
pub use health_score::{DailyHealthScore, HealthScore, SampleCounts, ScoreComponents};
pub use insight::{BloodPressureAnalysis, ChartSeries, Insight, InsightKind, Metric};
pub use medication::{
    CreateMedicationEventRequest, Frequency, Medication, MedicationEvent, MedicationEventStatus, Reminder,
    ReminderState,
};
pub use mood::{CreateMoodEntryRequest, Mood, MoodEntry};
