// Domain services
// Classification and scoring are pure functions; the scheduler and the
// record service sit on top of the store traits from health_pulse_data.
pub mod clock;
pub mod health_score;
pub mod insights;
pub mod notifications;
pub mod records;
pub mod reminders;
pub mod schedule;

// Re-export the main entry points
pub use clock::{Clock, ManualClock, SystemClock};
pub use health_score::calculate_health_score;
pub use insights::{
    analyze_readings, analyze_trend, check_significant_change, classify_vitals, get_blood_pressure_status,
    get_severity_level, validate_vitals, ClassifierError,
};
pub use notifications::{NotificationOptions, Notifier, Permission};
pub use records::{HealthRecordService, ReadingOutcome, RecordServiceError};
pub use reminders::{ReminderScheduler, SchedulerError, REMINDER_STORAGE_KEY, SWEEP_INTERVAL};
pub use schedule::{calculate_next_dose, describe_schedule, next_dose_after, ScheduleError};
