pub mod health;
pub mod notifications;
pub mod readings;
pub mod records;
pub mod reminders;

// Re-export handlers for easier imports
pub use health::health_check;
pub use notifications::{list_notifications, request_permission};
pub use readings::{classify, create_reading, list_readings, reading_chart};
pub use records::{create_medication_event, create_mood, get_health_score};
pub use reminders::{create_reminder, list_reminders, mark_taken};
