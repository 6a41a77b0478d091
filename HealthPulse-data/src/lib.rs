// HealthPulse Data
// Persistence collaborators: a document store for health records and a
// local key-value store for the reminder list

// Database connection management
#[cfg(feature = "sqlite")]
pub mod database;

// Store traits and implementations
pub mod repository;
