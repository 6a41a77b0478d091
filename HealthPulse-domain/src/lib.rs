// HealthPulse Domain
// This crate contains the business logic for the HealthPulse application

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Re-export the repository module from health_pulse_data for convenience
pub use health_pulse_data::repository;
