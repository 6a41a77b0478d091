// Public entities for the HealthPulse API
// Request and response shapes that only exist at the HTTP boundary; domain
// entities are serialized directly everywhere else

// Classification requests and reading queries
pub mod blood_pressure;

// Error responses and shared query parameters
pub mod common;
