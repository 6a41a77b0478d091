// HealthPulse-api lib.rs
//
// HTTP surface, composition root and reminder driver for HealthPulse.

// Public modules
pub mod api;
pub mod config;
pub mod context;
pub mod entities;
pub mod notifications;
pub mod openapi;
pub mod reminders;

use std::sync::Arc;

use axum::Router;

use crate::context::AppContext;

/// Create the application router
pub fn create_application(context: Arc<AppContext>) -> Router {
    api::create_app(context)
}
