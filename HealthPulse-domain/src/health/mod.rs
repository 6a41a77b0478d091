//! Domain layer health check functionality
//! Probes the document store and the local key-value store

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use health_pulse_data::repository::{DocumentFilter, DocumentStore, KeyValueStore, RepositoryError};

use crate::services::reminders::REMINDER_STORAGE_KEY;

/// System health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HealthComponent {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HealthComponent {
    fn healthy() -> Self {
        Self {
            status: ComponentStatus::Healthy,
            details: None,
        }
    }

    fn with_details(status: ComponentStatus, details: impl Into<String>) -> Self {
        Self {
            status,
            details: Some(details.into()),
        }
    }
}

/// Represents the overall health of the system
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct SystemHealth {
    pub status: SystemStatus,
    pub components: BTreeMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;
}

/// Checks the stores the application depends on
pub struct HealthService {
    documents: Arc<dyn DocumentStore>,
    key_value: Arc<dyn KeyValueStore>,
}

impl HealthService {
    pub fn new(documents: Arc<dyn DocumentStore>, key_value: Arc<dyn KeyValueStore>) -> Self {
        Self { documents, key_value }
    }

    async fn check_documents(&self) -> HealthComponent {
        let probe = DocumentFilter::new().limit(1);
        match self.documents.query("readings", &probe).await {
            Ok(_) => HealthComponent::healthy(),
            Err(e) => HealthComponent::with_details(ComponentStatus::Unhealthy, e.to_string()),
        }
    }

    /// Reminders keep working in memory without local storage, so an
    /// unavailable key-value store only degrades the system
    fn check_key_value(&self) -> HealthComponent {
        match self.key_value.get(REMINDER_STORAGE_KEY) {
            Ok(_) => HealthComponent::healthy(),
            Err(RepositoryError::Unavailable(reason)) => HealthComponent::with_details(
                ComponentStatus::Degraded,
                format!("Reminders are kept in memory only: {}", reason),
            ),
            Err(e) => HealthComponent::with_details(ComponentStatus::Degraded, e.to_string()),
        }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = BTreeMap::new();
        components.insert("documentStore".to_string(), self.check_documents().await);
        components.insert("reminderStorage".to_string(), self.check_key_value());

        SystemHealth {
            status: overall_status(components.values()),
            components,
        }
    }
}

/// Worst component status wins
pub fn overall_status<'a>(components: impl IntoIterator<Item = &'a HealthComponent>) -> SystemStatus {
    let mut status = SystemStatus::Healthy;
    for component in components {
        match component.status {
            ComponentStatus::Unhealthy => return SystemStatus::Unhealthy,
            ComponentStatus::Degraded => status = SystemStatus::Degraded,
            ComponentStatus::Healthy => {}
        }
    }
    status
}
