//! Application context: builds the stores, services and scheduler once and
//! shares them with the handlers and the reminder driver

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::sync::{Mutex, Notify};
use tracing::{info, warn};

use health_pulse_data::database::{initialize_database_pool, DatabaseError};
use health_pulse_data::repository::{
    DocumentStore, InMemoryDocumentStore, InMemoryKeyValueStore, KeyValueStore, SqliteDocumentStore,
    SqliteKeyValueStore,
};
use health_pulse_domain::health::{HealthService, HealthServiceTrait};
use health_pulse_domain::services::{Clock, HealthRecordService, Permission, ReminderScheduler, SystemClock};

use crate::config::{AppConfig, StorageBackend};
use crate::notifications::InboxNotifier;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Failed to initialize storage: {0}")]
    Storage(#[from] DatabaseError),
}

/// Everything the handlers and the reminder driver share
pub struct AppContext {
    pub records: HealthRecordService,
    pub scheduler: Arc<Mutex<ReminderScheduler>>,
    /// Signalled whenever reminders change so the driver re-arms its sleep
    pub reminders_changed: Arc<Notify>,
    pub inbox: Arc<InboxNotifier>,
    pub health: Arc<dyn HealthServiceTrait>,
    pub clock: Arc<dyn Clock>,
    pub started_at: Instant,
}

impl AppContext {
    /// Build from configuration, restoring any stored reminders
    pub fn from_config(config: &AppConfig) -> Result<Self, ContextError> {
        let (documents, key_value): (Arc<dyn DocumentStore>, Arc<dyn KeyValueStore>) = match config.storage {
            StorageBackend::Sqlite => {
                let pool = initialize_database_pool(&config.database)?;
                if pool.is_in_memory() {
                    warn!("Records will not survive a restart: {}", pool.connection_info());
                }
                (
                    Arc::new(SqliteDocumentStore::new(pool.clone())),
                    Arc::new(SqliteKeyValueStore::new(pool)),
                )
            }
            StorageBackend::Memory => {
                info!("Using in-memory storage");
                (
                    Arc::new(InMemoryDocumentStore::new()),
                    Arc::new(InMemoryKeyValueStore::new()),
                )
            }
        };

        let inbox = Arc::new(InboxNotifier::new(config.notification_permission));
        Ok(Self::assemble(documents, key_value, inbox, Arc::new(SystemClock)))
    }

    /// In-memory context with the given notification permission
    pub fn in_memory(permission: Permission) -> Self {
        Self::with_clock(permission, Arc::new(SystemClock))
    }

    /// In-memory context driven by `clock`
    pub fn with_clock(permission: Permission, clock: Arc<dyn Clock>) -> Self {
        Self::assemble(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryKeyValueStore::new()),
            Arc::new(InboxNotifier::new(permission)),
            clock,
        )
    }

    /// Wire the pieces together around the given collaborators
    pub fn assemble(
        documents: Arc<dyn DocumentStore>,
        key_value: Arc<dyn KeyValueStore>,
        inbox: Arc<InboxNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut scheduler = ReminderScheduler::new(key_value.clone(), inbox.clone(), clock.clone());
        scheduler.load();

        Self {
            records: HealthRecordService::new(documents.clone()),
            scheduler: Arc::new(Mutex::new(scheduler)),
            reminders_changed: Arc::new(Notify::new()),
            inbox,
            health: Arc::new(HealthService::new(documents, key_value)),
            clock,
            started_at: Instant::now(),
        }
    }
}
