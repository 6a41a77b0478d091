//! Application configuration read from the environment

use std::env;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use health_pulse_data::database::DatabaseConfig;
use health_pulse_domain::services::{Permission, SWEEP_INTERVAL};

pub const DEFAULT_PORT: u16 = 3000;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a number between 1 and 65535, got {0:?}")]
    InvalidPort(String),

    #[error("STORAGE_BACKEND must be 'sqlite' or 'memory', got {0:?}")]
    InvalidStorageBackend(String),

    #[error("REMINDER_SWEEP_SECONDS must be a positive number, got {0:?}")]
    InvalidSweepInterval(String),
}

/// Where records and the reminder list are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl StorageBackend {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            _ => Err(ConfigError::InvalidStorageBackend(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub storage: StorageBackend,
    pub database: DatabaseConfig,
    pub sweep_interval: Duration,
    /// Permission the notification inbox starts with
    pub notification_permission: Permission,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            storage: StorageBackend::Sqlite,
            database: DatabaseConfig::default(),
            sweep_interval: SWEEP_INTERVAL,
            notification_permission: Permission::Granted,
        }
    }
}

impl AppConfig {
    /// Read `PORT`, `STORAGE_BACKEND`, `REMINDER_SWEEP_SECONDS`,
    /// `NOTIFICATION_PERMISSION` and the `DB_*` settings
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable lookup; unset variables take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => return Err(ConfigError::InvalidPort(raw)),
            },
            None => defaults.port,
        };

        let storage = match lookup("STORAGE_BACKEND") {
            Some(raw) => StorageBackend::parse(&raw)?,
            None => defaults.storage,
        };

        let sweep_interval = match lookup("REMINDER_SWEEP_SECONDS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidSweepInterval(raw)),
            },
            None => defaults.sweep_interval,
        };

        let notification_permission = match lookup("NOTIFICATION_PERMISSION") {
            Some(raw) => Permission::from_label(&raw).unwrap_or_else(|| {
                warn!("Ignoring invalid NOTIFICATION_PERMISSION={:?}, using granted", raw);
                Permission::Granted
            }),
            None => defaults.notification_permission,
        };

        let database = match storage {
            StorageBackend::Sqlite => DatabaseConfig::from_env(),
            StorageBackend::Memory => DatabaseConfig::in_memory(),
        };

        let config = Self {
            port,
            storage,
            database,
            sweep_interval,
            notification_permission,
        };
        info!(
            "Configuration: port={}, storage={:?}, sweep={}s, notifications={:?}",
            config.port,
            config.storage,
            config.sweep_interval.as_secs(),
            config.notification_permission
        );
        Ok(config)
    }
}
