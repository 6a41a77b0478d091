// Database modules
pub mod connection;
pub mod migrations;

// Re-export database connection types
pub use connection::{initialize_database_pool, DatabaseConfig, DatabaseError, DatabasePool, DEFAULT_SQLITE_PATH};
