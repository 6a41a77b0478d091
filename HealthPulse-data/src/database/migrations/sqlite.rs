use rusqlite::Connection;
use tracing::info;

use crate::database::DatabaseError;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Running SQLite migrations");

    create_documents_table(conn)?;
    create_documents_index(conn)?;
    create_key_value_table(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the generic document table used by the document store
fn create_documents_table(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating documents table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            collection TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )
    .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    Ok(())
}

/// Create index on collection for per-collection scans
fn create_documents_index(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_documents_collection
        ON documents (collection, created_at)",
        [],
    )
    .map_err(|e| DatabaseError::MigrationError(format!("Failed to create index: {}", e)))?;

    Ok(())
}

/// Create the table backing the local key-value store
fn create_key_value_table(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating key_value table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS key_value (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )
    .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    Ok(())
}
