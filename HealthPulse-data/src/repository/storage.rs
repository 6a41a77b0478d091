use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::DatabasePool;
use super::documents::{merge_patch, Document, DocumentFilter, DocumentStore};
use super::errors::RepositoryError;
use super::key_value::KeyValueStore;

/// Document store backed by the SQLite `documents` table
///
/// Bodies are stored as JSON text; filters run in process after a
/// per-collection scan.
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    pool: DatabasePool,
}

impl SqliteDocumentStore {
    /// Create a store on top of an initialized pool
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn row_to_document(
        id: String,
        collection: String,
        data: String,
        created_at: String,
    ) -> Result<Document, RepositoryError> {
        let data: Value = serde_json::from_str(&data)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepositoryError::Validation(format!("invalid created_at {}: {}", created_at, e)))?;
        Ok(Document {
            id,
            collection,
            data,
            created_at,
        })
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn add(&self, collection: &str, data: Value) -> Result<String, RepositoryError> {
        if !data.is_object() {
            return Err(RepositoryError::Validation("document must be a JSON object".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let body = serde_json::to_string(&data)?;

        debug!("Storing document in database: collection={}, id={}", collection, id);
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO documents (id, collection, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![id, collection, body, now],
        )?;

        Ok(id)
    }

    async fn query(&self, collection: &str, filter: &DocumentFilter) -> Result<Vec<Document>, RepositoryError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, collection, data, created_at FROM documents
             WHERE collection = ?1 ORDER BY created_at ASC",
        )?;

        let rows = stmt.query_map(params![collection], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut documents = Vec::new();
        for row in rows {
            let (id, collection, data, created_at) = row?;
            match Self::row_to_document(id.clone(), collection, data, created_at) {
                Ok(document) => documents.push(document),
                Err(e) => warn!("Skipping unreadable document {}: {}", id, e),
            }
        }

        debug!("Scanned {} documents in collection {}", documents.len(), collection);
        Ok(filter.apply(documents))
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), RepositoryError> {
        let conn = self.pool.get()?;
        let stored: Option<String> = conn
            .query_row(
                "SELECT data FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;

        let stored = stored.ok_or_else(|| RepositoryError::NotFound(format!("{}/{}", collection, id)))?;
        let mut data: Value = serde_json::from_str(&stored)?;
        merge_patch(&mut data, &patch)?;

        conn.execute(
            "UPDATE documents SET data = ?1, updated_at = ?2 WHERE collection = ?3 AND id = ?4",
            params![serde_json::to_string(&data)?, Utc::now().to_rfc3339(), collection, id],
        )?;
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, RepositoryError> {
        let conn = self.pool.get()?;
        let row = conn
            .query_row(
                "SELECT id, collection, data, created_at FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, collection, data, created_at)| Self::row_to_document(id, collection, data, created_at))
            .transpose()
    }
}

/// Key-value store backed by the SQLite `key_value` table
#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    pool: DatabasePool,
}

impl SqliteKeyValueStore {
    /// Create a store on top of an initialized pool
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let conn = self.pool.get()?;
        let value = conn
            .query_row("SELECT value FROM key_value WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO key_value (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{initialize_database_pool, DatabaseConfig};
    use crate::repository::SortDirection;
    use serde_json::json;

    fn test_pool() -> DatabasePool {
        initialize_database_pool(&DatabaseConfig::in_memory()).unwrap()
    }

    #[tokio::test]
    async fn test_sqlite_document_round_trip() {
        let store = SqliteDocumentStore::new(test_pool());
        let id = store
            .add("readings", json!({ "ownerId": "alice", "systolic": 135 }))
            .await
            .unwrap();

        let doc = store.get("readings", &id).await.unwrap().unwrap();
        assert_eq!(doc.data["systolic"], 135);
        assert_eq!(doc.collection, "readings");
    }

    #[tokio::test]
    async fn test_sqlite_query_filters_and_orders() {
        let store = SqliteDocumentStore::new(test_pool());
        for (owner, ts) in [
            ("alice", "2024-05-01T08:00:00Z"),
            ("alice", "2024-05-03T08:00:00Z"),
            ("bob", "2024-05-02T08:00:00Z"),
            ("alice", "2024-05-02T08:00:00Z"),
        ] {
            store.add("readings", json!({ "ownerId": owner, "timestamp": ts })).await.unwrap();
        }

        let filter = DocumentFilter::new()
            .where_eq("ownerId", "alice")
            .order_by("timestamp", SortDirection::Descending)
            .limit(2);
        let docs = store.query("readings", &filter).await.unwrap();

        let stamps: Vec<&str> = docs.iter().map(|d| d.data["timestamp"].as_str().unwrap()).collect();
        assert_eq!(stamps, vec!["2024-05-03T08:00:00Z", "2024-05-02T08:00:00Z"]);
    }

    #[tokio::test]
    async fn test_sqlite_query_skips_unreadable_rows() {
        let store = SqliteDocumentStore::new(test_pool());
        store.add("readings", json!({ "ownerId": "alice", "systolic": 120 })).await.unwrap();
        {
            let conn = store.pool.get().unwrap();
            conn.execute(
                "INSERT INTO documents (id, collection, data, created_at, updated_at)
                 VALUES ('broken', 'readings', '{not json', ?1, ?1)",
                params![Utc::now().to_rfc3339()],
            )
            .unwrap();
        }

        let docs = store.query("readings", &DocumentFilter::new()).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].data["systolic"], 120);
    }

    #[tokio::test]
    async fn test_sqlite_update_missing_document() {
        let store = SqliteDocumentStore::new(test_pool());
        let result = store.update("readings", "missing", json!({ "a": 1 })).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[test]
    fn test_sqlite_key_value_upsert() {
        let store = SqliteKeyValueStore::new(test_pool());
        assert!(store.get("medicationReminders").unwrap().is_none());

        store.set("medicationReminders", "[]").unwrap();
        store.set("medicationReminders", "[{\"id\":\"1\"}]").unwrap();
        assert_eq!(
            store.get("medicationReminders").unwrap().as_deref(),
            Some("[{\"id\":\"1\"}]")
        );
    }
}
