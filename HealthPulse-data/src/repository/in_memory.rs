use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::documents::{merge_patch, Document, DocumentFilter, DocumentStore};
use super::errors::RepositoryError;
use super::key_value::KeyValueStore;

/// In-memory document store
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    /// Documents keyed by (collection, id)
    documents: Arc<Mutex<HashMap<(String, String), Document>>>,
}

impl InMemoryDocumentStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn add(&self, collection: &str, data: Value) -> Result<String, RepositoryError> {
        if !data.is_object() {
            return Err(RepositoryError::Validation("document must be a JSON object".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let document = Document {
            id: id.clone(),
            collection: collection.to_string(),
            data,
            created_at: Utc::now(),
        };

        let mut store = self.documents.lock()?;
        store.insert((collection.to_string(), id.clone()), document);
        debug!("Stored document {} in memory collection {}", id, collection);
        Ok(id)
    }

    async fn query(&self, collection: &str, filter: &DocumentFilter) -> Result<Vec<Document>, RepositoryError> {
        let store = self.documents.lock()?;
        let candidates: Vec<Document> = store
            .values()
            .filter(|doc| doc.collection == collection)
            .cloned()
            .collect();
        Ok(filter.apply(candidates))
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), RepositoryError> {
        let mut store = self.documents.lock()?;
        let document = store
            .get_mut(&(collection.to_string(), id.to_string()))
            .ok_or_else(|| RepositoryError::NotFound(format!("{}/{}", collection, id)))?;
        merge_patch(&mut document.data, &patch)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, RepositoryError> {
        let store = self.documents.lock()?;
        Ok(store.get(&(collection.to_string(), id.to_string())).cloned())
    }
}

/// In-memory key-value store
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let values = self.values.lock()?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        let mut values = self.values.lock()?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
