use super::errors::RepositoryError;

/// Synchronous local key-value store holding serialized values
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, RepositoryError>;

    /// Overwrite the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError>;
}

/// A store that refuses every operation, like browser storage in a private
/// window. Callers are expected to carry on with in-memory state.
#[derive(Debug, Clone, Default)]
pub struct UnavailableKeyValueStore;

impl KeyValueStore for UnavailableKeyValueStore {
    fn get(&self, _key: &str) -> Result<Option<String>, RepositoryError> {
        Err(RepositoryError::Unavailable("local storage is disabled".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("local storage is disabled".to_string()))
    }
}
