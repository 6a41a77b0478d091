// Store traits and their implementations
pub mod errors;
mod documents;
mod in_memory;
mod key_value;
#[cfg(feature = "sqlite")]
mod storage;

// Re-export commonly used types
pub use documents::{Document, DocumentFilter, DocumentStore, SortDirection};
pub use errors::RepositoryError;
pub use in_memory::{InMemoryDocumentStore, InMemoryKeyValueStore};
pub use key_value::{KeyValueStore, UnavailableKeyValueStore};
#[cfg(feature = "sqlite")]
pub use storage::{SqliteDocumentStore, SqliteKeyValueStore};
