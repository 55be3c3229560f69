//! Persistence layer for the Agora platform.
//!
//! Exposes a namespaced key-value [`Storage`] trait plus two backends:
//! [`MemoryStorage`] for tests and ephemeral deployments, and [`FileStorage`]
//! for a one-JSON-file-per-record on-disk layout. Values are opaque bytes;
//! the owning manager serializes its entities with [`to_bytes`]/[`from_bytes`]
//! so the trait stays object-safe behind `Arc<dyn Storage>`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Storage errors
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Key not found
    #[error("key not found: {0}")]
    KeyNotFound(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Namespaced byte-oriented storage used by every platform manager.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store a value under `namespace`/`key`, replacing any previous value.
    async fn put(&self, namespace: &str, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Fetch the value under `namespace`/`key`.
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Vec<u8>>;

    /// Check whether `namespace`/`key` exists.
    async fn contains(&self, namespace: &str, key: &str) -> StorageResult<bool>;

    /// Remove `namespace`/`key`. Removing a missing key is not an error.
    async fn delete(&self, namespace: &str, key: &str) -> StorageResult<()>;

    /// List all keys in a namespace, in unspecified order.
    async fn list_keys(&self, namespace: &str) -> StorageResult<Vec<String>>;
}

/// Serialize an entity for storage.
pub fn to_bytes<T: Serialize>(value: &T) -> StorageResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Deserialize an entity fetched from storage.
pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> StorageResult<T> {
    serde_json::from_slice(bytes).map_err(|e| StorageError::Deserialization(e.to_string()))
}

fn missing(namespace: &str, key: &str) -> StorageError {
    StorageError::KeyNotFound(format!("{} not found in namespace {}", key, namespace))
}
