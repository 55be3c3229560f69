//! In-memory storage backend.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{missing, Storage, StorageResult};

/// In-memory storage implementation, namespace -> key -> bytes.
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put(&self, namespace: &str, key: &str, value: &[u8]) -> StorageResult<()> {
        let mut data = self.data.write().await;
        let ns = data.entry(namespace.to_string()).or_default();
        ns.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Vec<u8>> {
        let data = self.data.read().await;
        data.get(namespace)
            .and_then(|ns| ns.get(key))
            .cloned()
            .ok_or_else(|| missing(namespace, key))
    }

    async fn contains(&self, namespace: &str, key: &str) -> StorageResult<bool> {
        let data = self.data.read().await;
        Ok(data
            .get(namespace)
            .map(|ns| ns.contains_key(key))
            .unwrap_or(false))
    }

    async fn delete(&self, namespace: &str, key: &str) -> StorageResult<()> {
        let mut data = self.data.write().await;
        if let Some(ns) = data.get_mut(namespace) {
            ns.remove(key);
        }
        Ok(())
    }

    async fn list_keys(&self, namespace: &str) -> StorageResult<Vec<String>> {
        let data = self.data.read().await;
        Ok(data
            .get(namespace)
            .map(|ns| ns.keys().cloned().collect())
            .unwrap_or_default())
    }
}
