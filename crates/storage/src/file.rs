//! File-based storage backend: one JSON file per record under
//! `<base>/<namespace>/<key>.json`, with an optional in-memory cache.

use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs as async_fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::{missing, MemoryStorage, Storage, StorageError, StorageResult};

pub struct FileStorage {
    base_dir: PathBuf,
    cache: Option<MemoryStorage>,
}

impl FileStorage {
    /// Create a file storage rooted at `base_dir`, with a read cache.
    pub fn new(base_dir: &str) -> StorageResult<Self> {
        Self::create(base_dir, Some(MemoryStorage::new()))
    }

    /// Create a file storage without the in-memory cache.
    pub fn new_without_cache(base_dir: &str) -> StorageResult<Self> {
        Self::create(base_dir, None)
    }

    fn create(base_dir: &str, cache: Option<MemoryStorage>) -> StorageResult<Self> {
        let path = PathBuf::from(base_dir);
        fs::create_dir_all(&path).map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(Self {
            base_dir: path,
            cache,
        })
    }

    fn namespace_path(&self, namespace: &str) -> PathBuf {
        self.base_dir.join(namespace)
    }

    fn key_path(&self, namespace: &str, key: &str) -> PathBuf {
        self.namespace_path(namespace).join(format!("{}.json", key))
    }

    async fn ensure_namespace_dir(&self, namespace: &str) -> StorageResult<()> {
        let path = self.namespace_path(namespace);
        if !path.exists() {
            async_fs::create_dir_all(&path)
                .await
                .map_err(|e| StorageError::Io(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn put(&self, namespace: &str, key: &str, value: &[u8]) -> StorageResult<()> {
        self.ensure_namespace_dir(namespace).await?;

        let path = self.key_path(namespace, key);
        let mut file = async_fs::File::create(&path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        file.write_all(value)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        if let Some(cache) = &self.cache {
            cache.put(namespace, key, value).await?;
        }
        Ok(())
    }

    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Vec<u8>> {
        if let Some(cache) = &self.cache {
            if let Ok(value) = cache.get(namespace, key).await {
                return Ok(value);
            }
        }

        let path = self.key_path(namespace, key);
        if !path.exists() {
            return Err(missing(namespace, key));
        }

        let mut file = async_fs::File::open(&path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        if let Some(cache) = &self.cache {
            let _ = cache.put(namespace, key, &contents).await;
        }
        Ok(contents)
    }

    async fn contains(&self, namespace: &str, key: &str) -> StorageResult<bool> {
        if let Some(cache) = &self.cache {
            if cache.contains(namespace, key).await? {
                return Ok(true);
            }
        }
        Ok(self.key_path(namespace, key).exists())
    }

    async fn delete(&self, namespace: &str, key: &str) -> StorageResult<()> {
        if let Some(cache) = &self.cache {
            let _ = cache.delete(namespace, key).await;
        }

        let path = self.key_path(namespace, key);
        if path.exists() {
            async_fs::remove_file(&path)
                .await
                .map_err(|e| StorageError::Io(e.to_string()))?;
        }
        Ok(())
    }

    async fn list_keys(&self, namespace: &str) -> StorageResult<Vec<String>> {
        let path = self.namespace_path(namespace);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut entries = async_fs::read_dir(&path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        let mut keys = Vec::new();

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?
        {
            let path = entry.path();
            if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        Ok(keys)
    }
}
