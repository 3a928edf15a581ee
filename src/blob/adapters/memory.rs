//! In-memory blob store.

use crate::blob::{
    StoredFile, Upload,
    ports::{BlobStore, BlobStoreError, BlobStoreResult, check_key},
    storage_key,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Thread-safe blob store that keeps content in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryBlobStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored blobs, or `0` if the lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Returns `true` if no blobs are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(err: PoisonError<T>) -> BlobStoreError {
    BlobStoreError::storage(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, namespace: &str, upload: Upload) -> BlobStoreResult<StoredFile> {
        let key = storage_key(namespace, &upload.file_name);
        check_key(&key)?;
        let stored = StoredFile::describe(&upload, key);
        let mut blobs = self.blobs.write().map_err(poisoned)?;
        blobs.insert(stored.storage_key.clone(), upload.bytes);
        Ok(stored)
    }

    async fn get(&self, key: &str) -> BlobStoreResult<Option<Vec<u8>>> {
        check_key(key)?;
        let blobs = self.blobs.read().map_err(poisoned)?;
        Ok(blobs.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> BlobStoreResult<()> {
        check_key(key)?;
        let mut blobs = self.blobs.write().map_err(poisoned)?;
        blobs.remove(key);
        Ok(())
    }
}
