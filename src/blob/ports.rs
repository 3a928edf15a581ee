//! Blob storage port.

use super::{StoredFile, Upload};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for blob store operations.
pub type BlobStoreResult<T> = Result<T, BlobStoreError>;

/// Content-addressed-by-key binary storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `upload` under a fresh key inside `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`BlobStoreError`] when the content cannot be written.
    async fn put(&self, namespace: &str, upload: Upload) -> BlobStoreResult<StoredFile>;

    /// Reads the content stored under `key`.
    ///
    /// Returns `None` when nothing is stored there.
    async fn get(&self, key: &str) -> BlobStoreResult<Option<Vec<u8>>>;

    /// Removes the content stored under `key`; missing keys are ignored.
    async fn delete(&self, key: &str) -> BlobStoreResult<()>;
}

/// Errors returned by blob store implementations.
#[derive(Debug, Clone, Error)]
pub enum BlobStoreError {
    /// The key would escape the store or is otherwise malformed.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Storage backend failure.
    #[error("storage error: {0}")]
    Storage(Arc<dyn std::error::Error + Send + Sync>),
}

impl BlobStoreError {
    /// Wraps a backend error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Arc::new(err))
    }
}

/// Rejects keys that are absolute, contain `..` segments or backslashes.
///
/// # Errors
///
/// Returns [`BlobStoreError::InvalidKey`] for unsafe keys.
pub fn check_key(key: &str) -> BlobStoreResult<()> {
    let unsafe_key = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|segment| segment.is_empty() || segment == "..");
    if unsafe_key {
        return Err(BlobStoreError::InvalidKey(key.to_owned()));
    }
    Ok(())
}
