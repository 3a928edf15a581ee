//! Filesystem blob store confined to a media root with `cap-std`.

use crate::blob::{
    StoredFile, Upload,
    ports::{BlobStore, BlobStoreError, BlobStoreResult, check_key},
    storage_key,
};
use async_trait::async_trait;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io::ErrorKind;
use std::sync::Arc;

/// Blob store writing files beneath a single media root directory.
///
/// All access goes through a capability handle on the root, so keys can
/// never reach outside it.
#[derive(Debug, Clone)]
pub struct FilesystemBlobStore {
    root: Arc<Dir>,
}

impl FilesystemBlobStore {
    /// Opens (creating if needed) the media root at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`BlobStoreError::Storage`] when the directory cannot be
    /// created or opened.
    pub fn open(path: &Utf8Path) -> BlobStoreResult<Self> {
        let authority = ambient_authority();
        Dir::create_ambient_dir_all(path, authority).map_err(BlobStoreError::storage)?;
        let root =
            Dir::open_ambient_dir(path, ambient_authority()).map_err(BlobStoreError::storage)?;
        Ok(Self {
            root: Arc::new(root),
        })
    }

    async fn run<T, F>(&self, operation: F) -> BlobStoreResult<T>
    where
        F: FnOnce(&Dir) -> BlobStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || operation(&root))
            .await
            .map_err(BlobStoreError::storage)?
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, namespace: &str, upload: Upload) -> BlobStoreResult<StoredFile> {
        let key = storage_key(namespace, &upload.file_name);
        check_key(&key)?;
        let stored = StoredFile::describe(&upload, key.clone());
        self.run(move |root| {
            if let Some(parent) = Utf8Path::new(&key).parent()
                && !parent.as_str().is_empty()
            {
                root.create_dir_all(parent).map_err(BlobStoreError::storage)?;
            }
            root.write(&key, &upload.bytes)
                .map_err(BlobStoreError::storage)
        })
        .await?;
        Ok(stored)
    }

    async fn get(&self, key: &str) -> BlobStoreResult<Option<Vec<u8>>> {
        check_key(key)?;
        let path = key.to_owned();
        self.run(move |root| match root.read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(BlobStoreError::storage(err)),
        })
        .await
    }

    async fn delete(&self, key: &str) -> BlobStoreResult<()> {
        check_key(key)?;
        let path = key.to_owned();
        self.run(move |root| match root.remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(BlobStoreError::storage(err)),
        })
        .await
    }
}
