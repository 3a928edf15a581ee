//! Tests for the capability-confined filesystem store.

use crate::blob::{
    Upload,
    adapters::filesystem::FilesystemBlobStore,
    ports::{BlobStore, BlobStoreError},
};
use camino::Utf8PathBuf;
use rstest::rstest;

fn scratch_root() -> Utf8PathBuf {
    let path = std::env::temp_dir().join(format!("planboard-blobs-{}", uuid::Uuid::new_v4()));
    Utf8PathBuf::from_path_buf(path).expect("temporary directory is UTF-8")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn filesystem_store_writes_reads_and_removes() {
    let root = scratch_root();
    let store = FilesystemBlobStore::open(&root).expect("media root opens");
    let upload = Upload {
        file_name: "notes.txt".to_owned(),
        content_type: Some("text/plain".to_owned()),
        bytes: b"planboard".to_vec(),
    };

    let stored = store.put("projects/p1/files", upload).await.expect("stored");
    assert!(root.join(&stored.storage_key).is_file());

    let bytes = store.get(&stored.storage_key).await.expect("readable");
    assert_eq!(bytes.as_deref(), Some(b"planboard".as_slice()));

    store.delete(&stored.storage_key).await.expect("deleted");
    assert_eq!(store.get(&stored.storage_key).await.expect("readable"), None);

    std::fs::remove_dir_all(&root).expect("scratch root removed");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn filesystem_store_refuses_escaping_keys() {
    let root = scratch_root();
    let store = FilesystemBlobStore::open(&root).expect("media root opens");

    let result = store.get("../outside").await;

    assert!(matches!(result, Err(BlobStoreError::InvalidKey(_))));
    std::fs::remove_dir_all(&root).expect("scratch root removed");
}
