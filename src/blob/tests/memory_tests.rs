//! Tests for upload metadata and the in-memory store.

use crate::blob::{
    StoredFile, Upload,
    adapters::memory::InMemoryBlobStore,
    ports::{BlobStore, BlobStoreError, check_key},
    storage_key,
};
use rstest::{fixture, rstest};

#[fixture]
fn upload() -> Upload {
    Upload {
        file_name: "Quarterly Report (final).pdf".to_owned(),
        content_type: Some("Application/PDF".to_owned()),
        bytes: b"hello".to_vec(),
    }
}

#[rstest]
fn describe_records_size_digest_and_normalised_type(upload: Upload) {
    let stored = StoredFile::describe(&upload, "ns/key".to_owned());

    assert_eq!(stored.size, 5);
    assert_eq!(stored.content_type, "application/pdf");
    assert_eq!(
        stored.sha256,
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
}

#[rstest]
fn missing_content_type_defaults_to_octet_stream(mut upload: Upload) {
    upload.content_type = None;
    let stored = StoredFile::describe(&upload, "ns/key".to_owned());
    assert_eq!(stored.content_type, "application/octet-stream");
}

#[rstest]
fn storage_keys_are_sanitised_and_namespaced() {
    let key = storage_key("/projects/abc/", "../../etc/passwd");

    assert!(key.starts_with("projects/abc/"));
    assert!(key.ends_with("-_.._etc_passwd"));
    assert!(check_key(&key).is_ok());
}

#[rstest]
#[case("")]
#[case("/absolute")]
#[case("a/../b")]
#[case("a//b")]
#[case("a\\b")]
fn unsafe_keys_are_rejected(#[case] key: &str) {
    assert!(matches!(check_key(key), Err(BlobStoreError::InvalidKey(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn memory_store_round_trips_and_deletes(upload: Upload) {
    let store = InMemoryBlobStore::new();
    let stored = store.put("tasks/1", upload).await.expect("stored");

    let bytes = store.get(&stored.storage_key).await.expect("readable");
    assert_eq!(bytes.as_deref(), Some(b"hello".as_slice()));

    store.delete(&stored.storage_key).await.expect("deleted");
    store.delete(&stored.storage_key).await.expect("second delete is a no-op");
    assert!(store.is_empty());
}
