//! Upload payloads and stored-file metadata.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

const MAX_FILE_NAME_CHARS: usize = 100;
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Raw upload received from a client.
#[derive(Clone, PartialEq, Eq)]
pub struct Upload {
    /// Client-supplied file name.
    pub file_name: String,
    /// Declared MIME type, if any.
    pub content_type: Option<String>,
    /// File content.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Metadata describing content held in a blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Original file name as supplied by the client.
    pub file_name: String,
    /// MIME type, defaulting to `application/octet-stream`.
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Opaque key inside the blob store.
    pub storage_key: String,
    /// Lower-case hexadecimal SHA-256 digest of the content.
    pub sha256: String,
}

impl StoredFile {
    /// Describes `upload` as it will be stored under `storage_key`.
    #[must_use]
    pub fn describe(upload: &Upload, storage_key: String) -> Self {
        let content_type = upload
            .content_type
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_ascii_lowercase();
        Self {
            file_name: upload.file_name.trim().to_owned(),
            content_type,
            size: upload.bytes.len() as u64,
            storage_key,
            sha256: format!("{:x}", Sha256::digest(&upload.bytes)),
        }
    }
}

/// Builds a fresh storage key `namespace/<uuid>-<safe-name>`.
///
/// The file name is reduced to ASCII letters, digits, `.`, `-` and `_` so
/// keys are portable across stores.
#[must_use]
pub fn storage_key(namespace: &str, file_name: &str) -> String {
    let safe: String = file_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILE_NAME_CHARS)
        .collect();
    let stem = safe.trim_start_matches('.');
    let name = if stem.is_empty() { "upload" } else { stem };
    format!("{}/{}-{name}", namespace.trim_matches('/'), Uuid::new_v4())
}
