//! Binary content storage for uploaded files, topic media and task
//! attachments.
//!
//! Metadata lives with the owning record; the bytes live behind the
//! [`ports::BlobStore`] port, keyed by an opaque storage key.

pub mod adapters;
mod file;
pub mod ports;

pub use file::{StoredFile, Upload, storage_key};

#[cfg(test)]
mod tests;
