//! Password hashing port.

use thiserror::Error;

/// Failure inside a password hashing backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("credential backend failure: {0}")]
pub struct CredentialError(pub String);

/// One-way password hashing.
///
/// Implementations are CPU-bound and synchronous; services call them from a
/// blocking task.
pub trait PasswordHasher: Send + Sync {
    /// Hashes `password` into a self-describing string.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] when the backend fails.
    fn hash(&self, password: &str) -> Result<String, CredentialError>;

    /// Checks `password` against a stored hash.
    ///
    /// Returns `Ok(false)` for a wrong password.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] when the stored hash is unreadable.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialError>;
}
