//! Test doubles shared by the account tests.

use crate::account::ports::{CredentialError, PasswordHasher};

/// Reversible hasher that keeps service tests fast.
#[derive(Debug, Default)]
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialError> {
        hash.strip_prefix("plain$")
            .map(|stored| stored == password)
            .ok_or_else(|| CredentialError("unreadable hash".to_owned()))
    }
}
