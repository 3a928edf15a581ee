//! Port contracts for account persistence and credential hashing.

mod credentials;
mod repository;

pub use credentials::{CredentialError, PasswordHasher};
pub use repository::{UserRepository, UserRepositoryError, UserRepositoryResult};
