//! Shared `PostgreSQL` plumbing used by every diesel adapter.
//!
//! Connection pooling, blocking-task offload and schema migration live here
//! so that the per-context adapters only deal with rows and queries.

mod blocking;
mod migrations;

pub use blocking::{PgPool, StorageError, connect_pool, run_blocking};
pub use migrations::{MIGRATIONS, apply_migrations};
