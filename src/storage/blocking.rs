//! Pool construction and blocking operation helpers.

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use thiserror::Error;

/// `PostgreSQL` connection pool shared by all adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Infrastructure failure outside of query execution.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A connection could not be checked out of the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),

    /// The blocking task panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns [`StorageError::Pool`] when the initial connections cannot be
/// established.
pub fn connect_pool(database_url: &str, max_size: u32) -> Result<PgPool, StorageError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Ok(Pool::builder().max_size(max_size).build(manager)?)
}

/// Runs a synchronous diesel operation on the blocking thread pool.
///
/// `map_err` lifts pool and join failures into the caller's repository
/// error type.
pub async fn run_blocking<T, E, F, M>(pool: &PgPool, map_err: M, operation: F) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    M: Fn(StorageError) -> E + Send + Copy + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = pool
            .get()
            .map_err(|err| map_err(StorageError::Pool(err)))?;
        operation(&mut connection)
    })
    .await
    .map_err(|err| map_err(StorageError::Join(err)))?
}
