//! Service assembly and the HTTP server loop.

use crate::account::adapters::jwt::JwtTokenService;
use crate::api::{self, AppState, Repositories};
use crate::blob::{
    adapters::{filesystem::FilesystemBlobStore, memory::InMemoryBlobStore},
    ports::{BlobStore, BlobStoreError},
};
use crate::config::Config;
use crate::storage::{self, StorageError};
use axum::Router;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

/// Failure to start or run the server.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The database pool could not be created.
    #[error("database unavailable: {0}")]
    Database(#[from] StorageError),
    /// A schema migration failed.
    #[error("migration failed: {0}")]
    Migration(#[source] diesel::result::Error),
    /// The media root could not be opened.
    #[error("media root unavailable: {0}")]
    Media(#[from] BlobStoreError),
    /// The listener could not be bound or the server stopped abnormally.
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the state for `config`: `PostgreSQL` when a database URL is set,
/// process memory otherwise.
///
/// # Errors
///
/// Returns [`StartupError`] when the database or media root cannot be
/// prepared.
pub async fn build_state(config: &Config) -> Result<AppState, StartupError> {
    let repositories = match &config.database_url {
        Some(url) => {
            let pool = storage::connect_pool(url, config.db_pool_size)?;
            storage::run_blocking(
                &pool,
                StartupError::Database,
                |connection| {
                    storage::apply_migrations(connection).map_err(StartupError::Migration)
                },
            )
            .await?;
            tracing::info!(pool_size = config.db_pool_size, "using PostgreSQL storage");
            Repositories::postgres(&pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; data is kept in memory only");
            Repositories::in_memory()
        }
    };
    let blobs: Arc<dyn BlobStore> = match &config.media_root {
        Some(root) => {
            tracing::info!(media_root = %root, "storing uploads on disk");
            Arc::new(FilesystemBlobStore::open(root)?)
        }
        None => Arc::new(InMemoryBlobStore::new()),
    };
    let tokens = JwtTokenService::new(
        config.jwt_secret.as_bytes(),
        config.token_issuer.clone(),
        config.token_ttl(),
    );
    Ok(AppState::new(repositories, blobs, tokens))
}

/// Builds the application router for `config`.
///
/// # Errors
///
/// See [`build_state`].
pub async fn build_app(config: &Config) -> Result<Router, StartupError> {
    let state = build_state(config).await?;
    Ok(api::router(state, config.max_upload_bytes))
}

/// Serves requests until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns [`StartupError`] when start-up fails or the listener errors.
pub async fn serve(config: Config) -> Result<(), StartupError> {
    let app = build_app(&config).await?;
    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!(address = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
