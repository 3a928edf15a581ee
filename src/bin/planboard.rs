//! Runs the planboard HTTP server.
//!
//! ```text
//! PLANBOARD_JWT_SECRET=... planboard --bind 0.0.0.0:8000
//! ```
//!
//! Settings come from flags, the environment or a `.env` file; run with
//! `--help` for the full list.

use clap::Parser;
use planboard::{app, config::Config, telemetry};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let dotenv = dotenvy::dotenv();
    let config = Config::parse();
    telemetry::init(config.log_format)?;
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!(error = %err, "ignoring unreadable .env file"),
    }
    app::serve(config).await?;
    Ok(())
}
