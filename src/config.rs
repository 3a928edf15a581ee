//! Runtime configuration read from flags, the environment and `.env`.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;

/// Output format of log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Server settings.
///
/// Every flag falls back to an environment variable; the binary loads a
/// `.env` file from the working directory before parsing.
#[derive(Debug, Clone, Parser)]
#[command(name = "planboard", version, about = "Project, idea and task planning service")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "PLANBOARD_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// `PostgreSQL` connection URL; the in-memory store is used when unset.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled database connections.
    #[arg(long, env = "PLANBOARD_DB_POOL_SIZE", default_value_t = 10)]
    pub db_pool_size: u32,

    /// Secret used to sign bearer tokens.
    #[arg(long, env = "PLANBOARD_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Bearer token lifetime.
    #[arg(long, env = "PLANBOARD_TOKEN_TTL_MINUTES", default_value_t = 1440)]
    pub token_ttl_minutes: u32,

    /// Issuer claim written into and required from bearer tokens.
    #[arg(long, env = "PLANBOARD_TOKEN_ISSUER", default_value = "planboard")]
    pub token_issuer: String,

    /// Directory for uploaded files; uploads stay in memory when unset.
    #[arg(long, env = "PLANBOARD_MEDIA_ROOT")]
    pub media_root: Option<Utf8PathBuf>,

    /// Largest accepted request body.
    #[arg(long, env = "PLANBOARD_MAX_UPLOAD_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// Log line format.
    #[arg(long, env = "PLANBOARD_LOG_FORMAT", value_enum, default_value_t)]
    pub log_format: LogFormat,
}

impl Config {
    /// Token lifetime as a duration.
    #[must_use]
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.token_ttl_minutes))
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, LogFormat};
    use clap::Parser;
    use rstest::rstest;

    #[rstest]
    fn applies_defaults_for_optional_settings() {
        let config = Config::try_parse_from(["planboard", "--jwt-secret", "s3cret"])
            .expect("defaults should parse");
        assert_eq!(config.bind.port(), 8000);
        assert_eq!(config.db_pool_size, 10);
        assert_eq!(config.token_issuer, "planboard");
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.token_ttl(), chrono::Duration::minutes(1440));
    }

    #[rstest]
    fn parses_json_log_format_and_media_root() {
        let config = Config::try_parse_from([
            "planboard",
            "--jwt-secret",
            "s3cret",
            "--log-format",
            "json",
            "--media-root",
            "/srv/media",
        ])
        .expect("flags should parse");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.media_root.as_ref().map(|root| root.as_str()),
            Some("/srv/media")
        );
    }

    #[rstest]
    fn rejects_malformed_bind_address() {
        let parsed = Config::try_parse_from([
            "planboard",
            "--jwt-secret",
            "s3cret",
            "--bind",
            "not-an-address",
        ]);
        assert!(parsed.is_err());
    }
}
