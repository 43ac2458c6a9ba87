//! Server configuration from environment variables.

use vocabase_core::defaults::{
    ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS, UPLOAD_ALLOWED_TYPES, UPLOAD_MAX_BYTES,
};
use vocabase_core::{Error, Result};

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Mail relay settings. Read from the environment for parity with existing
/// deployments, but no mail is ever sent (password reset is stubbed).
#[derive(Debug, Clone, Default)]
pub struct EmailConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub pass: Option<String>,
}

/// Runtime configuration for the API server.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Secret for access tokens.
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub jwt_expire_secs: i64,
    /// Secret for refresh tokens; must differ from `jwt_secret` so one token
    /// class cannot be replayed as the other.
    pub jwt_refresh_secret: String,
    pub jwt_refresh_expire_secs: i64,
    /// Directory for content-addressed file storage.
    pub upload_dir: String,
    pub upload_max_bytes: usize,
    /// Accepted MIME types for import.
    pub upload_allowed_types: Vec<String>,
    /// Comma-separated CORS origin whitelist.
    pub allowed_origins: String,
    pub email: EmailConfig,
}

impl Config {
    /// Load configuration from the environment. Secrets are required; the
    /// rest falls back to development defaults.
    pub fn from_env() -> Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| Error::Config("JWT_SECRET must be set".to_string()))?;
        let jwt_refresh_secret = std::env::var("JWT_REFRESH_SECRET")
            .map_err(|_| Error::Config("JWT_REFRESH_SECRET must be set".to_string()))?;
        if jwt_secret == jwt_refresh_secret {
            return Err(Error::Config(
                "JWT_SECRET and JWT_REFRESH_SECRET must differ".to_string(),
            ));
        }

        let upload_allowed_types = std::env::var("UPLOAD_ALLOWED_TYPES")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| {
                UPLOAD_ALLOWED_TYPES
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            });

        Ok(Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse("PORT", 3000),
            database_url: env_or("DATABASE_URL", "postgres://localhost/vocabase"),
            jwt_secret,
            jwt_expire_secs: env_parse("JWT_EXPIRE_SECS", ACCESS_TOKEN_TTL_SECS),
            jwt_refresh_secret,
            jwt_refresh_expire_secs: env_parse("JWT_REFRESH_EXPIRE_SECS", REFRESH_TOKEN_TTL_SECS),
            upload_dir: env_or("UPLOAD_DIR", "/var/lib/vocabase/uploads"),
            upload_max_bytes: env_parse("UPLOAD_MAX_BYTES", UPLOAD_MAX_BYTES),
            upload_allowed_types,
            allowed_origins: env_or("ALLOWED_ORIGINS", "http://localhost:3000"),
            email: EmailConfig {
                host: std::env::var("EMAIL_HOST").ok(),
                port: std::env::var("EMAIL_PORT").ok().and_then(|v| v.parse().ok()),
                user: std::env::var("EMAIL_USER").ok(),
                pass: std::env::var("EMAIL_PASS").ok(),
            },
        })
    }
}
