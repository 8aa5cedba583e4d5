use anyhow::{bail, Context, Result};
use tracing::warn;

/// Environment variable holding the Postgres connection string.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Older deployments exported the connection string under this name.
/// Still honoured when `DATABASE_URL` is absent.
pub const LEGACY_DATABASE_URL_VAR: &str = "NEON_DATABASE_URL";

/// Application configuration loaded from environment variables.
/// Fails at startup if no database URL is available.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: resolve_database_url(
                std::env::var(DATABASE_URL_VAR).ok(),
                std::env::var(LEGACY_DATABASE_URL_VAR).ok(),
            )?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn resolve_database_url(primary: Option<String>, legacy: Option<String>) -> Result<String> {
    match (primary, legacy) {
        (Some(url), _) if !url.is_empty() => Ok(url),
        (_, Some(url)) if !url.is_empty() => {
            warn!("{LEGACY_DATABASE_URL_VAR} is deprecated, set {DATABASE_URL_VAR} instead");
            Ok(url)
        }
        _ => bail!("Required environment variable '{DATABASE_URL_VAR}' is not set"),
    }
}
