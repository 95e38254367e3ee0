use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL store when set, in-memory store otherwise.
    pub database_url: Option<String>,
    pub openai_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Pause between document analysis attempts.
    pub parse_retry_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            openai_api_key: require_env("OPENAI_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            parse_retry_delay: Duration::from_millis(
                std::env::var("PARSE_RETRY_DELAY_MS")
                    .unwrap_or_else(|_| "2000".to_string())
                    .parse::<u64>()
                    .context("PARSE_RETRY_DELAY_MS must be a number of milliseconds")?,
            ),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
