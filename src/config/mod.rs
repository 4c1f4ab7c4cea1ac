//! Configuration module for the parish backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

/// Default Cloudflare Turnstile verification endpoint.
pub const DEFAULT_TURNSTILE_VERIFY_URL: &str =
    "https://challenges.cloudflare.com/turnstile/v0/siteverify";

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding the admin API (required in production)
    pub admin_psk: Option<String>,
    /// Turnstile secret; verification is skipped when unset
    pub turnstile_secret: Option<String>,
    /// Turnstile siteverify endpoint
    pub turnstile_verify_url: String,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let admin_psk = non_empty_var("PARISH_ADMIN_PSK");
        let turnstile_secret = non_empty_var("TURNSTILE_SECRET_KEY");

        let turnstile_verify_url = env::var("TURNSTILE_VERIFY_URL")
            .unwrap_or_else(|_| DEFAULT_TURNSTILE_VERIFY_URL.to_string());

        let db_path = env::var("PARISH_DB_PATH")
            .unwrap_or_else(|_| "./data/parish.sqlite".to_string())
            .into();

        let bind_addr_raw =
            env::var("PARISH_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = bind_addr_raw.parse().map_err(|_| {
            AppError::Internal(format!("Invalid PARISH_BIND_ADDR: {}", bind_addr_raw))
        })?;

        let log_level = env::var("PARISH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format_raw = env::var("PARISH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
        let log_format = LogFormat::parse(&log_format_raw).ok_or_else(|| {
            AppError::Internal(format!("Invalid PARISH_LOG_FORMAT: {}", log_format_raw))
        })?;

        Ok(Self {
            admin_psk,
            turnstile_secret,
            turnstile_verify_url,
            db_path,
            bind_addr,
            log_level,
            log_format,
        })
    }
}

/// Read an env var, treating blank values as unset.
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 7] = [
        "PARISH_ADMIN_PSK",
        "TURNSTILE_SECRET_KEY",
        "TURNSTILE_VERIFY_URL",
        "PARISH_DB_PATH",
        "PARISH_BIND_ADDR",
        "PARISH_LOG_LEVEL",
        "PARISH_LOG_FORMAT",
    ];

    // Env vars are process-wide, so everything touching them lives in one test.
    #[test]
    fn test_config_from_env() {
        for var in VARS {
            env::remove_var(var);
        }

        let config = Config::from_env().unwrap();

        assert!(config.admin_psk.is_none());
        assert!(config.turnstile_secret.is_none());
        assert_eq!(config.turnstile_verify_url, DEFAULT_TURNSTILE_VERIFY_URL);
        assert_eq!(config.db_path, PathBuf::from("./data/parish.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);

        env::set_var("PARISH_ADMIN_PSK", "   ");
        env::set_var("PARISH_LOG_FORMAT", "JSON");
        let config = Config::from_env().unwrap();
        assert!(config.admin_psk.is_none());
        assert_eq!(config.log_format, LogFormat::Json);

        env::set_var("PARISH_BIND_ADDR", "not-an-address");
        assert!(Config::from_env().is_err());

        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("pretty"), Some(LogFormat::Text));
        assert_eq!(LogFormat::parse(" json "), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("xml"), None);
    }
}
