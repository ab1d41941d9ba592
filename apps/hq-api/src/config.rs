//! HQ API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use harbor_core::DEFAULT_NUMBER_ATTEMPTS;
use harbor_db::{DbConfig, ServiceConfig};

/// HQ API configuration.
#[derive(Debug, Clone)]
pub struct HqConfig {
    /// HTTP bind host
    pub http_host: String,

    /// HTTP port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// Wait for a pooled connection before giving up
    pub db_connect_timeout: Duration,

    /// Insert attempts for an order or check number before failing
    pub document_number_attempts: u32,
}

impl HqConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup (the process environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = HqConfig {
            http_host: lookup("HTTP_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),

            http_port: parse_or(&lookup, "HTTP_PORT", 8080)?,

            database_path: lookup("DATABASE_PATH")
                .unwrap_or_else(|| "./data/harbor.db".to_string())
                .into(),

            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 8)?,

            db_connect_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DB_CONNECT_TIMEOUT_SECS",
                30,
            )?),

            document_number_attempts: parse_or(
                &lookup,
                "DOCUMENT_NUMBER_ATTEMPTS",
                DEFAULT_NUMBER_ATTEMPTS,
            )?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }
        if config.document_number_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "DOCUMENT_NUMBER_ATTEMPTS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.http_host, self.http_port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("HTTP_HOST".to_string()))
    }

    /// Pool settings for harbor-db.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.db_max_connections)
            .connect_timeout(self.db_connect_timeout)
    }

    /// Transaction settings for harbor-db.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig::default().number_attempts(self.document_number_attempts)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<HqConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HqConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.http_host, "0.0.0.0");
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.database_path, PathBuf::from("./data/harbor.db"));
        assert_eq!(config.db_max_connections, 8);
        assert_eq!(config.db_connect_timeout, Duration::from_secs(30));
        assert_eq!(config.document_number_attempts, 5);
        assert_eq!(config.bind_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("HTTP_HOST", "127.0.0.1"),
            ("HTTP_PORT", "9000"),
            ("DATABASE_PATH", "/tmp/hq.db"),
            ("DOCUMENT_NUMBER_ATTEMPTS", "3"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(config.database_path, PathBuf::from("/tmp/hq.db"));
        assert_eq!(config.service_config().number_attempts, 3);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("HTTP_PORT", "eighty")]),
            Err(ConfigError::InvalidValue(key)) if key == "HTTP_PORT"
        ));
        assert!(matches!(
            load(&[("DOCUMENT_NUMBER_ATTEMPTS", "0")]),
            Err(ConfigError::InvalidValue(key)) if key == "DOCUMENT_NUMBER_ATTEMPTS"
        ));
        assert!(load(&[("DB_MAX_CONNECTIONS", "0")]).is_err());
    }
}
