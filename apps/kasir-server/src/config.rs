//! Server configuration.
//!
//! Loaded from environment variables with fallback to defaults.
//!
//! | Variable                   | Default     |
//! |----------------------------|-------------|
//! | `KASIR_HOST`               | `0.0.0.0`   |
//! | `SERVER_PORT`              | `2022`      |
//! | `KASIR_DB_PATH`            | `kasir.db`  |
//! | `KASIR_DB_MAX_CONNECTIONS` | `5`         |
//! | `KASIR_ACTING_USER_ID`     | `1`         |

use std::env;
use std::str::FromStr;

use kasir_core::DEFAULT_ACTING_USER_ID;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,

    /// HTTP port.
    pub port: u16,

    /// SQLite database file.
    pub db_path: String,

    /// Upper bound of the connection pool.
    pub db_max_connections: u32,

    /// User recorded on transactions, stock movements and drawer entries.
    pub acting_user_id: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 2022,
            db_path: "kasir.db".to_string(),
            db_max_connections: 5,
            acting_user_id: DEFAULT_ACTING_USER_ID,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();

        let config = ServerConfig {
            host: lookup("KASIR_HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "SERVER_PORT", defaults.port)?,
            db_path: lookup("KASIR_DB_PATH").unwrap_or(defaults.db_path),
            db_max_connections: parse_or(
                &lookup,
                "KASIR_DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
            )?,
            acting_user_id: parse_or(&lookup, "KASIR_ACTING_USER_ID", defaults.acting_user_id)?,
        };

        if config.host.trim().is_empty() {
            return Err(ConfigError::MissingRequired("KASIR_HOST".to_string()));
        }
        if config.db_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("KASIR_DB_PATH".to_string()));
        }
        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("KASIR_DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    /// `host:port`, resolved by the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
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

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 2022);
        assert_eq!(config.acting_user_id, 1);
        assert_eq!(config.bind_address(), "0.0.0.0:2022");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("KASIR_HOST", "127.0.0.1"),
            ("SERVER_PORT", "8080"),
            ("KASIR_DB_PATH", "/var/lib/kasir/toko.db"),
            ("KASIR_DB_MAX_CONNECTIONS", "10"),
            ("KASIR_ACTING_USER_ID", "7"),
        ])
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_path, "/var/lib/kasir/toko.db");
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.acting_user_id, 7);
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("SERVER_PORT", "lima")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "SERVER_PORT"));
    }

    #[test]
    fn test_zero_pool_size_rejected() {
        let err = load(&[("KASIR_DB_MAX_CONNECTIONS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_empty_db_path_rejected() {
        let err = load(&[("KASIR_DB_PATH", " ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(_)));
    }
}
