use std::{net::SocketAddr, time::Duration};

use thiserror::Error;

use crate::market_data::yahoo::{DEFAULT_BASE_URL, DEFAULT_SESSION_URL};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    /// `None` runs against in-memory stores
    pub database_url: Option<String>,
    pub db_pool_size: u32,
    pub run_migrations: bool,
    /// `None` means a random secret is generated at startup
    pub jwt_secret: Option<Vec<u8>>,
    pub jwt_ttl: Duration,
    pub cookie_secure: bool,
    pub cors_allow: Vec<String>,
    pub market_data_base_url: String,
    pub market_data_session_url: String,
    pub market_data_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let listen_addr: SocketAddr = parse_or(&var, "LISTEN_ADDR", "127.0.0.1:3000".parse().ok())?;
        let db_pool_size: u32 = parse_or(&var, "DB_POOL_MAX_SIZE", Some(20))?;
        if db_pool_size == 0 {
            return Err(invalid("DB_POOL_MAX_SIZE", "0", "must be at least 1"));
        }

        let run_migrations = parse_bool(&var, "RUN_MIGRATIONS", true)?;
        let cookie_secure = parse_bool(&var, "COOKIE_SECURE", false)?;

        let jwt_ttl_hours: u64 = parse_or(&var, "JWT_TTL_HOURS", Some(168))?;
        if jwt_ttl_hours == 0 {
            return Err(invalid("JWT_TTL_HOURS", "0", "must be at least 1"));
        }

        let timeout_secs: u64 = parse_or(&var, "MARKET_DATA_TIMEOUT_SECS", Some(10))?;

        let cors_allow = var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            listen_addr,
            database_url: var("DATABASE_URL"),
            db_pool_size,
            run_migrations,
            jwt_secret: var("JWT_SECRET").map(String::into_bytes),
            jwt_ttl: Duration::from_secs(jwt_ttl_hours * 3600),
            cookie_secure,
            cors_allow,
            market_data_base_url: var("MARKET_DATA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            market_data_session_url: var("MARKET_DATA_SESSION_URL")
                .unwrap_or_else(|| DEFAULT_SESSION_URL.to_string()),
            market_data_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn invalid(name: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_or<T, V>(var: &V, name: &'static str, default: Option<T>) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    V: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw.parse().map_err(|e: T::Err| invalid(name, &raw, e.to_string())),
        None => default.ok_or_else(|| invalid(name, "", "no default available")),
    }
}

fn parse_bool<V>(var: &V, name: &'static str, default: bool) -> Result<bool, ConfigError>
where
    V: Fn(&str) -> Option<String>,
{
    match var(name).map(|v| v.to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(invalid(name, &v, "expected a boolean")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:3000".parse().unwrap());
        assert!(config.database_url.is_none());
        assert_eq!(config.db_pool_size, 20);
        assert!(config.run_migrations);
        assert!(config.jwt_secret.is_none());
        assert_eq!(config.jwt_ttl, Duration::from_secs(168 * 3600));
        assert!(!config.cookie_secure);
        assert_eq!(config.cors_allow, vec!["*"]);
        assert_eq!(config.market_data_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.market_data_session_url, DEFAULT_SESSION_URL);
        assert_eq!(config.market_data_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("LISTEN_ADDR", "0.0.0.0:8080"),
            ("DATABASE_URL", "postgres://localhost/tickers"),
            ("RUN_MIGRATIONS", "false"),
            ("JWT_SECRET", "s3cret"),
            ("COOKIE_SECURE", "TRUE"),
            ("CORS_ALLOW_ORIGINS", "http://a.test, http://b.test,"),
        ])
        .unwrap();

        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/tickers"));
        assert!(!config.run_migrations);
        assert_eq!(config.jwt_secret.as_deref(), Some(&b"s3cret"[..]));
        assert!(config.cookie_secure);
        assert_eq!(config.cors_allow, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = config_from(&[("DATABASE_URL", "  "), ("JWT_SECRET", "")]).unwrap();
        assert!(config.database_url.is_none());
        assert!(config.jwt_secret.is_none());
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(config_from(&[("LISTEN_ADDR", "not an addr")]).is_err());
        assert!(config_from(&[("DB_POOL_MAX_SIZE", "0")]).is_err());
        assert!(config_from(&[("JWT_TTL_HOURS", "-1")]).is_err());
        assert!(config_from(&[("RUN_MIGRATIONS", "maybe")]).is_err());
    }
}
