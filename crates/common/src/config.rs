use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_USER_SERVICE_URL: &str = "http://localhost:8080";
pub const DEFAULT_PRODUCT_SERVICE_URL: &str = "http://localhost:8081";
pub const DEFAULT_PORT: u16 = 8082;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

/// Database configuration. Absent means the in-memory order store is used.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Database URL with the password masked, for logging
    pub fn redacted_url(&self) -> String {
        match (self.url.find("://"), self.url.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                let credentials = &self.url[scheme_end + 3..at];
                match credentials.split_once(':') {
                    Some((user, _)) => format!(
                        "{}{}:***{}",
                        &self.url[..scheme_end + 3],
                        user,
                        &self.url[at..]
                    ),
                    None => self.url.clone(),
                }
            }
            _ => self.url.clone(),
        }
    }
}

/// How the order service reaches the user and product services
#[derive(Debug, Clone, Deserialize)]
pub struct DependencyConfig {
    pub user_service_url: String,
    pub product_service_url: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub circuit_breaker_enabled: bool,
    pub circuit_breaker_failure_threshold: u32,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            user_service_url: DEFAULT_USER_SERVICE_URL.to_string(),
            product_service_url: DEFAULT_PRODUCT_SERVICE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            max_retries: 0,
            retry_backoff: Duration::from_millis(100),
            circuit_breaker_enabled: false,
            circuit_breaker_failure_threshold: 5,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub port: u16,
    pub log_level: String,
    pub concurrent_fetch: bool,
    pub dependencies: DependencyConfig,
    pub database: Option<DatabaseConfig>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
            concurrent_fetch: false,
            dependencies: DependencyConfig::default(),
            database: None,
        }
    }
}

impl ServiceConfig {
    /// Build configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Unset or blank keys
    /// fall back to their defaults; malformed values are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = DependencyConfig::default();

        let dependencies = DependencyConfig {
            user_service_url: get("USER_SERVICE_URL").unwrap_or(defaults.user_service_url),
            product_service_url: get("PRODUCT_SERVICE_URL")
                .unwrap_or(defaults.product_service_url),
            request_timeout: parse_or(&get, "REMOTE_TIMEOUT_MS", 10_000u64)
                .map(Duration::from_millis)?,
            max_retries: parse_or(&get, "REMOTE_MAX_RETRIES", defaults.max_retries)?,
            retry_backoff: parse_or(&get, "REMOTE_RETRY_BACKOFF_MS", 100u64)
                .map(Duration::from_millis)?,
            circuit_breaker_enabled: parse_or(&get, "CIRCUIT_BREAKER_ENABLED", false)?,
            circuit_breaker_failure_threshold: parse_or(
                &get,
                "CIRCUIT_BREAKER_FAILURE_THRESHOLD",
                defaults.circuit_breaker_failure_threshold,
            )?,
        };

        let database = match get("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 10u32)?,
            }),
            None => None,
        };

        Ok(Self {
            port: parse_or(&get, "PORT", DEFAULT_PORT)?,
            log_level: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            concurrent_fetch: parse_or(&get, "CONCURRENT_FETCH", false)?,
            dependencies,
            database,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}
