//! Configuration management for the Little Bites platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with LB_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Longest accepted cache window (one year)
const MAX_CACHE_EXPIRY_HOURS: i64 = 24 * 365;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// External nutrition database configuration
    pub nutrition_api: NutritionApiConfig,

    /// Nutrition lookup cache configuration
    pub cache: CacheConfig,

    /// Scan history configuration
    pub history: HistoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NutritionApiConfig {
    /// REST endpoint of the food database
    pub base_url: String,

    /// OAuth2 token endpoint
    pub token_url: String,

    /// OAuth2 client ID
    pub client_id: String,

    /// OAuth2 client secret
    pub client_secret: String,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Write lookups back to the cache
    pub enabled: bool,

    /// Age after which a cached lookup is refetched, 0 to a year
    pub expiry_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    /// Maximum number of scanned products kept, at least 1
    pub max_entries: usize,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("LB_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self::builder(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (LB_ prefix)
            .add_source(
                Environment::with_prefix("LB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize::<Self>()?.validate()
    }

    /// Reject values the services cannot work with
    fn validate(self) -> Result<Self, ConfigError> {
        if !(0..=MAX_CACHE_EXPIRY_HOURS).contains(&self.cache.expiry_hours) {
            return Err(ConfigError::Message(format!(
                "cache.expiry_hours must be between 0 and {}",
                MAX_CACHE_EXPIRY_HOURS
            )));
        }

        if self.history.max_entries == 0 {
            return Err(ConfigError::Message(
                "history.max_entries must be at least 1".to_string(),
            ));
        }

        Ok(self)
    }

    fn builder(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("environment", environment)?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default(
                "nutrition_api.base_url",
                "https://platform.fatsecret.com/rest/server.api",
            )?
            .set_default(
                "nutrition_api.token_url",
                "https://oauth.fatsecret.com/connect/token",
            )?
            // Without credentials the server still starts; lookups fail
            .set_default("nutrition_api.client_id", "")?
            .set_default("nutrition_api.client_secret", "")?
            .set_default("nutrition_api.timeout_ms", 10000)?
            .set_default("cache.enabled", true)?
            .set_default("cache.expiry_hours", 24)?
            .set_default("history.max_entries", 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_everything_but_database_url() {
        let config: Config = Config::builder("test")
            .unwrap()
            .set_override("database.url", "postgres://localhost/little_bites")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.environment, "test");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.nutrition_api.timeout_ms, 10000);
        assert!(config.nutrition_api.client_id.is_empty());
        assert_eq!(
            config.nutrition_api.token_url,
            "https://oauth.fatsecret.com/connect/token"
        );
        assert!(config.cache.enabled);
        assert_eq!(config.cache.expiry_hours, 24);
        assert_eq!(config.history.max_entries, 100);
    }

    fn with_override(key: &str, value: i64) -> Result<Config, ConfigError> {
        Config::builder("test")
            .unwrap()
            .set_override("database.url", "postgres://localhost/little_bites")
            .unwrap()
            .set_override(key, value)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<Config>()?
            .validate()
    }

    #[test]
    fn cache_window_must_be_in_range() {
        assert!(with_override("cache.expiry_hours", 0).is_ok());
        assert!(with_override("cache.expiry_hours", 24 * 365).is_ok());
        assert!(with_override("cache.expiry_hours", -1).is_err());
        assert!(with_override("cache.expiry_hours", i64::MAX / 1000).is_err());
    }

    #[test]
    fn history_needs_room_for_one_entry() {
        assert!(with_override("history.max_entries", 1).is_ok());
        assert!(with_override("history.max_entries", 0).is_err());
        // Negative values do not fit the field at all
        assert!(with_override("history.max_entries", -5).is_err());
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let result: Result<Config, _> = Config::builder("test")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize();

        assert!(result.is_err());
    }
}
