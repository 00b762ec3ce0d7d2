//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: `CATALOG_`, nested keys split on `__`)
//! 2. The file named by `CATALOG_CONFIG`, if set
//! 3. Current working directory: `./config.toml`
//! 4. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

/// Environment variable naming an extra config file
pub const CONFIG_PATH_ENV: &str = "CATALOG_CONFIG";

const ENV_PREFIX: &str = "CATALOG_";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Middleware configuration
    #[serde(default)]
    pub middleware: MiddlewareConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log filter directive (trace, debug, info, warn, error, or a full `EnvFilter` string)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format: `json` or `pretty`
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Request timeout in seconds; also the deadline given to storage calls
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Environment (dev, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx SQLite connection URL
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum idle connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// Maximum retry attempts for establishing database connection
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between retry attempts in seconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_secs: default_connection_timeout(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay(),
        }
    }
}

/// Middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Request body size limit in MB
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,

    /// CORS mode: `permissive`, `restrictive` or `disabled`
    #[serde(default = "default_cors_mode")]
    pub cors_mode: String,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            body_limit_mb: default_body_limit_mb(),
            cors_mode: default_cors_mode(),
        }
    }
}

// Default value functions
fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_database_url() -> String {
    "sqlite://items.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    2
}

fn default_body_limit_mb() -> usize {
    1
}

fn default_cors_mode() -> String {
    "permissive".to_string()
}

impl Config {
    /// Load configuration from all sources
    ///
    /// `./config.toml` is read if present, then the file named by
    /// `CATALOG_CONFIG`. Environment variables override both, e.g.
    /// `CATALOG_SERVICE__PORT=9000` or `CATALOG_DATABASE__URL=...`.
    pub fn load() -> Result<Self> {
        let mut config_paths = vec![PathBuf::from("config.toml")];
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            config_paths.push(PathBuf::from(path));
        }

        let mut figment = Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Config::default()));

        // Later files override earlier ones
        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        // Environment variables have highest priority
        figment = figment.merge(Self::env());

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Skips `./config.toml` and `CATALOG_CONFIG`; environment variables still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Self::env())
            .extract()?;

        Ok(config)
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX)
            .ignore(&["CONFIG"])
            .split("__")
    }

    /// Request body limit in bytes
    pub fn body_limit_bytes(&self) -> usize {
        self.middleware.body_limit_mb * 1024 * 1024
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "item-catalog".to_string(),
                port: default_port(),
                log_level: default_log_level(),
                log_format: default_log_format(),
                timeout_secs: default_timeout(),
                environment: default_environment(),
            },
            database: DatabaseConfig::default(),
            middleware: MiddlewareConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.port, 8080);
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.service.timeout(), Duration::from_secs(30));
        assert_eq!(config.database.max_retries, 5);
        assert_eq!(config.body_limit_bytes(), 1024 * 1024);
    }

    #[test]
    fn test_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [service]
                name = "catalog-test"
                port = 9100

                [database]
                url = "sqlite::memory:"
                "#,
            )?;

            let config = Config::load().expect("config loads");
            assert_eq!(config.service.name, "catalog-test");
            assert_eq!(config.service.port, 9100);
            assert_eq!(config.service.log_level, "info");
            assert_eq!(config.database.url, "sqlite::memory:");
            assert_eq!(config.database.max_connections, 10);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[service]\nname = \"from-file\"\nport = 9100\n")?;
            jail.set_env("CATALOG_SERVICE__PORT", "9200");
            jail.set_env("CATALOG_MIDDLEWARE__CORS_MODE", "disabled");

            let config = Config::load().expect("config loads");
            assert_eq!(config.service.name, "from-file");
            assert_eq!(config.service.port, 9200);
            assert_eq!(config.middleware.cors_mode, "disabled");
            Ok(())
        });
    }

    #[test]
    fn test_config_env_names_extra_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[service]\nname = \"base\"\ntimeout_secs = 5\n")?;
            jail.create_file("override.toml", "[service]\nname = \"override\"\n")?;
            jail.set_env(CONFIG_PATH_ENV, "override.toml");

            let config = Config::load().expect("config loads");
            assert_eq!(config.service.name, "override");
            assert_eq!(config.service.timeout_secs, 5);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_value_is_config_error() {
        Jail::expect_with(|jail| {
            jail.set_env("CATALOG_SERVICE__PORT", "not-a-port");

            let err = Config::load_from("missing.toml").unwrap_err();
            assert!(matches!(err, crate::error::Error::Config(_)));
            Ok(())
        });
    }
}
