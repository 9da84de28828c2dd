//! Configuration management for ConsultDesk services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config.toml, config.yaml)
//! - Default values
//!
//! Components receive their section struct at construction; nothing reads
//! the process environment after startup.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Consultation store configuration
    pub store: StoreConfig,

    /// Admin user configuration
    pub auth: AuthConfig,

    /// Form-relay notification configuration
    pub notify: NotifyConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Base URL of the remote data service. When absent the store runs in
    /// mock mode and every operation serves fallback data.
    pub url: Option<String>,

    /// Service API key for the remote data service
    pub api_key: Option<String>,

    /// Table exposed through the REST interface
    #[serde(default = "default_table")]
    pub table: String,

    /// Request timeout in seconds for remote calls
    #[serde(default = "default_store_timeout")]
    pub request_timeout_secs: u64,
}

impl StoreConfig {
    /// Whether a remote data service is configured at all
    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.api_key.is_some()
    }

    /// Request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            table: default_table(),
            request_timeout_secs: default_store_timeout(),
        }
    }
}

/// A configured admin user
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminUser {
    pub username: String,

    /// SHA-256 hex digest of the password
    pub password_sha256: String,

    /// Role name: admin, manager, or viewer
    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Users allowed to authenticate
    #[serde(default)]
    pub users: Vec<AdminUser>,
}

impl AuthConfig {
    /// Look up a user by name
    pub fn find_user(&self, username: &str) -> Option<&AdminUser> {
        self.users.iter().find(|u| u.username == username)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NotifyConfig {
    /// Form-relay endpoint for submission notifications. When absent,
    /// notifications are skipped.
    pub endpoint: Option<String>,

    /// Access key sent in the relay payload
    pub access_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests per second
    #[serde(default = "default_rate_limit")]
    pub requests_per_second: u32,

    /// Burst capacity
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_table() -> String { "consultations".to_string() }
fn default_store_timeout() -> u64 { 10 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "consultdesk".to_string() }
fn default_rate_limit() -> u32 { 50 }
fn default_burst() -> u32 { 100 }
fn default_enabled() -> bool { true }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?

            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__STORE__URL=https://xyz.supabase.co
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            store: StoreConfig::default(),
            auth: AuthConfig::default(),
            notify: NotifyConfig::default(),
            observability: ObservabilityConfig {
                log_level: default_log_level(),
                json_logging: default_json_logging(),
                metrics_port: default_metrics_port(),
                service_name: default_service_name(),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: default_rate_limit(),
                burst: default_burst(),
                enabled: default_enabled(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.table, "consultations");
        assert!(!config.store.is_configured());
        assert!(config.auth.users.is_empty());
    }

    #[test]
    fn test_store_configured() {
        let store = StoreConfig {
            url: Some("https://xyz.supabase.co".into()),
            api_key: Some("service-key".into()),
            ..StoreConfig::default()
        };
        assert!(store.is_configured());
        assert_eq!(store.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_find_user() {
        let auth = AuthConfig {
            users: vec![AdminUser {
                username: "alice".into(),
                password_sha256: "00".into(),
                role: "admin".into(),
            }],
        };
        assert!(auth.find_user("alice").is_some());
        assert!(auth.find_user("bob").is_none());
    }
}
