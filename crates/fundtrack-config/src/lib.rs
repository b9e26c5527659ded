//! Configuration management for fundtrack
//!
//! Configuration is read from an optional YAML file, then overridden by
//! environment variables, then validated.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::Path;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Cross-origin settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// The single origin allowed to call the API
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: default_allowed_origin(),
        }
    }
}

fn default_allowed_origin() -> String {
    "https://ishasfund.netlify.app".to_string()
}

/// Record store backend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// MongoDB document store
    Mongo,
    /// Process-local store, contents are lost on restart
    Memory,
}

impl Default for StoreBackend {
    fn default() -> Self {
        StoreBackend::Mongo
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Mongo => write!(f, "mongo"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// MongoDB connection string
    #[serde(default)]
    pub uri: Option<String>,
    /// Database used when the connection string names none
    #[serde(default = "default_database")]
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            uri: None,
            database: default_database(),
        }
    }
}

fn default_database() -> String {
    "fundtrack".to_string()
}

/// Outbound mail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// SMTP relay host
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// Mail account, also used as the sender address
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Recipient of donation notifications
    #[serde(default)]
    pub admin_address: Option<String>,
    #[serde(default = "default_subject")]
    pub subject: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            username: None,
            password: None,
            admin_address: None,
            subject: default_subject(),
        }
    }
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_subject() -> String {
    "Donation Received".to_string()
}

impl MailConfig {
    /// Whether enough is configured to actually deliver mail
    pub fn is_deliverable(&self) -> bool {
        self.username.is_some() && self.password.is_some() && self.admin_address.is_some()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from an optional YAML file and the process environment
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_yaml_file(path)?
        } else {
            log::warn!("Config file not found: {}, using defaults", path.display());
            Config::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.normalize();
        config.validate()?;

        Ok(config)
    }

    /// Parse a YAML file without applying overrides
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })
    }

    /// Apply environment-style overrides from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "PORT".to_string(),
                reason: format!("'{}' is not a valid port", port),
            })?;
        }
        if let Some(origin) = lookup("CORS_ORIGIN") {
            self.cors.allowed_origin = origin;
        }
        if let Some(backend) = lookup("STORE_BACKEND") {
            self.store.backend = backend.parse().map_err(|reason| ConfigError::InvalidValue {
                field: "STORE_BACKEND".to_string(),
                reason,
            })?;
        }
        if let Some(uri) = lookup("MONGO_URI") {
            self.store.uri = Some(uri);
        }
        if let Some(database) = lookup("MONGO_DB") {
            self.store.database = database;
        }
        if let Some(host) = lookup("SMTP_HOST") {
            self.mail.smtp_host = host;
        }
        if let Some(username) = lookup("EMAIL") {
            self.mail.username = Some(username);
        }
        if let Some(password) = lookup("EMAIL_PASS") {
            self.mail.password = Some(password);
        }
        if let Some(admin) = lookup("ADMIN_EMAIL") {
            self.mail.admin_address = Some(admin);
        }
        Ok(())
    }

    /// Strip the trailing slash browsers never send in an Origin header
    pub fn normalize(&mut self) {
        let trimmed = self.cors.allowed_origin.trim().trim_end_matches('/');
        self.cors.allowed_origin = trimmed.to_string();
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        let origin = &self.cors.allowed_origin;
        let has_scheme = origin.starts_with("http://") || origin.starts_with("https://");
        if !has_scheme || origin.ends_with("://") {
            return Err(ConfigError::InvalidValue {
                field: "cors.allowed_origin".to_string(),
                reason: format!("'{}' is not an http(s) origin", origin),
            });
        }

        if self.store.backend == StoreBackend::Mongo && self.store.uri.is_none() {
            return Err(ConfigError::MissingField {
                field: "store.uri".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.store.backend, StoreBackend::Mongo);
        assert_eq!(config.mail.subject, "Donation Received");
        assert!(!config.mail.is_deliverable());
    }

    #[test]
    fn test_default_template_parses() {
        let config = Config::from_yaml_str(Config::generate_default()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.store.database, "fundtrack");
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("PORT", "8080"),
            ("MONGO_URI", "mongodb://localhost:27017/funds"),
            ("EMAIL", "sender@example.com"),
            ("EMAIL_PASS", "secret"),
            ("ADMIN_EMAIL", "admin@example.com"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.uri.as_deref(), Some("mongodb://localhost:27017/funds"));
        assert!(config.mail.is_deliverable());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_port_override() {
        let vars = env(&[("PORT", "eighty")]);
        let mut config = Config::default();
        let err = config.apply_overrides(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_mongo_requires_uri() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { ref field } if field == "store.uri"));
    }

    #[test]
    fn test_memory_backend_needs_no_uri() {
        let vars = env(&[("STORE_BACKEND", "memory")]);
        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_origin_trailing_slash_is_stripped() {
        let mut config = Config::default();
        config.cors.allowed_origin = "https://ishasfund.netlify.app/".to_string();
        config.normalize();
        assert_eq!(config.cors.allowed_origin, "https://ishasfund.netlify.app");
    }

    #[test]
    fn test_origin_without_scheme_rejected() {
        let mut config = Config::default();
        config.store.backend = StoreBackend::Memory;
        config.cors.allowed_origin = "ishasfund.netlify.app".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_password_not_serialized() {
        let mut config = Config::default();
        config.mail.password = Some("hunter2".to_string());
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("hunter2"));
    }
}
