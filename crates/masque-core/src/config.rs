//! Broker and Client configuration
//!
//! Both structs deserialize from TOML; missing fields fall back to
//! [`Default`]. Command-line flags override file values in the binary.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default Aggregator base URL; the Broker appends `/PSI`
pub const DEFAULT_AGGREGATOR_URL: &str = "http://localhost:8888";

/// Default port of the client intake server
pub const DEFAULT_CLIENT_PORT: u16 = 3001;

/// Default Broker port
pub const DEFAULT_BROKER_PORT: u16 = 50051;

/// Multipart upload limit of the intake server (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 << 20;

/// Body limit of the Broker's `POST /psi` (48 MiB)
///
/// A full intake upload of one-byte identifiers (`a,` per element) grows to
/// `"YQ==",` per element once masked and base64 encoded, so the request can
/// be 3.5 times the upload size.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 48 << 20;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// File is not valid TOML for this struct
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// Values parsed but are inconsistent
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Broker (middleman) server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Interface to bind
    pub bind_host: String,
    /// Listening port
    pub port: u16,
    /// Aggregator base URL
    pub aggregator_url: String,
    /// Upper bound on one `compute_masked` call, Aggregator round trip included
    pub request_timeout_secs: u64,
    /// Largest accepted request body
    pub max_request_bytes: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: DEFAULT_BROKER_PORT,
            aggregator_url: DEFAULT_AGGREGATOR_URL.to_string(),
            request_timeout_secs: 30,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }
}

impl BrokerConfig {
    /// Loopback configuration with short timeouts for tests
    pub fn testing() -> Self {
        Self {
            bind_host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Parse from TOML text and validate
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Load from a TOML file and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// `host:port` string to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }

    /// Request timeout as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.bind_host.is_empty() {
            return Err("bind_host must not be empty".to_string());
        }
        if !(self.aggregator_url.starts_with("http://")
            || self.aggregator_url.starts_with("https://"))
        {
            return Err(format!(
                "aggregator_url must be an http(s) URL, got '{}'",
                self.aggregator_url
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        if self.max_request_bytes == 0 {
            return Err("max_request_bytes must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Client intake server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Interface to bind
    pub bind_host: String,
    /// Listening port
    pub port: u16,
    /// Upper bound on one Broker call
    pub broker_timeout_secs: u64,
    /// Maximum accepted multipart body size in bytes
    pub max_upload_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: DEFAULT_CLIENT_PORT,
            broker_timeout_secs: 30,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ClientConfig {
    /// Loopback configuration with short timeouts for tests
    pub fn testing() -> Self {
        Self {
            bind_host: "127.0.0.1".to_string(),
            port: 0,
            broker_timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Parse from TOML text and validate
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Load from a TOML file and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// `host:port` string to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }

    /// Broker call timeout as a duration
    pub fn broker_timeout(&self) -> Duration {
        Duration::from_secs(self.broker_timeout_secs)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        if self.bind_host.is_empty() {
            return Err("bind_host must not be empty".to_string());
        }
        if self.broker_timeout_secs == 0 {
            return Err("broker_timeout_secs must be greater than 0".to_string());
        }
        if self.max_upload_bytes == 0 {
            return Err("max_upload_bytes must be greater than 0".to_string());
        }
        Ok(())
    }
}
