//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `wattbridge.toml` in the working directory unless another path
//! is given on the command line or in `WATTBRIDGE_CONFIG`. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Map, Value};
use wattbridge_adapter_http_reqwest::HttpConfig;
use wattbridge_domain::device::Device;
use wattbridge_domain::error::WattbridgeError;

const DEFAULT_PATH: &str = "wattbridge.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Polling cadence.
    pub poll: PollConfig,
    /// Device HTTP client settings.
    pub http: HttpConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Devices to poll.
    pub devices: Vec<DeviceEntry>,
}

/// Polling configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between two cycles of one device.
    pub interval_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// One `[[devices]]` table.
///
/// Both the device fields and the `[[devices.components]]` tables are kept
/// as raw mappings and normalized when the device is built.
#[derive(Debug, Deserialize)]
pub struct DeviceEntry {
    #[serde(default)]
    pub components: Vec<Value>,
    #[serde(flatten)]
    pub device: Map<String, Value>,
}

impl DeviceEntry {
    /// Build the device and add every configured component to it.
    ///
    /// # Errors
    ///
    /// Returns the first device or component configuration error.
    pub fn build(&self) -> Result<Device, WattbridgeError> {
        let mut device = Device::new(Value::Object(self.device.clone()))?;
        for component in &self.components {
            device.add_component(component.clone())?;
        }
        Ok(device)
    }
}

impl Config {
    /// Load configuration from `path`, `WATTBRIDGE_CONFIG` or
    /// `wattbridge.toml` (first one set wins) then apply environment-variable
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map_or_else(
            || {
                std::env::var("WATTBRIDGE_CONFIG")
                    .map_or_else(|_| PathBuf::from(DEFAULT_PATH), PathBuf::from)
            },
            Path::to_path_buf,
        );
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(secs) = var("WATTBRIDGE_POLL_INTERVAL").and_then(|v| v.parse().ok()) {
            self.poll.interval_secs = secs;
        }
        if let Some(secs) = var("WATTBRIDGE_HTTP_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.http.timeout_secs = secs;
        }
        if let Some(filter) = var("WATTBRIDGE_LOG") {
            self.logging.filter = filter;
        }
        if let Some(filter) = var("RUST_LOG") {
            self.logging.filter = filter;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.poll.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll interval must be non-zero".to_string(),
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "http timeout must be non-zero".to_string(),
            ));
        }
        let mut seen = BTreeSet::new();
        for entry in &self.devices {
            let id = entry.device.get("id").and_then(Value::as_u64).unwrap_or_default();
            if !seen.insert(id) {
                return Err(ConfigError::Validation(format!(
                    "device id {id} is configured twice"
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll.interval_secs)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_secs: 10 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "wattbridged=info,wattbridge_app=info,wattbridge_adapter_http_reqwest=info"
                .to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
