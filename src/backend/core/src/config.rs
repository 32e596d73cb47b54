//! Configuration management.

use chrono::Duration;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{PunchError, Result};
use crate::telemetry::{LogFormat, LoggingConfig, SpanEventConfig};

const ENV_PREFIX: &str = "PUNCHCLOCK";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Clock store configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
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

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON event log
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Keep only history newer than this many days (rounded back to a session boundary)
    #[serde(default)]
    pub retention_days: Option<u32>,

    /// Keep the store in memory only
    #[serde(default)]
    pub ephemeral: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            retention_days: None,
            ephemeral: false,
        }
    }
}

impl StorageConfig {
    pub fn retention(&self) -> Option<Duration> {
        self.retention_days.map(|days| Duration::days(i64::from(days)))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Per-module log levels, e.g. `punchclock_core::engine = "trace"`
    #[serde(default)]
    pub module_levels: HashMap<String, String>,

    /// Include file and line in log lines
    #[serde(default)]
    pub include_location: bool,

    /// Include thread ids and names
    #[serde(default)]
    pub include_thread: bool,

    /// Include the module path
    #[serde(default = "default_include_target")]
    pub include_target: bool,

    /// Log span creation and close
    #[serde(default)]
    pub span_events: SpanEventConfig,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            module_levels: HashMap::new(),
            include_location: false,
            include_thread: false,
            include_target: default_include_target(),
            span_events: SpanEventConfig::default(),
        }
    }
}

impl ObservabilityConfig {
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            format: self.log_format,
            module_levels: self.module_levels.clone(),
            include_location: self.include_location,
            include_thread: self.include_thread,
            include_target: self.include_target,
            span_events: self.span_events.clone(),
        }
    }
}

// Default value functions
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8734 }
fn default_store_path() -> PathBuf { PathBuf::from("clockstore.json") }
fn default_log_level() -> String { "info".to_string() }
fn default_include_target() -> bool { true }

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a specific file path, with the environment layered on top.
    pub fn from_file(path: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(PunchError::configuration("server.host must not be empty"));
        }
        if !self.storage.ephemeral && self.storage.path.as_os_str().is_empty() {
            return Err(PunchError::configuration(
                "storage.path must be set unless storage.ephemeral is true",
            ));
        }
        if self.storage.retention_days == Some(0) {
            return Err(PunchError::configuration("storage.retention_days must be at least 1"));
        }
        Ok(())
    }
}
