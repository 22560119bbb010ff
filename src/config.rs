//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub readings: ReadingsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Record database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

fn default_database_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("envmon").join("envmon.db").to_string_lossy().to_string())
        .unwrap_or_else(|| "./envmon_data/envmon.db".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// External readings source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingsConfig {
    /// Prefix for bare Apps Script ids; the final URL is `<script_base>/<id>/exec`
    #[serde(default = "default_script_base")]
    pub script_base: String,

    #[serde(default = "default_readings_timeout")]
    pub request_timeout_ms: u64,

    /// Number of samples in the chart window
    #[serde(default = "default_window")]
    pub default_window: usize,

    /// Hosts a full-URL locator may point at, besides the host of `script_base`
    #[serde(default = "default_allowed_hosts")]
    pub allowed_hosts: Vec<String>,

    /// Largest feed body accepted from a source
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

fn default_script_base() -> String {
    "https://script.google.com/macros/s".to_string()
}

fn default_readings_timeout() -> u64 {
    10_000
}

fn default_window() -> usize {
    24
}

fn default_allowed_hosts() -> Vec<String> {
    vec![
        "script.google.com".to_string(),
        "script.googleusercontent.com".to_string(),
    ]
}

fn default_max_response_bytes() -> usize {
    8 * 1024 * 1024
}

impl Default for ReadingsConfig {
    fn default() -> Self {
        Self {
            script_base: default_script_base(),
            request_timeout_ms: default_readings_timeout(),
            default_window: default_window(),
            allowed_hosts: default_allowed_hosts(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment.
    ///
    /// Nothing is logged here; call [`LoadedConfig::log`] once logging is up.
    pub fn load_default() -> LoadedConfig {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("envmon").join("config.toml")),
            Some(PathBuf::from("/etc/envmon/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::discover(&config_paths)
    }

    /// Use the first of `paths` that exists and loads; fall back to defaults
    pub fn discover(paths: &[PathBuf]) -> LoadedConfig {
        let mut skipped = Vec::new();

        for path in paths {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        return LoadedConfig {
                            config,
                            source: ConfigSource::File(path.clone()),
                            skipped,
                        };
                    }
                    Err(e) => skipped.push(e),
                }
            }
        }

        LoadedConfig {
            config: Self::from_env(),
            source: ConfigSource::Defaults,
            skipped,
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("ENVMON_DATABASE_PATH") {
            self.storage.database_path = path;
        }

        if let Some(host) = lookup("ENVMON_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("ENVMON_API_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }

        if let Some(base) = lookup("ENVMON_SCRIPT_BASE") {
            self.readings.script_base = base;
        }
        if let Some(hosts) = lookup("ENVMON_ALLOWED_HOSTS") {
            self.readings.allowed_hosts = hosts
                .split(',')
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .collect();
        }

        if let Some(level) = lookup("ENVMON_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("ENVMON_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

/// Result of config discovery, kept so it can be logged after the subscriber is installed
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
    /// Files that existed but failed to load
    pub skipped: Vec<ConfigError>,
}

impl LoadedConfig {
    pub fn log(&self) {
        for error in &self.skipped {
            tracing::warn!("Skipping config file: {}", error);
        }
        match &self.source {
            ConfigSource::File(path) => tracing::info!("Loaded config from {:?}", path),
            ConfigSource::Defaults => {
                tracing::info!("Using default config with environment overrides")
            }
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Envmon Configuration
#
# Environment variables override these settings:
# - ENVMON_DATABASE_PATH
# - ENVMON_API_HOST
# - ENVMON_API_PORT
# - ENVMON_SCRIPT_BASE
# - ENVMON_ALLOWED_HOSTS (comma separated)
# - ENVMON_LOG_LEVEL
# - ENVMON_LOG_FORMAT

[storage]
# SQLite file holding accounts and devices
database_path = "./envmon_data/envmon.db"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 3001

# Allowed CORS origins (empty allows any origin)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

[readings]
# Base URL for Apps Script ids
script_base = "https://script.google.com/macros/s"

# Hosts a device locator may name directly as a full URL.
# The host of script_base is always allowed; anything else is rejected.
allowed_hosts = ["script.google.com", "script.googleusercontent.com"]

# Largest readings response accepted (bytes)
max_response_bytes = 8388608

# Timeout for one fetch of a readings source (ms)
request_timeout_ms = 10000

# Samples shown in dashboard charts
default_window = 24

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
