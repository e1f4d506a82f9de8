//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Host names treated as a local development machine
const LOCAL_HOSTS: &[&str] = &["localhost", "127.0.0.1", "::1", "[::1]", "0.0.0.0"];

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storefront API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Explicit base address. Takes precedence over host-based selection.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_local_base_url")]
    pub local_base_url: String,

    #[serde(default = "default_production_base_url")]
    pub production_base_url: String,

    /// Host the client considers itself to be running on
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: Option<u64>,
}

fn default_local_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_production_base_url() -> String {
    "https://your-production-url.com".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_request_timeout() -> Option<u64> {
    Some(30)
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            local_base_url: default_local_base_url(),
            production_base_url: default_production_base_url(),
            host: default_host(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Build a config pinned to one base address
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    /// Per-request timeout; `None` or `0` disables it
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Whether `host` names a local development machine
    pub fn is_local_host(host: &str) -> bool {
        let host = host.trim();
        LOCAL_HOSTS.iter().any(|h| h.eq_ignore_ascii_case(host))
    }

    /// Resolve the base address every request path is appended to
    pub fn resolve_base_url(&self) -> String {
        let url = match &self.base_url {
            Some(url) if !url.trim().is_empty() => url.trim(),
            _ if Self::is_local_host(&self.host) => self.local_base_url.as_str(),
            _ => self.production_base_url.as_str(),
        };
        url.trim_end_matches('/').to_string()
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_path")]
    pub path: String,
}

fn default_session_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("medcore").join("session.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./medcore_session.json".to_string())
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
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

        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
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

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("medcore").join("config.toml")),
            Some(PathBuf::from("/etc/medcore/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(url) = var("MEDCORE_API_URL") {
            self.api.base_url = Some(url);
        }
        if let Some(host) = var("MEDCORE_HOST") {
            self.api.host = host;
        }
        if let Some(timeout) = var("MEDCORE_REQUEST_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(0) => self.api.request_timeout_secs = None,
                Ok(secs) => self.api.request_timeout_secs = Some(secs),
                Err(_) => tracing::warn!("Ignoring invalid MEDCORE_REQUEST_TIMEOUT_SECS: {}", timeout),
            }
        }

        // Session overrides
        if let Some(path) = var("MEDCORE_SESSION_PATH") {
            self.session.path = path;
        }

        // Logging overrides
        if let Some(level) = var("MEDCORE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("MEDCORE_LOG_FORMAT") {
            self.logging.format = format;
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
    r#"# MedCore Client Configuration
#
# Environment variables override these settings:
# - MEDCORE_API_URL
# - MEDCORE_HOST
# - MEDCORE_REQUEST_TIMEOUT_SECS (0 disables the timeout)
# - MEDCORE_SESSION_PATH
# - MEDCORE_LOG_LEVEL
# - MEDCORE_LOG_FORMAT

[api]
# Explicit API base address; when set, host-based selection is skipped
# base_url = "http://localhost:8000"

# Address used when `host` is a local development name
local_base_url = "http://localhost:8000"

# Address used for every other host
production_base_url = "https://your-production-url.com"

# Host this client runs on (localhost, 127.0.0.1 and ::1 count as local)
host = "localhost"

# Per-request timeout in seconds (0 disables the timeout)
request_timeout_secs = 30

[session]
# File holding the bearer token and cached user profile
path = "~/.local/share/medcore/session.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
