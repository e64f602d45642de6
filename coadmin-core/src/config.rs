//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/coadmin/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/coadmin/` (~/.config/coadmin/)
//! - State/Logs: `$XDG_STATE_HOME/coadmin/` (~/.local/state/coadmin/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Issue reporter configuration
    #[serde(default)]
    pub reporter: ReporterConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Reporter configuration
///
/// Immutable for the lifetime of a [`crate::Reporter`].
#[derive(Debug, Deserialize, Clone)]
pub struct ReporterConfig {
    /// Queue reports for HTTP delivery instead of writing them to `folder`
    #[serde(default)]
    pub live: bool,

    /// Directory that receives `<fingerprint>.issue` files
    #[serde(default = "default_folder")]
    pub folder: PathBuf,

    /// Collector endpoint that receives `{"issue": ...}` POSTs in live mode
    #[serde(default = "default_server")]
    pub server: String,

    /// Seconds before the same issue may be reported again
    #[serde(default = "default_minimum_interval")]
    pub minimum_interval_secs: u64,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Max reports held in memory awaiting delivery; the oldest is dropped when full
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Milliseconds the delivery worker sleeps between cycles
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Log every built report and worker cycle
    #[serde(default)]
    pub verbose: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            live: false,
            folder: default_folder(),
            server: default_server(),
            minimum_interval_secs: default_minimum_interval(),
            request_timeout_secs: default_request_timeout(),
            queue_capacity: default_queue_capacity(),
            poll_interval_ms: default_poll_interval(),
            verbose: false,
        }
    }
}

impl ReporterConfig {
    /// Minimum re-report interval as a [`Duration`]
    pub fn minimum_interval(&self) -> Duration {
        Duration::from_secs(self.minimum_interval_secs)
    }

    /// Per-request HTTP timeout as a [`Duration`]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Delivery worker cadence as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Validate configuration, returning error message if invalid
    ///
    /// File mode only needs a folder; the folder itself is not required to exist yet.
    pub fn validate(&self) -> Result<()> {
        if self.live {
            if !is_valid_server_url(&self.server) {
                return Err(Error::Config(format!(
                    "reporter.server must be an absolute http(s) URL, got '{}'",
                    self.server
                )));
            }
            if self.queue_capacity == 0 {
                return Err(Error::Config(
                    "reporter.queue_capacity must be at least 1".to_string(),
                ));
            }
            if self.request_timeout_secs == 0 {
                return Err(Error::Config(
                    "reporter.request_timeout_secs must be at least 1".to_string(),
                ));
            }
            if self.poll_interval_ms == 0 {
                return Err(Error::Config(
                    "reporter.poll_interval_ms must be at least 1".to_string(),
                ));
            }
        } else if self.folder.as_os_str().is_empty() {
            return Err(Error::Config(
                "reporter.folder is required when live mode is disabled".to_string(),
            ));
        }
        Ok(())
    }
}

/// True for an absolute `http`/`https` URL with a host
pub fn is_valid_server_url(server: &str) -> bool {
    reqwest::Url::parse(server)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

fn default_folder() -> PathBuf {
    PathBuf::from("/var/coadmin")
}

fn default_server() -> String {
    "http://127.0.0.1:3000/api".to_string()
}

fn default_minimum_interval() -> u64 {
    60
}

fn default_request_timeout() -> u64 {
    10
}

fn default_queue_capacity() -> usize {
    1000
}

fn default_poll_interval() -> u64 {
    1000
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
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

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/coadmin/config.toml` (~/.config/coadmin/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("coadmin").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/coadmin/` (~/.local/state/coadmin/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("coadmin")
    }
}
