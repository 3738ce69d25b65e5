//! # Server Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STICKER_PRINT_URL=http://printhost:3010/Integration/...            │
//! │     STICKER_OVERRIDE_PASSWORD=...                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or $STICKER_CONFIG, or                            │
//! │     ~/.config/sticker-line/sticker.toml (Linux)                        │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # sticker.toml
//! [server]
//! bind_addr = "0.0.0.0:3000"
//! static_dir = "dist"
//!
//! [database]
//! path = "/var/lib/sticker/stickers.db"
//! max_connections = 5
//! query_timeout_secs = 5
//!
//! [printer]
//! url = "http://localhost:3010/Integration/WebServiceIntegration/Execute"
//! timeout_secs = 5
//! serial_prefix = "APBUAESA"
//!
//! [batch]
//! max_batch = 500
//! warn_batch = 100
//!
//! [override]
//! password = "..."
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use sticker_core::{BatchLimits, DEFAULT_SERIAL_PREFIX};
use sticker_print::OrchestratorConfig;

/// Largest batch the 5-digit serial space can hold.
const SERIAL_SPACE: u32 = 99_999;

// =============================================================================
// Errors
// =============================================================================

/// Configuration errors. All of them stop startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address the API listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Directory of the built operator UI, served for any non-API path.
    #[serde(default = "default_static_dir")]
    pub static_dir: Option<PathBuf>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_static_dir() -> Option<PathBuf> {
    Some(PathBuf::from("dist"))
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            static_dir: default_static_dir(),
        }
    }
}

/// Print history database settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Upper bound on any single history read or write.
    #[serde(default = "default_timeout_secs")]
    pub query_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_timeout_secs() -> u64 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
            query_timeout_secs: default_timeout_secs(),
        }
    }
}

/// Label print service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterSettings {
    /// Integration Builder execute endpoint.
    #[serde(default = "default_print_url")]
    pub url: String,

    /// Upper bound on one print call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Product prefix of every printed serial.
    #[serde(default = "default_serial_prefix")]
    pub serial_prefix: String,
}

fn default_print_url() -> String {
    "http://localhost:3010/Integration/WebServiceIntegration/Execute".to_string()
}

fn default_serial_prefix() -> String {
    DEFAULT_SERIAL_PREFIX.to_string()
}

impl Default for PrinterSettings {
    fn default() -> Self {
        PrinterSettings {
            url: default_print_url(),
            timeout_secs: default_timeout_secs(),
            serial_prefix: default_serial_prefix(),
        }
    }
}

/// Reprint authorization settings.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideSettings {
    /// Shared override password. Unset means overrides are always refused.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

impl std::fmt::Debug for OverrideSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverrideSettings")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// =============================================================================
// Server Config
// =============================================================================

/// Complete server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub printer: PrinterSettings,

    #[serde(default)]
    pub batch: BatchLimits,

    #[serde(default, rename = "override")]
    pub override_auth: OverrideSettings,
}

impl ServerConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file: `config_path` (from `--config` or `$STICKER_CONFIG`),
    ///    else the platform config dir. Only the platform default may be
    ///    missing.
    /// 3. `STICKER_*` environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path));
                }
                Self::from_file(&path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                path => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies `STICKER_*` overrides looked up through `lookup`.
    ///
    /// Takes the lookup as a parameter so tests need not touch the process
    /// environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("STICKER_BIND_ADDR") {
            debug!(bind_addr = %addr, "Overriding bind address from environment");
            self.server.bind_addr = addr;
        }

        if let Some(dir) = lookup("STICKER_STATIC_DIR") {
            self.server.static_dir = if dir.is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }

        if let Some(path) = lookup("STICKER_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(url) = lookup("STICKER_PRINT_URL") {
            debug!(url = %url, "Overriding print service URL from environment");
            self.printer.url = url;
        }

        if let Some(secs) = lookup("STICKER_PRINT_TIMEOUT_SECS") {
            self.printer.timeout_secs = parse_number("STICKER_PRINT_TIMEOUT_SECS", &secs)?;
        }

        if let Some(prefix) = lookup("STICKER_SERIAL_PREFIX") {
            self.printer.serial_prefix = prefix;
        }

        if let Some(max) = lookup("STICKER_MAX_BATCH") {
            self.batch.max_batch = parse_number("STICKER_MAX_BATCH", &max)?;
        }

        if let Some(warn) = lookup("STICKER_WARN_BATCH") {
            self.batch.warn_batch = parse_number("STICKER_WARN_BATCH", &warn)?;
        }

        if let Some(password) = lookup("STICKER_OVERRIDE_PASSWORD") {
            debug!("Override password set from environment");
            self.override_auth.password = Some(password);
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        self.print_url()?;

        let BatchLimits {
            max_batch,
            warn_batch,
        } = self.batch;
        if max_batch == 0 || max_batch > SERIAL_SPACE {
            return Err(ConfigError::invalid(
                "batch.max_batch",
                format!("must be between 1 and {}, got {}", SERIAL_SPACE, max_batch),
            ));
        }
        if warn_batch > max_batch {
            return Err(ConfigError::invalid(
                "batch.warn_batch",
                format!("must not exceed max_batch ({}), got {}", max_batch, warn_batch),
            ));
        }

        if self.printer.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "printer.timeout_secs",
                "must be greater than 0",
            ));
        }
        if self.database.query_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "database.query_timeout_secs",
                "must be greater than 0",
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::invalid(
                "database.max_connections",
                "must be greater than 0",
            ));
        }

        let prefix = &self.printer.serial_prefix;
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::invalid(
                "printer.serial_prefix",
                format!("must be non-empty ASCII letters and digits, got '{}'", prefix),
            ));
        }

        Ok(())
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "sticker", "line")
            .map(|dirs| dirs.config_dir().join("sticker.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind_addr
            .parse()
            .map_err(|e| ConfigError::invalid("server.bind_addr", format!("{}", e)))
    }

    pub fn print_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.printer.url)
            .map_err(|e| ConfigError::invalid("printer.url", e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::invalid(
                "printer.url",
                format!("must be http or https, got {}", other),
            )),
        }
    }

    pub fn print_timeout(&self) -> Duration {
        Duration::from_secs(self.printer.timeout_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.database.query_timeout_secs)
    }

    /// Database file, falling back to `stickers.db` in the platform data
    /// directory, then the working directory.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.database.path {
            return path.clone();
        }
        directories::ProjectDirs::from("com", "sticker", "line")
            .map(|dirs| dirs.data_dir().join("stickers.db"))
            .unwrap_or_else(|| PathBuf::from("stickers.db"))
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            serial_prefix: self.printer.serial_prefix.clone(),
            limits: self.batch,
            print_timeout: self.print_timeout(),
            store_timeout: self.store_timeout(),
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(key, format!("'{}': {}", value, e)))
}
