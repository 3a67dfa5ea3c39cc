//! Configuration management for dirlook.
//!
//! This module provides TOML-based configuration file loading.
//! The default configuration path is `~/.config/dirlook/config.toml`.

use std::collections::HashSet;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::files::browser::ListingOptions;
use crate::files::roots::Root;
use crate::files::transfer::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
use crate::web::routes::DOWNLOAD_PREFIX;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:834";

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("chunk_size must be between 1 and {max}, got {0}", max = MAX_CHUNK_SIZE)]
    InvalidChunkSize(usize),

    #[error("shutdown_timeout must be between 1 and 300 seconds, got {0}")]
    InvalidShutdownTimeout(u64),

    #[error("log_level must be one of: trace, debug, info, warn, error; got {0}")]
    InvalidLogLevel(String),

    #[error("mount name {0:?} is not a valid single path segment")]
    InvalidMountName(String),

    #[error("mount name {0:?} is used more than once")]
    DuplicateMountName(String),

    #[error("mount path must be absolute: {0}")]
    RelativeMountPath(PathBuf),
}

/// Valid log level values for tracing configuration.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Listener and process settings.
    pub server: ServerConfig,

    /// Which roots are offered for browsing.
    pub roots: RootsConfig,

    /// Directory listing behavior.
    pub listing: ListingConfig,

    /// File download settings.
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,

    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Seconds to wait for in-flight requests on shutdown.
    pub shutdown_timeout: u64,
}

/// How top-level roots are discovered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RootStrategy {
    /// Probe drive letters `A:` through `Z:`.
    DriveLetters,
    /// Offer the configured mount points.
    Mounts,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RootsConfig {
    pub strategy: RootStrategy,

    /// Mount points offered by the `mounts` strategy, in display order.
    pub mounts: Vec<Root>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ListingConfig {
    /// List entries whose name starts with '.'.
    pub show_hidden: bool,

    /// Sort entries by name instead of keeping filesystem order.
    pub sort_entries: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DownloadConfig {
    /// Bytes read per chunk while streaming a file.
    pub chunk_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 834))),
            log_level: "info".to_string(),
            shutdown_timeout: 5,
        }
    }
}

impl Default for RootsConfig {
    fn default() -> Self {
        if cfg!(windows) {
            Self {
                strategy: RootStrategy::DriveLetters,
                mounts: Vec::new(),
            }
        } else {
            Self {
                strategy: RootStrategy::Mounts,
                mounts: vec![Root::new("root", "/")],
            }
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        let options = ListingOptions::default();
        Self {
            show_hidden: options.show_hidden,
            sort_entries: options.sort_entries,
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ListingConfig {
    pub fn options(&self) -> ListingOptions {
        ListingOptions {
            show_hidden: self.show_hidden,
            sort_entries: self.sort_entries,
        }
    }
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dirlook")
        .join("config.toml")
}

/// A configuration field replaced from the environment.
///
/// Overrides are applied before logging is set up, so the caller reports
/// them once the subscriber exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvOverride {
    pub field: &'static str,
    pub value: String,
}

impl EnvOverride {
    fn new(field: &'static str, value: String) -> Self {
        Self { field, value }
    }
}

impl Config {
    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported variables:
    /// - DIRLOOK_BIND_ADDR: Override the listen address
    /// - DIRLOOK_LOG_LEVEL: Override log level (trace, debug, info, warn, error)
    pub fn apply_env_overrides(&mut self) -> Result<Vec<EnvOverride>> {
        let mut applied = Vec::new();

        if let Ok(addr) = std::env::var("DIRLOOK_BIND_ADDR") {
            if !addr.is_empty() {
                self.server.bind_addr = addr
                    .parse()
                    .with_context(|| format!("Invalid DIRLOOK_BIND_ADDR: {}", addr))?;
                applied.push(EnvOverride::new("bind_addr", addr));
            }
        }

        if let Ok(level) = std::env::var("DIRLOOK_LOG_LEVEL") {
            if !level.is_empty() {
                self.server.log_level = level.clone();
                applied.push(EnvOverride::new("log_level", level));
            }
        }

        Ok(applied)
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.download.chunk_size == 0 || self.download.chunk_size > MAX_CHUNK_SIZE {
            return Err(ConfigError::InvalidChunkSize(self.download.chunk_size));
        }

        if self.server.shutdown_timeout == 0 || self.server.shutdown_timeout > 300 {
            return Err(ConfigError::InvalidShutdownTimeout(
                self.server.shutdown_timeout,
            ));
        }

        let level = self.server.log_level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.server.log_level.clone()));
        }

        let mut seen = HashSet::new();
        for mount in &self.roots.mounts {
            let name = mount.name.as_str();
            if name.is_empty()
                || name == "."
                || name == ".."
                || name == DOWNLOAD_PREFIX
                || name.contains(['/', '\\'])
            {
                return Err(ConfigError::InvalidMountName(mount.name.clone()));
            }
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateMountName(mount.name.clone()));
            }
            if !mount.path.is_absolute() {
                return Err(ConfigError::RelativeMountPath(mount.path.clone()));
            }
        }

        Ok(())
    }

    /// Load configuration from a file.
    ///
    /// If the file does not exist, returns the default configuration.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self> {
        Self::load(default_config_path())
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| anyhow::anyhow!("Invalid TOML configuration: {}", format_toml_error(&e)))
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }
}

/// Format a TOML deserialization error for user-friendly display.
fn format_toml_error(error: &toml::de::Error) -> String {
    let mut msg = error.message().to_string();

    if let Some(span) = error.span() {
        msg.push_str(&format!(" (at position {}..{})", span.start, span.end));
    }

    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.bind_addr.port(), 834);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.server.shutdown_timeout, 5);
        assert!(config.listing.show_hidden);
        assert!(!config.listing.sort_entries);
        assert_eq!(config.download.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(config.validate().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_default_roots_on_unix() {
        let config = RootsConfig::default();
        assert_eq!(config.strategy, RootStrategy::Mounts);
        assert_eq!(config.mounts, vec![Root::new("root", "/")]);
    }

    #[test]
    fn test_from_toml_empty() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_from_toml_partial() {
        let toml = r#"
[server]
log_level = "debug"

[listing]
sort_entries = true
"#;
        let config = Config::from_toml(toml).unwrap();

        assert_eq!(config.server.log_level, "debug");
        assert!(config.listing.sort_entries);
        // Other values should be defaults
        assert_eq!(config.server.bind_addr.port(), 834);
        assert!(config.listing.show_hidden);
    }

    #[test]
    fn test_from_toml_full() {
        let toml = r#"
[server]
bind_addr = "127.0.0.1:8080"
log_level = "trace"
shutdown_timeout = 30

[roots]
strategy = "mounts"
mounts = [
    { name = "home", path = "/home" },
    { name = "media", path = "/mnt/media" },
]

[listing]
show_hidden = false
sort_entries = true

[download]
chunk_size = 131072
"#;
        let config = Config::from_toml(toml).unwrap();

        assert_eq!(config.server.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.server.shutdown_timeout, 30);
        assert_eq!(config.roots.strategy, RootStrategy::Mounts);
        assert_eq!(
            config.roots.mounts,
            vec![Root::new("home", "/home"), Root::new("media", "/mnt/media")]
        );
        assert!(!config.listing.show_hidden);
        assert!(config.listing.sort_entries);
        assert_eq!(config.download.chunk_size, 131072);
    }

    #[test]
    fn test_from_toml_drive_letters() {
        let toml = r#"
[roots]
strategy = "drive_letters"
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.roots.strategy, RootStrategy::DriveLetters);
    }

    #[test]
    fn test_from_toml_invalid_syntax() {
        let toml = r#"
[server
log_level = "debug"
"#;
        let result = Config::from_toml(toml);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Invalid TOML"));
    }

    #[test]
    fn test_from_toml_wrong_type() {
        let toml = r#"
[download]
chunk_size = "big"
"#;
        assert!(Config::from_toml(toml).is_err());
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();

        assert!(toml.contains("[server]"));
        assert!(toml.contains("[roots]"));
        assert!(toml.contains("[listing]"));
        assert!(toml.contains("[download]"));
        assert_eq!(Config::from_toml(&toml).unwrap(), config);
    }

    #[test]
    fn test_load_nonexistent_file_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(temp_dir.path().join("nonexistent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[download]\nchunk_size = 4096\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.download.chunk_size, 4096);
    }

    #[test]
    fn test_load_invalid_file_mentions_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        fs::write(&path, "[server\n").unwrap();

        let err = format!("{:#}", Config::load(&path).unwrap_err());
        assert!(err.contains("broken.toml"));
    }

    #[test]
    fn test_validate_chunk_size() {
        let mut config = Config::default();

        config.download.chunk_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidChunkSize(0)));

        config.download.chunk_size = MAX_CHUNK_SIZE + 1;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidChunkSize(MAX_CHUNK_SIZE + 1))
        );

        config.download.chunk_size = MAX_CHUNK_SIZE;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_shutdown_timeout() {
        let mut config = Config::default();

        config.server.shutdown_timeout = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidShutdownTimeout(0)));

        config.server.shutdown_timeout = 301;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidShutdownTimeout(301))
        );
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = Config::default();

        config.server.log_level = "WARN".to_string();
        assert!(config.validate().is_ok());

        config.server.log_level = "loud".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidLogLevel("loud".to_string()))
        );
    }

    #[test]
    fn test_validate_mount_names() {
        let mut config = Config::default();

        for bad in ["", ".", "..", "download", "a/b", "a\\b"] {
            config.roots.mounts = vec![Root::new(bad, "/srv")];
            assert_eq!(
                config.validate(),
                Err(ConfigError::InvalidMountName(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }

        config.roots.mounts = vec![Root::new("srv", "/srv"), Root::new("srv", "/opt")];
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateMountName("srv".to_string()))
        );
    }

    #[test]
    fn test_validate_relative_mount_path() {
        let mut config = Config::default();
        config.roots.mounts = vec![Root::new("here", "relative/dir")];
        assert_eq!(
            config.validate(),
            Err(ConfigError::RelativeMountPath(PathBuf::from("relative/dir")))
        );
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("DIRLOOK_BIND_ADDR", "127.0.0.1:9000");
        std::env::set_var("DIRLOOK_LOG_LEVEL", "debug");

        let mut config = Config::default();
        let result = config.apply_env_overrides();

        std::env::remove_var("DIRLOOK_BIND_ADDR");
        std::env::remove_var("DIRLOOK_LOG_LEVEL");

        let applied = result.unwrap();
        assert_eq!(config.server.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(
            applied,
            vec![
                EnvOverride::new("bind_addr", "127.0.0.1:9000".to_string()),
                EnvOverride::new("log_level", "debug".to_string()),
            ]
        );
    }

    #[test]
    #[serial]
    fn test_env_override_invalid_bind_addr() {
        std::env::set_var("DIRLOOK_BIND_ADDR", "not-an-address");

        let mut config = Config::default();
        let result = config.apply_env_overrides();

        std::env::remove_var("DIRLOOK_BIND_ADDR");

        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_empty_env_vars_ignored() {
        std::env::set_var("DIRLOOK_LOG_LEVEL", "");

        let mut config = Config::default();
        let applied = config.apply_env_overrides().unwrap();

        std::env::remove_var("DIRLOOK_LOG_LEVEL");

        assert!(applied.is_empty());
        assert_eq!(config.server.log_level, "info");
    }
}
