//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values (`https://packagecloud.io:443`, 60 second timeouts)
//! 2. Config file
//! 3. `PACKAGECLOUD_TOKEN` environment variable (token only)
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. `$PACKAGECLOUD_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/packagecloud/config.toml`
//! 3. `~/.packagecloud/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use packagecloud::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! let credentials = config.credentials().unwrap();
//! let connection = config.connection();
//! println!("Talking to {} as {}", connection.base_url(), credentials.username());
//! ```

pub mod schema;

pub use schema::{ConnectionConfig, CredentialsConfig, FileConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use super::connection::{
    Connection, Credentials, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SCHEME, DEFAULT_TIMEOUT,
};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "PACKAGECLOUD_CONFIG";

/// Environment variable overriding the API token.
pub const TOKEN_ENV: &str = "PACKAGECLOUD_TOKEN";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("missing config value: {0}")]
    Missing(&'static str),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration with defaults and overrides applied by accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents
    pub file: FileConfig,
    /// Token taken from the environment, if any
    env_token: Option<String>,
    /// Path the file was loaded from
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or
    /// fails validation. A missing file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let (file, path) = Self::load_file()?;
        file.validate()?;

        let env_token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());

        Ok(Config {
            file,
            env_token,
            path,
        })
    }

    /// Load configuration from an explicit path, ignoring the environment.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let file = Self::read_config(path)?;
        file.validate()?;
        Ok(Config {
            file,
            env_token: None,
            path: Some(path.to_path_buf()),
        })
    }

    fn load_file() -> Result<(FileConfig, Option<PathBuf>), ConfigError> {
        // 1. Check $PACKAGECLOUD_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 2. Check $XDG_CONFIG_HOME/packagecloud/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("packagecloud/config.toml");
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        // 3. Check ~/.packagecloud/config.toml
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".packagecloud/config.toml");
            if path.exists() {
                let config = Self::read_config(&path)?;
                return Ok((config, Some(path)));
            }
        }

        Ok((FileConfig::default(), None))
    }

    fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical config path, `~/.packagecloud/config.toml`.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".packagecloud/config.toml"))
    }

    /// Write a config file atomically to `path`.
    ///
    /// Creates parent directories if needed. The file is written to a
    /// temporary sibling and renamed into place.
    pub fn write(path: &Path, config: &FileConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Build credentials from the file and environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the username or token is not set.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let creds = self.file.credentials.as_ref();
        let username = creds
            .and_then(|c| c.username.as_deref())
            .ok_or(ConfigError::Missing("credentials.username"))?;
        let token = self
            .env_token
            .as_deref()
            .or_else(|| creds.and_then(|c| c.token.as_deref()))
            .ok_or(ConfigError::Missing("credentials.token"))?;

        Credentials::new(username, token).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }

    /// Build the connection, filling unset fields with defaults.
    pub fn connection(&self) -> Connection {
        let conn = self.file.connection.clone().unwrap_or_default();
        let secs = |v: Option<u64>| v.map(Duration::from_secs).unwrap_or(DEFAULT_TIMEOUT);

        Connection {
            scheme: conn.scheme.unwrap_or_else(|| DEFAULT_SCHEME.to_string()),
            host: conn.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: conn.port.unwrap_or(DEFAULT_PORT),
            connect_timeout: secs(conn.connect_timeout_secs),
            read_timeout: secs(conn.read_timeout_secs),
            write_timeout: secs(conn.write_timeout_secs),
        }
    }

    /// Get the User-Agent suffix, if configured.
    pub fn user_agent(&self) -> Option<&str> {
        self.file.user_agent.as_deref()
    }

    /// Get the path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
