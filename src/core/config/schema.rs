//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Example
//!
//! ```toml
//! user_agent = "release-bot"
//!
//! [credentials]
//! username = "joedamato"
//! token = "abc123"
//!
//! [connection]
//! scheme = "https"
//! host = "packagecloud.io"
//! port = 443
//! connect_timeout_secs = 60
//! read_timeout_secs = 60
//! write_timeout_secs = 60
//! ```
//!
//! # Validation
//!
//! Values are validated after parsing: the username must be a username and
//! not an email address, the scheme must be `http` or `https`, and timeouts
//! must be non-zero.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::Username;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Suffix appended to the library's own User-Agent
    pub user_agent: Option<String>,

    /// Account credentials
    pub credentials: Option<CredentialsConfig>,

    /// Service location and timeouts
    pub connection: Option<ConnectionConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(creds) = &self.credentials {
            creds.validate()?;
        }
        if let Some(conn) = &self.connection {
            conn.validate()?;
        }
        Ok(())
    }
}

/// `[credentials]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CredentialsConfig {
    pub username: Option<String>,
    pub token: Option<String>,
}

impl CredentialsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(username) = &self.username {
            Username::new(username.as_str())
                .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        }
        if let Some(token) = &self.token {
            if token.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "token cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// `[connection]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionConfig {
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub connect_timeout_secs: Option<u64>,
    pub read_timeout_secs: Option<u64>,
    pub write_timeout_secs: Option<u64>,
}

impl ConnectionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(scheme) = &self.scheme {
            if scheme != "http" && scheme != "https" {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid scheme '{}', must be one of: http, https",
                    scheme
                )));
            }
        }
        if let Some(host) = &self.host {
            if host.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "host cannot be empty".to_string(),
                ));
            }
        }
        let timeouts = [
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("read_timeout_secs", self.read_timeout_secs),
            ("write_timeout_secs", self.write_timeout_secs),
        ];
        for (name, value) in timeouts {
            if value == Some(0) {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }
        Ok(())
    }
}
