//! core::connection
//!
//! Connection and credential value objects.
//!
//! Both are plain immutable values. [`Connection`] says where the service
//! lives and how long to wait for it; [`Credentials`] says who is calling.

use std::time::Duration;

use super::types::{TypeError, Username};

/// Default service scheme.
pub const DEFAULT_SCHEME: &str = "https";

/// Default service host.
pub const DEFAULT_HOST: &str = "packagecloud.io";

/// Default service port.
pub const DEFAULT_PORT: u16 = 443;

/// Default connect, read and write timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Where and how to reach the packagecloud API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl Default for Connection {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            write_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Connection {
    /// Create a connection with default timeouts.
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Parse a base URL such as `http://localhost:8000`.
    ///
    /// The port falls back to the scheme's well-known port.
    ///
    /// # Example
    ///
    /// ```
    /// use packagecloud::core::connection::Connection;
    ///
    /// let conn = Connection::from_url("http://127.0.0.1:8000").unwrap();
    /// assert_eq!(conn.host, "127.0.0.1");
    /// assert_eq!(conn.port, 8000);
    /// ```
    pub fn from_url(url: &str) -> Option<Self> {
        let parsed = reqwest::Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_string();
        let port = parsed.port_or_known_default()?;
        Some(Self::new(parsed.scheme(), host, port))
    }

    /// Set all three timeouts at once.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self.read_timeout = timeout;
        self.write_timeout = timeout;
        self
    }

    /// Base URL without a trailing slash, e.g. `https://packagecloud.io:443`.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// API credentials: the account username and its API token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: Username,
    token: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"[redacted]")
            .finish()
    }
}

impl Credentials {
    /// Create credentials, validating the username.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidUsername` if the username is empty or is an
    /// email address.
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Result<Self, TypeError> {
        Ok(Self {
            username: Username::new(username)?,
            token: token.into(),
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}
