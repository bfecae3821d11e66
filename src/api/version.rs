//! api::version
//!
//! Client/server version compatibility.
//!
//! The server publishes the client version it currently expects. The client
//! version is an immutable value passed in by the caller so embedding tools
//! can report their own version instead of this library's.

use semver::Version;
use tracing::debug;

use super::traits::{ApiError, Gateway, ServerVersion};
use crate::VERSION;

/// Version of the calling client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientVersion(Version);

impl ClientVersion {
    pub fn new(version: Version) -> Self {
        Self(version)
    }

    /// Parse a version string such as `0.2.1`.
    pub fn parse(version: &str) -> Result<Self, semver::Error> {
        Version::parse(version).map(Self)
    }

    /// The version of this library.
    pub fn current() -> Self {
        Self(Version::parse(VERSION).unwrap_or_else(|_| Version::new(0, 0, 0)))
    }

    pub fn version(&self) -> &Version {
        &self.0
    }
}

impl Default for ClientVersion {
    fn default() -> Self {
        Self::current()
    }
}

impl std::fmt::Display for ClientVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Check `client` against the version the server expects.
///
/// Returns the server's version when the client is at least as new.
///
/// # Errors
///
/// - `ClientOutOfDate` if the server expects a newer client
/// - `Parse` if the server's version is malformed
/// - the gateway's error if the version cannot be fetched
pub async fn check_compatibility<G: Gateway + ?Sized>(
    gateway: &G,
    client: &ClientVersion,
) -> Result<ServerVersion, ApiError> {
    let server = gateway.server_version().await?;
    let expected = server.to_semver()?;

    debug!(client = %client, server = %expected, "checking client version");

    if expected > client.0 {
        return Err(ApiError::ClientOutOfDate {
            client: client.to_string(),
            server: expected.to_string(),
        });
    }
    Ok(server)
}
