//! api::traits
//!
//! Gateway trait definition and the request/response types it exchanges.
//!
//! # Design
//!
//! The `Gateway` trait is async because every operation is a network call.
//! All methods return `Result` so HTTP failures surface as [`ApiError`]
//! values rather than as success flags.
//!
//! Repository names are validated before any request is sent; a fully
//! qualified `user/repo` name fails with [`ApiError::InvalidName`].
//!
//! # Example
//!
//! ```ignore
//! use packagecloud::api::{Gateway, ApiError};
//! use packagecloud::core::package::Package;
//!
//! async fn publish(gateway: &dyn Gateway) -> Result<(), ApiError> {
//!     let package = Package::from_path("target/debian/tool_1.0_amd64.deb")?;
//!     gateway.put_package("tools", &package, Some("ubuntu/focal".into())).await
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::core::catalog::DistributionCatalog;
use crate::core::package::{Package, PackageError};
use crate::core::types::TypeError;
use crate::distro::{AmbiguousQuery, DistroSelector};

/// Errors from gateway operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The token was rejected.
    #[error("unauthenticated: check your username and API token")]
    Unauthenticated,

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// API returned an unexpected status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// The response body was not what the endpoint promises.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// A username or repository name was rejected before sending.
    #[error(transparent)]
    InvalidName(#[from] TypeError),

    /// A distribution query matched nothing.
    #[error("cannot find distribution: {0}")]
    DistributionNotFound(String),

    /// A distribution query matched more than one version.
    #[error("{0}")]
    AmbiguousDistribution(AmbiguousQuery),

    /// The server expects a newer client.
    #[error("client version {client} is out of date, server reports {server}")]
    ClientOutOfDate {
        /// Version of this library
        client: String,
        /// Version reported by the server
        server: String,
    },

    /// The package could not be prepared.
    #[error(transparent)]
    Package(#[from] PackageError),
}

/// A repository as returned by the repos endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Bare repository name
    pub name: String,
    /// `user/repo`
    pub fqname: String,
    /// Web URL
    #[serde(default)]
    pub url: Option<String>,
    /// Whether the repository requires a token to read
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_push_human: Option<String>,
    #[serde(default)]
    pub package_count_human: Option<String>,
}

/// Client version the server currently recommends.
///
/// The server sends each component as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerVersion {
    pub major: String,
    pub minor: String,
    pub patch: String,
}

impl ServerVersion {
    /// Parse into a semantic version.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Parse` if a component is not a number.
    pub fn to_semver(&self) -> Result<semver::Version, ApiError> {
        let part = |name: &str, value: &str| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|_| ApiError::Parse(format!("invalid {} version '{}'", name, value)))
        };
        Ok(semver::Version::new(
            part("major", &self.major)?,
            part("minor", &self.minor)?,
            part("patch", &self.patch)?,
        ))
    }
}

impl std::fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Files the service found inside an uploaded source package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageContents {
    #[serde(default)]
    pub files: Vec<ContentFile>,
}

/// A file referenced by a source package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFile {
    pub filename: String,
    pub size: u64,
    pub md5sum: String,
}

/// A package stored in a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSummary {
    pub name: String,
    pub filename: String,
    #[serde(default)]
    pub distro_version: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub release: Option<String>,
    #[serde(default, rename = "type")]
    pub package_type: Option<String>,
}

/// A read token scoped to one repository through a master token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadToken {
    /// The server sends this as either a number or a numeric string
    #[serde(deserialize_with = "flexible_id")]
    pub id: u64,
    pub name: String,
    pub value: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Number(u64),
    Text(String),
}

fn flexible_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match IdRepr::deserialize(deserializer)? {
        IdRepr::Number(n) => Ok(n),
        IdRepr::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// Wrapper for the read token list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ReadTokenList {
    pub read_tokens: Vec<ReadToken>,
}

/// The gateway to the packagecloud API.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, ApiError>`. Callers should handle:
/// - `Unauthenticated`: Check the token
/// - `InvalidName`: Fix the repository name before retrying
/// - `NotFound`: Resource doesn't exist
/// - `DistributionNotFound` / `AmbiguousDistribution`: Refine the query
/// - `Api` / `Network`: Display error message to user
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Get the gateway name (e.g., "http", "mock").
    fn name(&self) -> &'static str;

    /// Fetch the distribution catalog.
    async fn distributions(&self) -> Result<DistributionCatalog, ApiError>;

    /// List every repository the account can see.
    async fn repositories(&self) -> Result<Vec<Repository>, ApiError>;

    /// Fetch a single repository owned by the account.
    async fn repository(&self, repo: &str) -> Result<Repository, ApiError>;

    /// Fetch the client version the server recommends.
    async fn server_version(&self) -> Result<ServerVersion, ApiError>;

    /// Create a repository, public unless `private` is set.
    async fn create_repository(&self, repo: &str, private: bool) -> Result<(), ApiError>;

    /// Ask the service which files a source package references.
    ///
    /// # Errors
    ///
    /// - `DistributionNotFound` / `AmbiguousDistribution` if `distro` is a
    ///   query that does not resolve to exactly one version
    async fn package_contents(
        &self,
        repo: &str,
        package: &Package,
        distro: DistroSelector,
    ) -> Result<PackageContents, ApiError>;

    /// List packages in a repository.
    async fn list_packages(&self, repo: &str) -> Result<Vec<PackageSummary>, ApiError>;

    /// Delete one package file from a repository.
    ///
    /// `distro` and `release` are index names, e.g. `ubuntu` and `breezy`.
    async fn delete_package(
        &self,
        repo: &str,
        distro: &str,
        release: &str,
        filename: &str,
    ) -> Result<(), ApiError>;

    /// Upload a package and any source files attached to it.
    ///
    /// `distro` is optional because some formats (gems, for one) have no
    /// distribution.
    ///
    /// # Errors
    ///
    /// - `DistributionNotFound` / `AmbiguousDistribution` if `distro` is a
    ///   query that does not resolve to exactly one version
    async fn put_package(
        &self,
        repo: &str,
        package: &Package,
        distro: Option<DistroSelector>,
    ) -> Result<(), ApiError>;

    /// Create a read token under a master token.
    async fn create_read_token(
        &self,
        repo: &str,
        master_token_id: &str,
        name: &str,
    ) -> Result<ReadToken, ApiError>;

    /// List read tokens under a master token.
    async fn list_read_tokens(
        &self,
        repo: &str,
        master_token_id: &str,
    ) -> Result<Vec<ReadToken>, ApiError>;

    /// Delete a read token.
    async fn delete_read_token(
        &self,
        repo: &str,
        master_token_id: &str,
        read_token_id: u64,
    ) -> Result<(), ApiError>;
}
