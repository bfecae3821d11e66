//! core::types
//!
//! Strong types for account and repository names.
//!
//! # Types
//!
//! - [`Username`] - A packagecloud.io account name (never an email address)
//! - [`RepoName`] - A bare repository name (never `user/repo`)
//!
//! # Validation
//!
//! These types enforce validity at construction time, so a request can never
//! be built for a malformed path segment.
//!
//! # Examples
//!
//! ```
//! use packagecloud::core::types::{RepoName, Username};
//!
//! let user = Username::new("joedamato").unwrap();
//! let repo = RepoName::new("test_repo").unwrap();
//! assert_eq!(format!("{}/{}", user, repo), "joedamato/test_repo");
//!
//! assert!(Username::new("joe@example.com").is_err());
//! assert!(RepoName::new("joedamato/test_repo").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("invalid repository name: {0}")]
    InvalidRepoName(String),

    #[error("invalid {field}: '{value}' cannot be used as a path segment")]
    InvalidPathSegment { field: &'static str, value: String },
}

/// Check that `value` names exactly one URL path segment.
///
/// Empty values, `.`, `..` and values containing `/` are rejected; any of
/// them would address a different resource once the URL is normalized.
/// Other reserved characters are percent-encoded when the URL is built.
///
/// # Errors
///
/// Returns `TypeError::InvalidPathSegment` naming `field`.
pub fn check_path_segment(field: &'static str, value: &str) -> Result<(), TypeError> {
    if value.is_empty() || value == "." || value == ".." || value.contains('/') {
        return Err(TypeError::InvalidPathSegment {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// A validated packagecloud.io username.
///
/// Usernames cannot be empty and cannot contain `@`. The `@` check catches
/// the common mistake of passing the account email instead of the username.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Create a new validated username.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidUsername` if the name is empty or looks
    /// like an email address.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::InvalidUsername(
                "username cannot be empty".into(),
            ));
        }
        if name.contains('@') {
            return Err(TypeError::InvalidUsername(
                "looks like you may have used an email address instead of your \
                 packagecloud.io username, please use your username instead"
                    .into(),
            ));
        }
        Ok(Self(name))
    }

    /// Get the username as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Username> for String {
    fn from(name: Username) -> Self {
        name.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated repository name.
///
/// Only the bare repository name is accepted. A fully qualified name such as
/// `user/repo` is rejected because the username is already part of every
/// request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoName(String);

impl RepoName {
    /// Create a new validated repository name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRepoName` if the name is empty, is `.` or
    /// `..`, or contains `/`.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::InvalidRepoName(
                "repository name cannot be empty".into(),
            ));
        }
        if name == "." || name == ".." {
            return Err(TypeError::InvalidRepoName(format!(
                "'{}' is not a repository name",
                name
            )));
        }
        if name.contains('/') {
            return Err(TypeError::InvalidRepoName(format!(
                "the repo name '{}' is invalid, it looks like you are using the \
                 fully qualified name (fqname) instead of just the repo name",
                name
            )));
        }
        Ok(Self(name))
    }

    /// Get the repository name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RepoName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for RepoName {
    type Error = TypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RepoName> for String {
    fn from(name: RepoName) -> Self {
        name.0
    }
}

impl AsRef<str> for RepoName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RepoName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
