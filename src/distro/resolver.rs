//! distro::resolver
//!
//! Resolves a free-text distribution query to a single distribution version id.
//!
//! # Policy
//!
//! A query matches every index key that contains it as a case-sensitive
//! substring. Then:
//!
//! - one matching key with one id resolves to that id
//! - no matching key is [`Resolution::NoMatch`], not an error
//! - several matching keys, or one key published with several ids, is
//!   [`Resolution::Ambiguous`] and lists every matching key so the caller
//!   can narrow the query
//!
//! So `"breezy"` finds `ubuntu/breezy`, while `"ubuntu"` matches every Ubuntu
//! release and is ambiguous. Callers should pass a full `family/version` key
//! or a version slug that is unique.
//!
//! # Example
//!
//! ```
//! use packagecloud::core::catalog::{DistributionCatalog, DistributionFamily, DistributionVersion};
//! use packagecloud::distro::{resolve_in, Resolution};
//!
//! let catalog = DistributionCatalog::new().with_format("deb", vec![DistributionFamily::new(
//!     "Ubuntu",
//!     "ubuntu",
//!     vec![
//!         DistributionVersion::new(3, "5.10 Breezy Badger", "breezy"),
//!         DistributionVersion::new(4, "6.06 Dapper Drake", "dapper"),
//!     ],
//! )]);
//!
//! assert_eq!(resolve_in(&catalog, "breezy"), Resolution::Resolved(3));
//! assert_eq!(resolve_in(&catalog, "ubuntu/dapper"), Resolution::Resolved(4));
//! assert_eq!(resolve_in(&catalog, "hardy"), Resolution::NoMatch);
//! assert!(matches!(resolve_in(&catalog, "ubuntu"), Resolution::Ambiguous(_)));
//! ```

use tracing::debug;

use super::index::{CatalogIndex, IndexEntry};
use crate::api::{ApiError, Gateway};
use crate::core::catalog::DistributionCatalog;

/// How a distribution is chosen for an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistroSelector {
    /// A distribution version id, used as-is
    Id(u64),
    /// A query such as `ubuntu/breezy` or `breezy`, resolved against the catalog
    Query(String),
}

impl From<u64> for DistroSelector {
    fn from(id: u64) -> Self {
        DistroSelector::Id(id)
    }
}

impl From<&str> for DistroSelector {
    fn from(query: &str) -> Self {
        DistroSelector::Query(query.to_string())
    }
}

impl From<String> for DistroSelector {
    fn from(query: String) -> Self {
        DistroSelector::Query(query)
    }
}

impl std::fmt::Display for DistroSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistroSelector::Id(id) => write!(f, "{}", id),
            DistroSelector::Query(q) => write!(f, "{}", q),
        }
    }
}

/// A key that matched an ambiguous query, with every id it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub key: String,
    pub ids: Vec<u64>,
}

/// The matches of a query that did not narrow to a single id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousQuery {
    query: String,
    candidates: Vec<Candidate>,
}

impl AmbiguousQuery {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Matching keys in index order.
    pub fn keys(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.key.as_str()).collect()
    }
}

impl std::fmt::Display for AmbiguousQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' is ambiguous, did you mean: {}?",
            self.query,
            self.keys().join(" ")
        )?;
        for candidate in self.candidates.iter().filter(|c| c.ids.len() > 1) {
            let ids: Vec<String> = candidate.ids.iter().map(u64::to_string).collect();
            write!(
                f,
                " ('{}' is published with ids {})",
                candidate.key,
                ids.join(", ")
            )?;
        }
        Ok(())
    }
}

/// Outcome of resolving a distribution query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one distribution version matched
    Resolved(u64),
    /// Nothing matched
    NoMatch,
    /// More than one distribution version matched
    Ambiguous(AmbiguousQuery),
    /// The catalog could not be fetched
    FetchFailed(ApiError),
}

impl Resolution {
    /// The resolved id, if any.
    pub fn id(&self) -> Option<u64> {
        match self {
            Resolution::Resolved(id) => Some(*id),
            _ => None,
        }
    }

    /// Collapse into a `Result`, keeping "no match" as `Ok(None)`.
    ///
    /// # Errors
    ///
    /// - `AmbiguousDistribution` for an ambiguous query
    /// - the gateway's error when the catalog fetch failed
    pub fn into_result(self) -> Result<Option<u64>, ApiError> {
        match self {
            Resolution::Resolved(id) => Ok(Some(id)),
            Resolution::NoMatch => Ok(None),
            Resolution::Ambiguous(q) => Err(ApiError::AmbiguousDistribution(q)),
            Resolution::FetchFailed(e) => Err(e),
        }
    }
}

/// Resolve `query` against an already-fetched catalog.
///
/// Never returns [`Resolution::FetchFailed`].
pub fn resolve_in(catalog: &DistributionCatalog, query: &str) -> Resolution {
    let index = CatalogIndex::build(catalog);
    let matches: Vec<&IndexEntry> = index.matching(query).collect();

    match matches.as_slice() {
        [] => Resolution::NoMatch,
        [only] => match only.ids() {
            [id] => Resolution::Resolved(*id),
            _ => ambiguous(query, &matches),
        },
        _ => ambiguous(query, &matches),
    }
}

fn ambiguous(query: &str, matches: &[&IndexEntry]) -> Resolution {
    Resolution::Ambiguous(AmbiguousQuery {
        query: query.to_string(),
        candidates: matches
            .iter()
            .map(|e| Candidate {
                key: e.key().to_string(),
                ids: e.ids().to_vec(),
            })
            .collect(),
    })
}

/// Fetch the catalog once through `gateway` and resolve `query` against it.
pub async fn resolve<G: Gateway + ?Sized>(gateway: &G, query: &str) -> Resolution {
    let catalog = match gateway.distributions().await {
        Ok(catalog) => catalog,
        Err(e) => {
            debug!(query, error = %e, "distribution catalog fetch failed");
            return Resolution::FetchFailed(e);
        }
    };

    let resolution = resolve_in(&catalog, query);
    debug!(query, ?resolution, "resolved distribution query");
    resolution
}

/// Turn a selector into a distribution version id, fetching the catalog
/// only for queries.
///
/// # Errors
///
/// - `DistributionNotFound` if a query matches nothing
/// - `AmbiguousDistribution` if a query matches more than one version
/// - the gateway's error if the catalog fetch fails
pub async fn resolve_selector<G: Gateway + ?Sized>(
    gateway: &G,
    selector: &DistroSelector,
) -> Result<u64, ApiError> {
    match selector {
        DistroSelector::Id(id) => Ok(*id),
        DistroSelector::Query(query) => resolve(gateway, query)
            .await
            .into_result()?
            .ok_or_else(|| ApiError::DistributionNotFound(query.clone())),
    }
}
