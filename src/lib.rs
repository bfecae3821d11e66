//! packagecloud - a client library for the packagecloud.io package hosting API
//!
//! The library lists distributions and repositories, uploads packages
//! (including Debian source packages with their tarballs), and manages read
//! tokens.
//!
//! # Architecture
//!
//! - [`core`] - Value objects: credentials, connection, packages, catalog, config
//! - [`api`] - The `Gateway` trait with HTTP and in-memory implementations
//! - [`distro`] - Resolves `ubuntu/breezy` style queries to distribution ids
//!
//! # Distribution Queries
//!
//! Uploads take either a numeric distribution version id or a query. A query
//! is matched as a substring of every `family/version` key in the catalog and
//! must match exactly one version; see [`distro::Resolution`].

pub mod api;
pub mod core;
pub mod distro;

/// Version of this library, sent in the User-Agent header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
