//! api
//!
//! Access to the packagecloud REST API.
//!
//! # Architecture
//!
//! The `Gateway` trait defines every operation the service offers. Callers
//! depend on the trait, so the resolver and version check work the same
//! against the real service and the in-memory mock.
//!
//! # Modules
//!
//! - `traits`: Core `Gateway` trait, `ApiError` and response types
//! - [`http`]: reqwest implementation against packagecloud.io
//! - [`mock`]: In-memory implementation for deterministic testing
//! - `version`: Client/server version compatibility check
//!
//! # Example
//!
//! ```ignore
//! use packagecloud::api::{Gateway, HttpGateway};
//! use packagecloud::core::connection::{Connection, Credentials};
//! use packagecloud::core::package::Package;
//!
//! let gateway = HttpGateway::connect(
//!     Credentials::new("joedamato", token)?,
//!     Connection::default(),
//!     Some("release-bot"),
//! )
//! .await?;
//!
//! let package = Package::from_path("jake_1.0-7_all.deb")?;
//! gateway.put_package("test_repo", &package, Some("ubuntu/breezy".into())).await?;
//! ```

pub mod http;
pub mod mock;
mod traits;
mod version;

pub use http::HttpGateway;
pub use traits::*;
pub use version::{check_compatibility, ClientVersion};
