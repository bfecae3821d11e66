//! distro
//!
//! Distribution lookup: turning `ubuntu/breezy` or `breezy` into the numeric
//! distribution version id the upload endpoints expect.
//!
//! # Modules
//!
//! - `index`: [`CatalogIndex`] flattens the nested catalog into `family/version` keys
//! - `resolver`: substring matching and disambiguation over the index
//!
//! Nothing here is cached. Each [`resolve`] call fetches the catalog once,
//! builds a fresh index and drops it before returning.

mod index;
mod resolver;

pub use index::{CatalogIndex, IndexEntry};
pub use resolver::{
    resolve, resolve_in, resolve_selector, AmbiguousQuery, Candidate, DistroSelector, Resolution,
};
