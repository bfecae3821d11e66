//! distro::index
//!
//! Flat `family/version` index over a [`DistributionCatalog`].
//!
//! # Invariants
//!
//! - Every family/version pair of every format is indexed under
//!   `"<family index_name>/<version index_name>"`.
//! - Entries keep the position of the first time their key was seen,
//!   following [`DistributionCatalog::formats`] order.
//! - A key never silently drops an identifier. When two formats publish the
//!   same key with different ids, the entry carries both and is ambiguous.
//!
//! The index is built per lookup and is immutable once built.

use std::collections::HashMap;

use tracing::warn;

use crate::core::catalog::DistributionCatalog;

/// One composite key and every distinct identifier published under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    key: String,
    ids: Vec<u64>,
}

impl IndexEntry {
    /// The `family/version` key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Distinct identifiers, in the order they were seen.
    pub fn ids(&self) -> &[u64] {
        &self.ids
    }

    /// The identifier, if the key maps to exactly one.
    pub fn id(&self) -> Option<u64> {
        match self.ids.as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }

    /// True when more than one distinct identifier shares this key.
    pub fn is_collision(&self) -> bool {
        self.ids.len() > 1
    }
}

/// Composite key index built from a distribution catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    entries: Vec<IndexEntry>,
    positions: HashMap<String, usize>,
}

impl CatalogIndex {
    /// Flatten every format of `catalog` into a single namespace.
    pub fn build(catalog: &DistributionCatalog) -> Self {
        let mut index = Self::default();

        for (format, families) in catalog.formats() {
            for family in families {
                for version in &family.versions {
                    let key = format!("{}/{}", family.index_name, version.index_name);
                    index.insert(format, key, version.id);
                }
            }
        }

        index
    }

    fn insert(&mut self, format: &str, key: String, id: u64) {
        match self.positions.get(&key) {
            Some(&pos) => {
                let entry = &mut self.entries[pos];
                if !entry.ids.contains(&id) {
                    warn!(
                        key = %entry.key,
                        format,
                        existing = ?entry.ids,
                        id,
                        "distribution key published with conflicting ids"
                    );
                    entry.ids.push(id);
                }
            }
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push(IndexEntry { key, ids: vec![id] });
            }
        }
    }

    /// Look up an exact composite key.
    pub fn get(&self, key: &str) -> Option<&IndexEntry> {
        self.positions.get(key).map(|&pos| &self.entries[pos])
    }

    /// All entries in index order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Entries whose key contains `query` (case-sensitive, unanchored).
    pub fn matching<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a IndexEntry> + 'a {
        self.entries.iter().filter(move |e| e.key.contains(query))
    }

    /// Entries whose key carries more than one identifier.
    pub fn collisions(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter().filter(|e| e.is_collision())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{DistributionFamily, DistributionVersion};

    fn family(index_name: &str, versions: &[(u64, &str)]) -> DistributionFamily {
        DistributionFamily::new(
            index_name.to_uppercase(),
            index_name,
            versions
                .iter()
                .map(|(id, name)| DistributionVersion::new(*id, *name, *name))
                .collect(),
        )
    }

    fn keys(index: &CatalogIndex) -> Vec<&str> {
        index.entries().iter().map(|e| e.key()).collect()
    }

    #[test]
    fn flattens_family_and_version() {
        let catalog = DistributionCatalog::new().with_format(
            "deb",
            vec![family("ubuntu", &[(3, "breezy"), (4, "dapper")])],
        );
        let index = CatalogIndex::build(&catalog);

        assert_eq!(keys(&index), vec!["ubuntu/breezy", "ubuntu/dapper"]);
        assert_eq!(index.get("ubuntu/breezy").unwrap().id(), Some(3));
        assert_eq!(index.get("ubuntu/dapper").unwrap().id(), Some(4));
        assert!(index.get("ubuntu").is_none());
    }

    #[test]
    fn merges_all_formats() {
        let catalog = DistributionCatalog::new()
            .with_format("node", vec![family("node", &[(200, "1")])])
            .with_format("py", vec![family("python", &[(166, "1")])])
            .with_format("rpm", vec![family("el", &[(20, "6")])])
            .with_format("deb", vec![family("ubuntu", &[(3, "breezy")])])
            .with_format("anyfile", vec![family("any", &[(900, "any")])]);
        let index = CatalogIndex::build(&catalog);

        assert_eq!(
            keys(&index),
            vec!["ubuntu/breezy", "el/6", "python/1", "node/1", "any/any"]
        );
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn collision_keeps_both_ids() {
        let catalog = DistributionCatalog::new()
            .with_format("deb", vec![family("ubuntu", &[(3, "breezy")])])
            .with_format("dsc", vec![family("ubuntu", &[(9, "breezy")])]);
        let index = CatalogIndex::build(&catalog);

        let entry = index.get("ubuntu/breezy").unwrap();
        assert_eq!(entry.ids(), &[3, 9]);
        assert!(entry.is_collision());
        assert!(entry.id().is_none());
        assert_eq!(index.collisions().count(), 1);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn repeated_identical_id_is_not_collision() {
        let catalog = DistributionCatalog::new()
            .with_format("deb", vec![family("ubuntu", &[(3, "breezy")])])
            .with_format("dsc", vec![family("ubuntu", &[(3, "breezy")])]);
        let index = CatalogIndex::build(&catalog);

        let entry = index.get("ubuntu/breezy").unwrap();
        assert_eq!(entry.ids(), &[3]);
        assert_eq!(index.collisions().count(), 0);
    }

    #[test]
    fn matching_is_unanchored_and_case_sensitive() {
        let catalog = DistributionCatalog::new().with_format(
            "deb",
            vec![
                family("ubuntu", &[(3, "breezy"), (4, "dapper")]),
                family("debian", &[(10, "squeeze")]),
            ],
        );
        let index = CatalogIndex::build(&catalog);

        let hits: Vec<&str> = index.matching("eez").map(|e| e.key()).collect();
        assert_eq!(hits, vec!["ubuntu/breezy", "debian/squeeze"]);

        assert_eq!(index.matching("Ubuntu").count(), 0);
        assert_eq!(index.matching("/").count(), 3);
    }

    #[test]
    fn empty_catalog() {
        let index = CatalogIndex::build(&DistributionCatalog::new());
        assert!(index.is_empty());
        assert_eq!(index.matching("").count(), 0);
    }
}
