//! core::catalog
//!
//! The distribution catalog as returned by `GET /api/v1/distributions.json`.
//!
//! # Wire Format
//!
//! ```json
//! {
//!   "deb": [
//!     {
//!       "display_name": "Ubuntu",
//!       "index_name": "ubuntu",
//!       "versions": [
//!         {"id": 3, "display_name": "5.10 Breezy Badger", "index_name": "breezy", "version_number": "5.10"}
//!       ]
//!     }
//!   ],
//!   "py": [ ... ]
//! }
//! ```
//!
//! The top-level keys are package formats. Formats are kept in a `BTreeMap`;
//! [`DistributionCatalog::formats`] yields them in flattening order.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Formats merged first, in this order, when flattening the catalog.
pub const PRIMARY_FORMATS: [&str; 4] = ["deb", "rpm", "py", "node"];

/// Package formats mapped to their distribution families.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistributionCatalog {
    families: BTreeMap<String, Vec<DistributionFamily>>,
}

/// A named platform lineage such as `ubuntu` or `python`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionFamily {
    #[serde(default, deserialize_with = "nullable_string")]
    pub display_name: String,
    pub index_name: String,
    #[serde(default)]
    pub versions: Vec<DistributionVersion>,
}

/// A release within a family. `id` is what the upload API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionVersion {
    pub id: u64,
    #[serde(default, deserialize_with = "nullable_string")]
    pub display_name: String,
    pub index_name: String,
    #[serde(default)]
    pub version_number: Option<String>,
}

/// Display names are cosmetic; a missing or null one becomes empty rather
/// than failing the whole catalog.
fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl DistributionCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a format's families.
    ///
    /// Replaces any families already registered for `format`.
    pub fn with_format(
        mut self,
        format: impl Into<String>,
        families: Vec<DistributionFamily>,
    ) -> Self {
        self.families.insert(format.into(), families);
        self
    }

    /// Families for a single format.
    pub fn format(&self, format: &str) -> Option<&[DistributionFamily]> {
        self.families.get(format).map(Vec::as_slice)
    }

    /// Every format with its families, in flattening order.
    ///
    /// `deb`, `rpm`, `py` and `node` come first when present, followed by the
    /// remaining formats in lexicographic order.
    pub fn formats(&self) -> impl Iterator<Item = (&str, &[DistributionFamily])> {
        let primary = PRIMARY_FORMATS
            .iter()
            .filter_map(|f| self.families.get_key_value(*f));
        let rest = self
            .families
            .iter()
            .filter(|(k, _)| !PRIMARY_FORMATS.contains(&k.as_str()));
        primary
            .chain(rest)
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.families.values().all(Vec::is_empty)
    }
}

impl DistributionFamily {
    pub fn new(
        display_name: impl Into<String>,
        index_name: impl Into<String>,
        versions: Vec<DistributionVersion>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            index_name: index_name.into(),
            versions,
        }
    }
}

impl DistributionVersion {
    pub fn new(id: u64, display_name: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            index_name: index_name.into(),
            version_number: None,
        }
    }

    pub fn with_version_number(mut self, number: impl Into<String>) -> Self {
        self.version_number = Some(number.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "dsc": [{"display_name": "Ubuntu", "index_name": "ubuntu", "versions": []}],
        "rpm": [{"display_name": "Fedora", "index_name": "fedora", "versions": [
            {"id": 30, "display_name": "Fedora 14", "index_name": "14", "version_number": "14"}
        ]}],
        "deb": [{"display_name": "Ubuntu", "index_name": "ubuntu", "versions": [
            {"id": 3, "display_name": "5.10 Breezy Badger", "index_name": "breezy", "version_number": "5.10"},
            {"id": 4, "display_name": "6.06 Dapper Drake", "index_name": "dapper", "version_number": null}
        ]}],
        "anyfile": [{"display_name": "Any", "index_name": "any", "versions": [
            {"id": 900, "display_name": "Any", "index_name": "any"}
        ]}]
    }"#;

    #[test]
    fn parses_wire_format() {
        let catalog: DistributionCatalog = serde_json::from_str(SAMPLE).unwrap();

        let deb = catalog.format("deb").unwrap();
        assert_eq!(deb.len(), 1);
        assert_eq!(deb[0].index_name, "ubuntu");
        assert_eq!(deb[0].versions[0].id, 3);
        assert_eq!(deb[0].versions[0].version_number.as_deref(), Some("5.10"));
        assert!(deb[0].versions[1].version_number.is_none());

        // version_number may be omitted entirely
        let any = catalog.format("anyfile").unwrap();
        assert!(any[0].versions[0].version_number.is_none());
    }

    #[test]
    fn formats_puts_primary_first() {
        let catalog: DistributionCatalog = serde_json::from_str(SAMPLE).unwrap();
        let order: Vec<&str> = catalog.formats().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["deb", "rpm", "anyfile", "dsc"]);
    }

    #[test]
    fn display_names_are_optional() {
        let catalog: DistributionCatalog = serde_json::from_str(
            r#"{"deb": [
                {"index_name": "ubuntu", "versions": [
                    {"id": 3, "display_name": null, "index_name": "breezy"},
                    {"id": 4, "index_name": "dapper"}
                ]},
                {"display_name": null, "index_name": "debian", "versions": [
                    {"id": 19, "display_name": "7 wheezy", "index_name": "wheezy"}
                ]}
            ]}"#,
        )
        .unwrap();

        let deb = catalog.format("deb").unwrap();
        assert_eq!(deb[0].display_name, "");
        assert_eq!(deb[0].versions[0].display_name, "");
        assert_eq!(deb[0].versions[1].index_name, "dapper");
        assert_eq!(deb[1].display_name, "");
        assert_eq!(deb[1].versions[0].display_name, "7 wheezy");

        assert_eq!(
            crate::distro::resolve_in(&catalog, "ubuntu/breezy"),
            crate::distro::Resolution::Resolved(3)
        );
    }

    #[test]
    fn empty_catalog() {
        let catalog: DistributionCatalog = serde_json::from_str("{}").unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.formats().count(), 0);
    }

    #[test]
    fn builder_matches_parsed() {
        let built = DistributionCatalog::new().with_format(
            "rpm",
            vec![DistributionFamily::new(
                "Fedora",
                "fedora",
                vec![DistributionVersion::new(30, "Fedora 14", "14").with_version_number("14")],
            )],
        );
        let parsed: DistributionCatalog = serde_json::from_str(
            r#"{"rpm": [{"display_name": "Fedora", "index_name": "fedora", "versions": [
                {"id": 30, "display_name": "Fedora 14", "index_name": "14", "version_number": "14"}
            ]}]}"#,
        )
        .unwrap();
        assert_eq!(built, parsed);
    }
}
