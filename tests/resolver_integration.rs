//! Integration tests for distribution resolution.
//!
//! These tests drive the resolver through `MockGateway`, serving the same
//! catalog fixture the HTTP tests use.

use packagecloud::api::mock::{FailOn, MockGateway, MockOperation};
use packagecloud::api::{ApiError, Gateway};
use packagecloud::core::catalog::{DistributionCatalog, DistributionFamily, DistributionVersion};
use packagecloud::core::package::Package;
use packagecloud::distro::{resolve, resolve_selector, CatalogIndex, DistroSelector, Resolution};

const DISTROS: &str = include_str!("fixtures/distros.json");

fn fixture_catalog() -> DistributionCatalog {
    serde_json::from_str(DISTROS).unwrap()
}

fn gateway() -> MockGateway {
    MockGateway::new("joedamato").with_catalog(fixture_catalog())
}

/// Ubuntu with breezy (3) and dapper (4), nothing else.
fn ubuntu_only() -> MockGateway {
    MockGateway::new("joedamato").with_catalog(DistributionCatalog::new().with_format(
        "deb",
        vec![DistributionFamily::new(
            "Ubuntu",
            "ubuntu",
            vec![
                DistributionVersion::new(3, "5.10 Breezy Badger", "breezy"),
                DistributionVersion::new(4, "6.06 Dapper Drake", "dapper"),
            ],
        )],
    ))
}

// =============================================================================
// Resolution policy
// =============================================================================

mod policy {
    use super::*;

    #[tokio::test]
    async fn full_key_resolves() {
        assert_eq!(
            resolve(&ubuntu_only(), "ubuntu/breezy").await,
            Resolution::Resolved(3)
        );
    }

    #[tokio::test]
    async fn version_slug_resolves() {
        assert_eq!(resolve(&ubuntu_only(), "breezy").await, Resolution::Resolved(3));
    }

    #[tokio::test]
    async fn family_is_ambiguous_in_catalog_order() {
        match resolve(&ubuntu_only(), "ubuntu").await {
            Resolution::Ambiguous(q) => {
                assert_eq!(q.keys(), vec!["ubuntu/breezy", "ubuntu/dapper"]);
                assert_eq!(
                    q.to_string(),
                    "'ubuntu' is ambiguous, did you mean: ubuntu/breezy ubuntu/dapper?"
                );
            }
            other => panic!("expected ambiguous, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unknown_slug_is_no_match() {
        assert_eq!(
            resolve(&ubuntu_only(), "nonexistent-slug").await,
            Resolution::NoMatch
        );
        assert_eq!(
            resolve(&gateway(), "ubuasdalsdntu/breezy").await,
            Resolution::NoMatch
        );
    }

    #[tokio::test]
    async fn python_resolves_across_formats() {
        // "python" only exists under the py format.
        assert_eq!(resolve(&gateway(), "python").await, Resolution::Resolved(166));
        assert_eq!(resolve(&gateway(), "node/1").await, Resolution::Resolved(203));
        assert_eq!(resolve(&gateway(), "el/6").await, Resolution::Resolved(21));
    }

    #[tokio::test]
    async fn same_id_in_deb_and_dsc_is_not_ambiguous() {
        assert_eq!(resolve(&gateway(), "breezy").await, Resolution::Resolved(3));
        assert_eq!(resolve(&gateway(), "precise").await, Resolution::Resolved(22));
    }

    #[tokio::test]
    async fn conflicting_ids_across_formats_are_ambiguous() {
        let catalog = fixture_catalog().with_format(
            "anyfile",
            vec![DistributionFamily::new(
                "Python",
                "python",
                vec![DistributionVersion::new(999, "Python", "1")],
            )],
        );
        let gw = MockGateway::new("joedamato").with_catalog(catalog);

        match resolve(&gw, "python/1").await {
            Resolution::Ambiguous(q) => {
                assert_eq!(q.keys(), vec!["python/1"]);
                assert_eq!(q.candidates()[0].ids, vec![166, 999]);
            }
            other => panic!("expected ambiguous, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn fetch_failure_is_distinct_from_no_match() {
        let gw = gateway().fail_on(FailOn::Distributions(ApiError::Unauthenticated));
        assert_eq!(
            resolve(&gw, "ubuntu/breezy").await,
            Resolution::FetchFailed(ApiError::Unauthenticated)
        );
    }
}

// =============================================================================
// Call behavior
// =============================================================================

mod behavior {
    use super::*;

    #[tokio::test]
    async fn fetches_catalog_exactly_once_per_call() {
        let gw = gateway();
        resolve(&gw, "breezy").await;
        assert_eq!(gw.operations(), vec![MockOperation::Distributions]);

        resolve(&gw, "ubuntu").await;
        assert_eq!(gw.operations().len(), 2);
    }

    #[tokio::test]
    async fn idempotent() {
        let gw = gateway();
        for query in ["breezy", "ubuntu", "nothing-here", "python"] {
            let first = resolve(&gw, query).await;
            let second = resolve(&gw, query).await;
            assert_eq!(first, second, "query {:?}", query);
        }
    }

    #[tokio::test]
    async fn resolved_id_matches_catalog_entry() {
        let catalog = fixture_catalog();
        let gw = MockGateway::new("joedamato").with_catalog(catalog.clone());

        for (_, families) in catalog.formats() {
            for family in families {
                for version in &family.versions {
                    let key = format!("{}/{}", family.index_name, version.index_name);
                    if let Resolution::Resolved(id) = resolve(&gw, &key).await {
                        assert_eq!(id, version.id, "key {}", key);
                    }
                }
            }
        }
    }

    #[tokio::test]
    async fn index_covers_every_format() {
        let index = CatalogIndex::build(&fixture_catalog());
        assert!(index.get("ubuntu/breezy").is_some());
        assert!(index.get("el/5").is_some());
        assert!(index.get("python/1").is_some());
        assert!(index.get("node/1").is_some());
        assert_eq!(index.collisions().count(), 0);
    }
}

// =============================================================================
// Selectors and uploads
// =============================================================================

mod selectors {
    use super::*;

    #[tokio::test]
    async fn id_selector_skips_fetch() {
        let gw = gateway();
        let id = resolve_selector(&gw, &DistroSelector::Id(22)).await.unwrap();
        assert_eq!(id, 22);
        assert!(gw.operations().is_empty());
    }

    #[tokio::test]
    async fn query_selector_errors() {
        let gw = gateway();

        let err = resolve_selector(&gw, &"hardy".into()).await.unwrap_err();
        assert_eq!(err, ApiError::DistributionNotFound("hardy".into()));

        let err = resolve_selector(&gw, &"ubuntu".into()).await.unwrap_err();
        assert!(matches!(err, ApiError::AmbiguousDistribution(_)));
        assert!(err.to_string().contains("ubuntu/breezy"));
    }

    #[tokio::test]
    async fn put_package_with_query_records_resolved_id() {
        let gw = gateway();
        gw.create_repository("test_repo", false).await.unwrap();

        let package = Package::from_bytes("libampsharp2.0-cil_2.0.4-1_all.deb", vec![0u8; 16]).unwrap();
        gw.put_package("test_repo", &package, Some("ubuntu/breezy".into()))
            .await
            .unwrap();

        let uploaded = gw.uploaded("test_repo");
        assert_eq!(uploaded.len(), 1);
        assert_eq!(uploaded[0].distro_version_id, Some(3));
    }

    #[tokio::test]
    async fn put_source_package_keeps_source_files() {
        let gw = gateway();
        gw.create_repository("test_repo", false).await.unwrap();

        let package = Package::from_bytes("jake_1.0-7.dsc", b"dsc".to_vec())
            .unwrap()
            .with_source_file("jake_1.0.orig.tar.bz2", b"orig".to_vec())
            .with_source_file("jake_1.0-7.debian.tar.gz", b"debian".to_vec());
        gw.put_package("test_repo", &package, Some(DistroSelector::Id(22)))
            .await
            .unwrap();

        let uploaded = gw.uploaded("test_repo");
        assert_eq!(
            uploaded[0].source_files,
            vec!["jake_1.0.orig.tar.bz2", "jake_1.0-7.debian.tar.gz"]
        );
        assert_eq!(uploaded[0].distro_version_id, Some(22));
    }

    #[tokio::test]
    async fn ambiguous_upload_is_rejected() {
        let gw = gateway();
        gw.create_repository("test_repo", false).await.unwrap();

        let package = Package::from_bytes("a.deb", vec![1, 2, 3]).unwrap();
        let err = gw
            .put_package("test_repo", &package, Some("ubuntu".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::AmbiguousDistribution(_)));
        assert!(gw.uploaded("test_repo").is_empty());
    }

    #[tokio::test]
    async fn package_contents_requires_resolvable_distro() {
        let gw = gateway();
        gw.create_repository("test_repo", false).await.unwrap();

        let package = Package::from_bytes("jake_1.0-7.dsc", b"dsc".to_vec())
            .unwrap()
            .with_source_file("jake_1.0.orig.tar.bz2", b"orig".to_vec());

        let contents = gw
            .package_contents("test_repo", &package, "precise".into())
            .await
            .unwrap();
        assert_eq!(contents.files[0].filename, "jake_1.0.orig.tar.bz2");

        let err = gw
            .package_contents("test_repo", &package, "hardy".into())
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::DistributionNotFound("hardy".into()));
    }
}
