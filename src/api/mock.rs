//! api::mock
//!
//! Mock gateway implementation for deterministic testing.
//!
//! # Design
//!
//! The mock gateway provides an in-memory implementation of the `Gateway`
//! trait. It serves a configurable distribution catalog, stores repositories,
//! uploads and read tokens in memory, records every call and can be told to
//! fail a specific operation.
//!
//! # Example
//!
//! ```
//! use packagecloud::api::mock::MockGateway;
//! use packagecloud::api::Gateway;
//!
//! # tokio_test::block_on(async {
//! let gateway = MockGateway::new("joedamato");
//! gateway.create_repository("test_repo", true).await.unwrap();
//!
//! let repo = gateway.repository("test_repo").await.unwrap();
//! assert_eq!(repo.fqname, "joedamato/test_repo");
//! assert!(repo.private);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::traits::{
    ApiError, ContentFile, Gateway, PackageContents, PackageSummary, ReadToken, Repository,
    ServerVersion,
};
use crate::core::catalog::DistributionCatalog;
use crate::core::package::Package;
use crate::core::types::{check_path_segment, RepoName};
use crate::distro::{resolve_selector, DistroSelector};

/// Mock gateway for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockGateway {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockGatewayInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockGatewayInner {
    /// Account that owns every repository.
    username: String,
    /// Catalog served by `distributions`.
    catalog: DistributionCatalog,
    /// Version served by `server_version`.
    server_version: ServerVersion,
    /// Repositories by name.
    repositories: Vec<Repository>,
    /// Uploaded packages by repository name.
    packages: HashMap<String, Vec<UploadedPackage>>,
    /// Read tokens by (repository, master token).
    read_tokens: HashMap<(String, String), Vec<ReadToken>>,
    /// Next read token id to assign.
    next_token_id: u64,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// A package the mock accepted, with the distribution it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPackage {
    pub filename: String,
    pub distro_version_id: Option<u64>,
    pub source_files: Vec<String>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    Distributions(ApiError),
    Repositories(ApiError),
    Repository(ApiError),
    ServerVersion(ApiError),
    CreateRepository(ApiError),
    PackageContents(ApiError),
    ListPackages(ApiError),
    DeletePackage(ApiError),
    PutPackage(ApiError),
    CreateReadToken(ApiError),
    ListReadTokens(ApiError),
    DeleteReadToken(ApiError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    Distributions,
    Repositories,
    Repository {
        repo: String,
    },
    ServerVersion,
    CreateRepository {
        repo: String,
        private: bool,
    },
    PackageContents {
        repo: String,
        filename: String,
        distro: DistroSelector,
    },
    ListPackages {
        repo: String,
    },
    DeletePackage {
        repo: String,
        distro: String,
        release: String,
        filename: String,
    },
    PutPackage {
        repo: String,
        filename: String,
        distro: Option<DistroSelector>,
    },
    CreateReadToken {
        repo: String,
        master_token_id: String,
        name: String,
    },
    ListReadTokens {
        repo: String,
        master_token_id: String,
    },
    DeleteReadToken {
        repo: String,
        master_token_id: String,
        read_token_id: u64,
    },
}

impl MockGateway {
    /// Create an empty mock gateway for `username`.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockGatewayInner {
                username: username.into(),
                catalog: DistributionCatalog::new(),
                server_version: ServerVersion {
                    major: "0".into(),
                    minor: "0".into(),
                    patch: "0".into(),
                },
                repositories: Vec::new(),
                packages: HashMap::new(),
                read_tokens: HashMap::new(),
                next_token_id: 1,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Serve `catalog` from `distributions`.
    pub fn with_catalog(self, catalog: DistributionCatalog) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.catalog = catalog;
        }
        self
    }

    /// Serve `version` from `server_version`.
    pub fn with_server_version(self, version: ServerVersion) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.server_version = version;
        }
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use packagecloud::api::mock::{MockGateway, FailOn};
    /// use packagecloud::api::ApiError;
    ///
    /// let gateway = MockGateway::new("joedamato")
    ///     .fail_on(FailOn::Distributions(ApiError::Unauthenticated));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.clear();
    }

    /// Get the packages uploaded to a repository (for test verification).
    pub fn uploaded(&self, repo: &str) -> Vec<UploadedPackage> {
        let inner = self.inner.lock().unwrap();
        inner.packages.get(repo).cloned().unwrap_or_default()
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, expected: &str) -> Result<(), ApiError> {
        let inner = self.inner.lock().unwrap();
        let err = match &inner.fail_on {
            Some(FailOn::Distributions(e)) if expected == "distributions" => e,
            Some(FailOn::Repositories(e)) if expected == "repositories" => e,
            Some(FailOn::Repository(e)) if expected == "repository" => e,
            Some(FailOn::ServerVersion(e)) if expected == "server_version" => e,
            Some(FailOn::CreateRepository(e)) if expected == "create_repository" => e,
            Some(FailOn::PackageContents(e)) if expected == "package_contents" => e,
            Some(FailOn::ListPackages(e)) if expected == "list_packages" => e,
            Some(FailOn::DeletePackage(e)) if expected == "delete_package" => e,
            Some(FailOn::PutPackage(e)) if expected == "put_package" => e,
            Some(FailOn::CreateReadToken(e)) if expected == "create_read_token" => e,
            Some(FailOn::ListReadTokens(e)) if expected == "list_read_tokens" => e,
            Some(FailOn::DeleteReadToken(e)) if expected == "delete_read_token" => e,
            _ => return Ok(()),
        };
        Err(err.clone())
    }

    /// Validate a repository name and require that it exists.
    fn existing_repo(&self, repo: &str) -> Result<String, ApiError> {
        let name = RepoName::new(repo)?;
        let inner = self.inner.lock().unwrap();
        if inner.repositories.iter().any(|r| r.name == name.as_str()) {
            Ok(name.into())
        } else {
            Err(ApiError::NotFound(format!(
                "repository {}/{}",
                inner.username, name
            )))
        }
    }
}

#[async_trait]
impl Gateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn distributions(&self) -> Result<DistributionCatalog, ApiError> {
        self.record(MockOperation::Distributions);
        self.check_fail("distributions")?;

        let inner = self.inner.lock().unwrap();
        Ok(inner.catalog.clone())
    }

    async fn repositories(&self) -> Result<Vec<Repository>, ApiError> {
        self.record(MockOperation::Repositories);
        self.check_fail("repositories")?;

        let inner = self.inner.lock().unwrap();
        Ok(inner.repositories.clone())
    }

    async fn repository(&self, repo: &str) -> Result<Repository, ApiError> {
        self.record(MockOperation::Repository {
            repo: repo.to_string(),
        });
        self.check_fail("repository")?;

        let name = self.existing_repo(repo)?;
        let inner = self.inner.lock().unwrap();
        inner
            .repositories
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("repository {}", name)))
    }

    async fn server_version(&self) -> Result<ServerVersion, ApiError> {
        self.record(MockOperation::ServerVersion);
        self.check_fail("server_version")?;

        let inner = self.inner.lock().unwrap();
        Ok(inner.server_version.clone())
    }

    async fn create_repository(&self, repo: &str, private: bool) -> Result<(), ApiError> {
        self.record(MockOperation::CreateRepository {
            repo: repo.to_string(),
            private,
        });
        self.check_fail("create_repository")?;

        let name = RepoName::new(repo)?;
        let mut inner = self.inner.lock().unwrap();
        if inner.repositories.iter().any(|r| r.name == name.as_str()) {
            return Err(ApiError::Api {
                status: 422,
                message: format!("repository {} already exists", name),
            });
        }

        let fqname = format!("{}/{}", inner.username, name);
        inner.repositories.push(Repository {
            name: name.into(),
            url: Some(format!("https://packagecloud.io/{}", fqname)),
            fqname,
            private,
            created_at: None,
            last_push_human: None,
            package_count_human: None,
        });
        Ok(())
    }

    async fn package_contents(
        &self,
        repo: &str,
        package: &Package,
        distro: DistroSelector,
    ) -> Result<PackageContents, ApiError> {
        self.record(MockOperation::PackageContents {
            repo: repo.to_string(),
            filename: package.filename().to_string(),
            distro: distro.clone(),
        });
        self.check_fail("package_contents")?;

        self.existing_repo(repo)?;
        resolve_selector(self, &distro).await?;

        // The mock reports the attached source files as the referenced files.
        let files = package
            .source_files()
            .iter()
            .map(|s| ContentFile {
                filename: s.filename.clone(),
                size: s.contents.len() as u64,
                md5sum: String::new(),
            })
            .collect();
        Ok(PackageContents { files })
    }

    async fn list_packages(&self, repo: &str) -> Result<Vec<PackageSummary>, ApiError> {
        self.record(MockOperation::ListPackages {
            repo: repo.to_string(),
        });
        self.check_fail("list_packages")?;

        let name = self.existing_repo(repo)?;
        let inner = self.inner.lock().unwrap();
        let summaries = inner
            .packages
            .get(&name)
            .map(|pkgs| {
                pkgs.iter()
                    .map(|p| PackageSummary {
                        name: p.filename.clone(),
                        filename: p.filename.clone(),
                        distro_version: p.distro_version_id.map(|id| id.to_string()),
                        version: None,
                        release: None,
                        package_type: None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(summaries)
    }

    async fn delete_package(
        &self,
        repo: &str,
        distro: &str,
        release: &str,
        filename: &str,
    ) -> Result<(), ApiError> {
        self.record(MockOperation::DeletePackage {
            repo: repo.to_string(),
            distro: distro.to_string(),
            release: release.to_string(),
            filename: filename.to_string(),
        });
        self.check_fail("delete_package")?;

        check_path_segment("distribution", distro)?;
        check_path_segment("release", release)?;
        check_path_segment("filename", filename)?;
        let name = self.existing_repo(repo)?;
        let mut inner = self.inner.lock().unwrap();
        let pkgs = inner.packages.entry(name).or_default();
        let before = pkgs.len();
        pkgs.retain(|p| p.filename != filename);
        if pkgs.len() == before {
            return Err(ApiError::NotFound(format!(
                "{}/{}/{}",
                distro, release, filename
            )));
        }
        Ok(())
    }

    async fn put_package(
        &self,
        repo: &str,
        package: &Package,
        distro: Option<DistroSelector>,
    ) -> Result<(), ApiError> {
        self.record(MockOperation::PutPackage {
            repo: repo.to_string(),
            filename: package.filename().to_string(),
            distro: distro.clone(),
        });
        self.check_fail("put_package")?;

        let name = self.existing_repo(repo)?;
        let distro_version_id = match &distro {
            Some(selector) => Some(resolve_selector(self, selector).await?),
            None => None,
        };

        let mut inner = self.inner.lock().unwrap();
        inner.packages.entry(name).or_default().push(UploadedPackage {
            filename: package.filename().to_string(),
            distro_version_id,
            source_files: package
                .source_files()
                .iter()
                .map(|s| s.filename.clone())
                .collect(),
        });
        Ok(())
    }

    async fn create_read_token(
        &self,
        repo: &str,
        master_token_id: &str,
        name: &str,
    ) -> Result<ReadToken, ApiError> {
        self.record(MockOperation::CreateReadToken {
            repo: repo.to_string(),
            master_token_id: master_token_id.to_string(),
            name: name.to_string(),
        });
        self.check_fail("create_read_token")?;

        check_path_segment("master token id", master_token_id)?;
        let repo_name = self.existing_repo(repo)?;
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_token_id;
        inner.next_token_id += 1;

        let token = ReadToken {
            id,
            name: name.to_string(),
            value: format!("mock-read-token-{}", id),
        };
        inner
            .read_tokens
            .entry((repo_name, master_token_id.to_string()))
            .or_default()
            .push(token.clone());
        Ok(token)
    }

    async fn list_read_tokens(
        &self,
        repo: &str,
        master_token_id: &str,
    ) -> Result<Vec<ReadToken>, ApiError> {
        self.record(MockOperation::ListReadTokens {
            repo: repo.to_string(),
            master_token_id: master_token_id.to_string(),
        });
        self.check_fail("list_read_tokens")?;

        check_path_segment("master token id", master_token_id)?;
        let repo_name = self.existing_repo(repo)?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .read_tokens
            .get(&(repo_name, master_token_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_read_token(
        &self,
        repo: &str,
        master_token_id: &str,
        read_token_id: u64,
    ) -> Result<(), ApiError> {
        self.record(MockOperation::DeleteReadToken {
            repo: repo.to_string(),
            master_token_id: master_token_id.to_string(),
            read_token_id,
        });
        self.check_fail("delete_read_token")?;

        check_path_segment("master token id", master_token_id)?;
        let repo_name = self.existing_repo(repo)?;
        let mut inner = self.inner.lock().unwrap();
        let tokens = inner
            .read_tokens
            .get_mut(&(repo_name, master_token_id.to_string()))
            .ok_or_else(|| ApiError::NotFound(format!("master token {}", master_token_id)))?;
        let before = tokens.len();
        tokens.retain(|t| t.id != read_token_id);
        if tokens.len() == before {
            return Err(ApiError::NotFound(format!("read token {}", read_token_id)));
        }
        Ok(())
    }
}
