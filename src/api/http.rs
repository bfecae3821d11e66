//! api::http
//!
//! Gateway implementation over the packagecloud REST API.
//!
//! # Design
//!
//! Every request carries HTTP basic auth (the API token as user, empty
//! password) and a `User-Agent` naming this library and the embedding tool.
//! JSON endpoints are decoded with serde; uploads are `multipart/form-data`.
//!
//! URLs are assembled one path segment at a time. Caller-supplied segments
//! (repository, distribution, release, filename, token ids) are checked with
//! [`check_path_segment`] and percent-encoded, so a value can never climb
//! out of the resource it names.
//!
//! # Status Codes
//!
//! - 200 and 201 are success (204 for read token deletion)
//! - 401 is [`ApiError::Unauthenticated`]
//! - 404 is [`ApiError::NotFound`] with the response body
//! - anything else is [`ApiError::Api`] with status and body
//!
//! There is no retry, pagination or rate limiting here.
//!
//! # Example
//!
//! ```ignore
//! use packagecloud::api::{Gateway, HttpGateway};
//! use packagecloud::core::config::Config;
//!
//! let config = Config::load()?;
//! let gateway = HttpGateway::connect(
//!     config.credentials()?,
//!     config.connection(),
//!     config.user_agent(),
//! )
//! .await?;
//!
//! for repo in gateway.repositories().await? {
//!     println!("{}", repo.fqname);
//! }
//! ```

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::traits::{
    ApiError, Gateway, PackageContents, PackageSummary, ReadToken, ReadTokenList, Repository,
    ServerVersion,
};
use crate::core::catalog::DistributionCatalog;
use crate::core::connection::{Connection, Credentials};
use crate::core::package::Package;
use crate::core::types::{check_path_segment, RepoName};
use crate::distro::{resolve_selector, DistroSelector};
use crate::VERSION;

/// Path prefix shared by every endpoint.
const API_PREFIX: [&str; 2] = ["api", "v1"];

/// Multipart field for the distribution version id.
const FIELD_DISTRO_VERSION: &str = "package[distro_version_id]";

/// Multipart field for the package file.
const FIELD_PACKAGE_FILE: &str = "package[package_file]";

/// Multipart field for each source file.
const FIELD_SOURCE_FILES: &str = "package[source_files][]";

/// HTTP gateway to packagecloud.io (or any compatible host).
pub struct HttpGateway {
    /// HTTP client for making requests
    client: Client,
    /// Account credentials
    credentials: Credentials,
    /// Service location and timeouts
    connection: Connection,
    /// Full User-Agent header value
    user_agent: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("username", self.credentials.username())
            .field("base_url", &self.connection.base_url())
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl HttpGateway {
    /// Create a gateway without contacting the server.
    ///
    /// `user_agent` is appended to the library's own identifier; it
    /// defaults to the library identifier itself.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client cannot be built.
    pub fn new(
        credentials: Credentials,
        connection: Connection,
        user_agent: Option<&str>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(connection.connect_timeout)
            .timeout(connection.read_timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let default_agent = format!("packagecloud-rs {}", VERSION);
        let user_agent = format!(
            "packagecloud-rs {}/{}",
            VERSION,
            user_agent.unwrap_or(&default_agent)
        );

        Ok(Self {
            client,
            credentials,
            connection,
            user_agent,
        })
    }

    /// Create a gateway and check the credentials against the server.
    ///
    /// The check fetches the distribution catalog once. Only a rejected
    /// token fails construction; other failures are logged and left for
    /// the first real call to report.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if the server rejects the token
    /// - `Network` if the HTTP client cannot be built
    pub async fn connect(
        credentials: Credentials,
        connection: Connection,
        user_agent: Option<&str>,
    ) -> Result<Self, ApiError> {
        let gateway = Self::new(credentials, connection, user_agent)?;
        match gateway.distributions().await {
            Ok(_) => Ok(gateway),
            Err(ApiError::Unauthenticated) => Err(ApiError::Unauthenticated),
            Err(e) => {
                warn!(error = %e, "credential check failed, continuing");
                Ok(gateway)
            }
        }
    }

    /// Get the User-Agent header value sent with every request.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Get the connection this gateway talks to.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Build a URL under `/api/v1` from already-checked segments.
    fn api_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let base = self.connection.base_url();
        let mut url = Url::parse(&base).map_err(|e| ApiError::Network(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Network(format!("'{}' cannot be a base URL", base)))?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    /// Build a URL below `/api/v1/repos/{user}/{repo}`.
    ///
    /// `rest` pairs each segment with the field it came from, so a rejected
    /// value is reported by name.
    fn repo_url(&self, repo: &str, rest: &[(&'static str, &str)]) -> Result<Url, ApiError> {
        let repo = RepoName::new(repo)?;
        let mut segments = vec!["repos", self.credentials.username().as_str(), repo.as_str()];
        for &(field, value) in rest {
            check_path_segment(field, value)?;
            segments.push(value);
        }
        self.api_url(&segments)
    }

    /// Build the `read_tokens` collection URL under a master token.
    fn read_tokens_url(&self, repo: &str, master_token_id: &str) -> Result<Url, ApiError> {
        self.repo_url(
            repo,
            &[
                ("path", "master_tokens"),
                ("master token id", master_token_id),
                ("path", "read_tokens.json"),
            ],
        )
    }

    /// Start a request with auth and User-Agent applied.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(self.credentials.token(), None::<&str>)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
    }

    /// Send a request and map the status to an error if it is not accepted.
    async fn send(
        &self,
        builder: RequestBuilder,
        accepted: &[StatusCode],
    ) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(|e| {
            debug!(url = ?e.url().map(Url::path), error = %e, "request failed");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        debug!(
            path = response.url().path(),
            status = status.as_u16(),
            "response received"
        );

        if accepted.contains(&status) {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthenticated,
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            _ => ApiError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    /// Decode a JSON body.
    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, url), SUCCESS).await?;
        Self::json(response).await
    }

    async fn post_json<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<Response, ApiError> {
        self.send(self.request(Method::POST, url).json(body), SUCCESS)
            .await
    }

    async fn post_multipart(&self, url: Url, form: Form) -> Result<Response, ApiError> {
        // Uploads get the write window on top of the read window.
        let timeout = self
            .connection
            .read_timeout
            .saturating_add(self.connection.write_timeout);
        let builder = self
            .request(Method::POST, url)
            .timeout(timeout)
            .multipart(form);
        self.send(builder, SUCCESS).await
    }

    async fn distro_id(&self, selector: &DistroSelector) -> Result<u64, ApiError> {
        resolve_selector(self, selector).await
    }
}

/// Status codes treated as success for most endpoints.
const SUCCESS: &[StatusCode] = &[StatusCode::OK, StatusCode::CREATED];

/// Build a binary file part.
fn file_part(filename: &str, contents: &[u8]) -> Result<Part, ApiError> {
    Part::bytes(contents.to_vec())
        .file_name(filename.to_string())
        .mime_str("application/octet-stream")
        .map_err(|e| ApiError::Network(e.to_string()))
}

fn warn_if_unsupported(package: &Package) {
    if !package.has_supported_extension() {
        warn!(
            filename = package.filename(),
            "package extension is not one the service recognizes"
        );
    }
}

/// Request body for creating a repository.
#[derive(Serialize)]
struct CreateRepositoryBody<'a> {
    repository: NewRepository<'a>,
}

#[derive(Serialize)]
struct NewRepository<'a> {
    name: &'a str,
    /// The API expects "0" or "1"
    private: &'static str,
}

#[async_trait]
impl Gateway for HttpGateway {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn distributions(&self) -> Result<DistributionCatalog, ApiError> {
        self.get_json(self.api_url(&["distributions.json"])?).await
    }

    async fn repositories(&self) -> Result<Vec<Repository>, ApiError> {
        self.get_json(self.api_url(&["repos.json"])?).await
    }

    async fn repository(&self, repo: &str) -> Result<Repository, ApiError> {
        let repo = RepoName::new(repo)?;
        let url = self.api_url(&[
            "repos",
            self.credentials.username().as_str(),
            &format!("{}.json", repo),
        ])?;
        self.get_json(url).await
    }

    async fn server_version(&self) -> Result<ServerVersion, ApiError> {
        self.get_json(self.api_url(&["gem_version.json"])?).await
    }

    async fn create_repository(&self, repo: &str, private: bool) -> Result<(), ApiError> {
        let name = RepoName::new(repo)?;
        let body = CreateRepositoryBody {
            repository: NewRepository {
                name: name.as_str(),
                private: if private { "1" } else { "0" },
            },
        };
        self.post_json(self.api_url(&["repos.json"])?, &body).await?;
        Ok(())
    }

    async fn package_contents(
        &self,
        repo: &str,
        package: &Package,
        distro: DistroSelector,
    ) -> Result<PackageContents, ApiError> {
        let url = self.repo_url(repo, &[("path", "packages"), ("path", "contents.json")])?;
        let distro_id = self.distro_id(&distro).await?;

        let form = Form::new()
            .part(
                FIELD_PACKAGE_FILE,
                file_part(package.filename(), package.contents())?,
            )
            .text(FIELD_DISTRO_VERSION, distro_id.to_string());

        let response = self.post_multipart(url, form).await?;
        Self::json(response).await
    }

    async fn list_packages(&self, repo: &str) -> Result<Vec<PackageSummary>, ApiError> {
        let url = self.repo_url(repo, &[("path", "packages.json")])?;
        self.get_json(url).await
    }

    async fn delete_package(
        &self,
        repo: &str,
        distro: &str,
        release: &str,
        filename: &str,
    ) -> Result<(), ApiError> {
        let url = self.repo_url(
            repo,
            &[
                ("distribution", distro),
                ("release", release),
                ("filename", filename),
            ],
        )?;
        self.send(self.request(Method::DELETE, url), SUCCESS).await?;
        Ok(())
    }

    async fn put_package(
        &self,
        repo: &str,
        package: &Package,
        distro: Option<DistroSelector>,
    ) -> Result<(), ApiError> {
        let url = self.repo_url(repo, &[("path", "packages.json")])?;
        warn_if_unsupported(package);

        let mut form = Form::new();
        if let Some(selector) = distro {
            let distro_id = self.distro_id(&selector).await?;
            form = form.text(FIELD_DISTRO_VERSION, distro_id.to_string());
        }

        form = form.part(
            FIELD_PACKAGE_FILE,
            file_part(package.filename(), package.contents())?,
        );
        for source in package.source_files() {
            form = form.part(
                FIELD_SOURCE_FILES,
                file_part(&source.filename, &source.contents)?,
            );
        }

        debug!(
            filename = package.filename(),
            source_files = package.source_files().len(),
            bytes = package.total_size(),
            "uploading package"
        );
        self.post_multipart(url, form).await?;
        Ok(())
    }

    async fn create_read_token(
        &self,
        repo: &str,
        master_token_id: &str,
        name: &str,
    ) -> Result<ReadToken, ApiError> {
        let url = self.read_tokens_url(repo, master_token_id)?;
        let builder = self
            .request(Method::POST, url)
            .form(&[("read_token[name]", name)]);
        let response = self.send(builder, SUCCESS).await?;
        Self::json(response).await
    }

    async fn list_read_tokens(
        &self,
        repo: &str,
        master_token_id: &str,
    ) -> Result<Vec<ReadToken>, ApiError> {
        let url = self.read_tokens_url(repo, master_token_id)?;
        let list: ReadTokenList = self.get_json(url).await?;
        Ok(list.read_tokens)
    }

    async fn delete_read_token(
        &self,
        repo: &str,
        master_token_id: &str,
        read_token_id: u64,
    ) -> Result<(), ApiError> {
        let read_token_id = read_token_id.to_string();
        let url = self.repo_url(
            repo,
            &[
                ("path", "master_tokens"),
                ("master token id", master_token_id),
                ("path", "read_tokens"),
                ("read token id", read_token_id.as_str()),
            ],
        )?;
        self.send(
            self.request(Method::DELETE, url),
            &[StatusCode::NO_CONTENT],
        )
        .await?;
        Ok(())
    }
}
