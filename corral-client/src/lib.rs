//! Corral Platform Client
//!
//! A small, type-safe client for the parts of the GitHub REST API that the
//! Corral control plane drives: caller identity, team membership, runner
//! groups, repositories and runner tokens.
//!
//! Organization calls authenticate with a [`ServiceAuth`]: either a static
//! token or a GitHub App installation whose tokens are minted on demand.
//!
//! The orchestrator depends on the capability traits in [`platform`] rather
//! than on [`GitHubClient`] directly, so tests can swap in
//! [`testing::InMemoryPlatform`] (feature `test-support`).
//!
//! # Example
//!
//! ```no_run
//! use corral_client::GitHubClient;
//! use corral_client::pagination::PageRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GitHubClient::new("https://api.github.com", "ghs_service_token")?;
//!
//!     let page = client.list_runner_groups("acme", PageRequest::first(100)).await?;
//!     for group in page.items {
//!         println!("{} -> {}", group.name, group.id);
//!     }
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod error;
pub mod pagination;
pub mod platform;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

mod caller;
mod repositories;
mod runner_groups;
mod tokens;

// Re-export commonly used types
pub use app::{AppCredentials, ServiceAuth};
pub use error::{ClientError, Result};
pub use platform::{CallerApi, Credential, OrganizationApi, Platform};

use std::time::Duration;

use async_trait::async_trait;
use corral_core::domain::group::{Runner, RunnerGroup};
use corral_core::domain::identity::{Identity, TeamRole};
use corral_core::domain::repository::RepositoryRef;
use corral_core::domain::token::RunnerToken;
use corral_core::dto::group::CreateRunnerGroup;
use app::ServiceCredential;
use pagination::{Page, PageRequest, next_page_from_link};
use reqwest::header::{ACCEPT, LINK, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT_VALUE: &str = concat!("corral/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the GitHub REST API
///
/// Holds the service's organization credential; caller-scoped calls take the
/// caller's [`Credential`] per request instead. The client is immutable once
/// built and cheap to clone.
#[derive(Clone)]
pub struct GitHubClient {
    /// API root (e.g., "https://api.github.com" or "https://ghe.example.com/api/v3")
    base_url: Url,
    /// Service credential used for organization calls
    service: ServiceCredential,
    /// HTTP client instance
    client: Client,
}

impl GitHubClient {
    /// Create a new client with a default HTTP client
    ///
    /// # Errors
    /// Returns `ClientError::InvalidRequest` when `base_url` is not a valid
    /// base URL, `Credential` when the service credential is unusable, or
    /// `RequestFailed` when the HTTP client cannot be built.
    pub fn new(base_url: &str, service: impl Into<ServiceAuth>) -> Result<Self> {
        Self::with_timeout(base_url, service, Duration::from_secs(30))
    }

    /// Create a new client whose requests give up after `timeout`
    pub fn with_timeout(
        base_url: &str,
        service: impl Into<ServiceAuth>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, service, client)
    }

    /// Create a new client around a configured reqwest Client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        base_url: &str,
        service: impl Into<ServiceAuth>,
        client: Client,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidRequest(format!("Invalid API URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidRequest(format!(
                "API URL cannot be a base: {base_url}"
            )));
        }

        Ok(Self {
            base_url,
            service: ServiceCredential::resolve(service.into())?,
            client,
        })
    }

    /// Get the API root this client talks to
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    // =============================================================================
    // Request Builders
    // =============================================================================

    /// Build an endpoint URL from path segments
    ///
    /// Segments are percent-encoded, so caller-supplied slugs cannot escape
    /// their position in the path.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidRequest(format!("API URL cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: &str) -> RequestBuilder {
        tracing::debug!(%method, path = url.path(), "GitHub API request");
        self.client
            .request(method, url)
            .bearer_auth(token)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header(API_VERSION_HEADER, API_VERSION)
            .header(USER_AGENT, USER_AGENT_VALUE)
    }

    /// Request authenticated with the service credential
    async fn service_request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let token = self.service_token().await?;
        Ok(self.request(method, url, &token))
    }

    /// Request authenticated with the caller's credential
    fn caller_request(&self, method: Method, url: Url, credential: &Credential) -> RequestBuilder {
        self.request(method, url, credential.expose())
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Turn a non-success response into `ClientError::ApiError`
    ///
    /// GitHub error bodies are JSON with a `message` field; that message is
    /// preferred over the raw body when present.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = extract_github_message(&body).unwrap_or(body);
        tracing::debug!(status = status.as_u16(), %message, "GitHub API error response");
        Err(ClientError::api_error(status.as_u16(), message))
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle one page of a listing
    ///
    /// The continuation is read from the `Link` header before the body is
    /// consumed; `items` pulls the entries out of the page's JSON shape.
    async fn handle_page<W, T>(
        response: reqwest::Response,
        items: impl FnOnce(W) -> Vec<T>,
    ) -> Result<Page<T>>
    where
        W: DeserializeOwned,
    {
        let response = Self::check_status(response).await?;
        let next_page = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_page_from_link);

        let body: W = response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))?;

        Ok(Page {
            items: items(body),
            next_page,
        })
    }

    /// Handle an API response that returns no content (e.g., DELETE operations)
    async fn handle_empty_response(response: reqwest::Response) -> Result<()> {
        Self::check_status(response).await.map(|_| ())
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url.as_str())
            .field("service", &"***")
            .finish()
    }
}

fn extract_github_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}

// =============================================================================
// Capability Implementations
// =============================================================================

#[async_trait]
impl CallerApi for GitHubClient {
    async fn authenticated_user(&self, credential: &Credential) -> Result<Identity> {
        self.get_authenticated_user(credential).await
    }

    async fn team_membership(
        &self,
        credential: &Credential,
        org: &str,
        team: &str,
        login: &str,
    ) -> Result<TeamRole> {
        self.get_team_membership(credential, org, team, login).await
    }

    async fn team_exists(&self, credential: &Credential, org: &str, team: &str) -> Result<bool> {
        self.check_team_exists(credential, org, team).await
    }
}

#[async_trait]
impl OrganizationApi for GitHubClient {
    async fn list_runner_groups(&self, org: &str, page: PageRequest) -> Result<Page<RunnerGroup>> {
        GitHubClient::list_runner_groups(self, org, page).await
    }

    async fn create_runner_group(
        &self,
        org: &str,
        request: &CreateRunnerGroup,
    ) -> Result<RunnerGroup> {
        GitHubClient::create_runner_group(self, org, request).await
    }

    async fn delete_runner_group(&self, org: &str, group_id: u64) -> Result<()> {
        GitHubClient::delete_runner_group(self, org, group_id).await
    }

    async fn list_group_runners(
        &self,
        org: &str,
        group_id: u64,
        page: PageRequest,
    ) -> Result<Page<Runner>> {
        GitHubClient::list_group_runners(self, org, group_id, page).await
    }

    async fn list_group_repositories(
        &self,
        org: &str,
        group_id: u64,
        page: PageRequest,
    ) -> Result<Page<RepositoryRef>> {
        GitHubClient::list_group_repositories(self, org, group_id, page).await
    }

    async fn add_group_repository(
        &self,
        org: &str,
        group_id: u64,
        repository_id: u64,
    ) -> Result<()> {
        GitHubClient::add_group_repository(self, org, group_id, repository_id).await
    }

    async fn remove_group_repository(
        &self,
        org: &str,
        group_id: u64,
        repository_id: u64,
    ) -> Result<()> {
        GitHubClient::remove_group_repository(self, org, group_id, repository_id).await
    }

    async fn set_group_repositories(
        &self,
        org: &str,
        group_id: u64,
        repository_ids: &[u64],
    ) -> Result<()> {
        GitHubClient::set_group_repositories(self, org, group_id, repository_ids).await
    }

    async fn list_team_repositories(
        &self,
        org: &str,
        team: &str,
        page: PageRequest,
    ) -> Result<Page<RepositoryRef>> {
        GitHubClient::list_team_repositories(self, org, team, page).await
    }

    async fn get_repository(&self, org: &str, name: &str) -> Result<RepositoryRef> {
        GitHubClient::get_repository(self, org, name).await
    }

    async fn create_registration_token(&self, org: &str) -> Result<RunnerToken> {
        GitHubClient::create_registration_token(self, org).await
    }

    async fn create_removal_token(&self, org: &str) -> Result<RunnerToken> {
        GitHubClient::create_removal_token(self, org).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GitHubClient::new("https://api.github.com", "token").unwrap();
        assert_eq!(client.base_url(), "https://api.github.com/");
    }

    #[test]
    fn test_endpoint_ignores_trailing_slash() {
        let with_slash = GitHubClient::new("http://localhost:8080/", "token").unwrap();
        let without = GitHubClient::new("http://localhost:8080", "token").unwrap();

        assert_eq!(
            with_slash.endpoint(&["user"]).unwrap().as_str(),
            "http://localhost:8080/user"
        );
        assert_eq!(
            without.endpoint(&["user"]).unwrap().as_str(),
            "http://localhost:8080/user"
        );
    }

    #[test]
    fn test_endpoint_keeps_enterprise_prefix() {
        let client = GitHubClient::new("https://ghe.example.com/api/v3", "token").unwrap();
        let url = client
            .endpoint(&["orgs", "acme", "actions", "runner-groups"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/orgs/acme/actions/runner-groups"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = GitHubClient::new("https://api.github.com", "token").unwrap();
        let url = client.endpoint(&["repos", "acme", "../admin?x=1"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/acme/..%2Fadmin%3Fx=1"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = GitHubClient::new("not a url", "token").unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[test]
    fn test_debug_redacts_service_token() {
        let client = GitHubClient::new("https://api.github.com", "ghs_secret").unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("ghs_secret"));
    }

    #[test]
    fn test_extract_github_message() {
        assert_eq!(
            extract_github_message(r#"{"message":"Bad credentials","documentation_url":"x"}"#),
            Some("Bad credentials".to_string())
        );
        assert_eq!(extract_github_message("<html>oops</html>"), None);
    }
}
