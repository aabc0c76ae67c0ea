//! Platform capabilities
//!
//! The orchestrator never talks HTTP directly; it is handed something that
//! implements these traits. [`GitHubClient`](crate::GitHubClient) is the
//! production implementation and
//! [`InMemoryPlatform`](crate::testing::InMemoryPlatform) the test double.
//!
//! Capabilities are split by whose credential they run under:
//! - [`CallerApi`] runs with the caller's own bearer credential
//! - [`OrganizationApi`] runs with the service's organization credential

use async_trait::async_trait;
use corral_core::domain::group::{Runner, RunnerGroup};
use corral_core::domain::identity::{Identity, TeamRole};
use corral_core::domain::repository::RepositoryRef;
use corral_core::domain::token::RunnerToken;
use corral_core::dto::group::CreateRunnerGroup;

use crate::error::Result;
use crate::pagination::{Page, PageRequest};

/// A caller-supplied bearer credential
///
/// The token is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Parse an `Authorization` header value
    ///
    /// Accepts a bare token or one prefixed with `Bearer ` or `token `
    /// (case-insensitive). Returns `None` when no token remains.
    pub fn from_authorization_header(value: &str) -> Option<Self> {
        let value = value.trim_start();
        let token = ["bearer ", "token "]
            .iter()
            .find_map(|prefix| {
                value
                    .get(..prefix.len())
                    .filter(|head| head.eq_ignore_ascii_case(prefix))
                    .map(|_| &value[prefix.len()..])
            })
            .unwrap_or(value)
            .trim();

        if token.is_empty() {
            None
        } else {
            Some(Self(token.to_string()))
        }
    }

    /// The raw token, for placing on an outbound request
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Calls made on behalf of the caller, with the caller's credential
#[async_trait]
pub trait CallerApi: Send + Sync {
    /// Resolve the login that owns `credential`
    async fn authenticated_user(&self, credential: &Credential) -> Result<Identity>;

    /// Role of `login` on `team`
    ///
    /// Fails with a 404 both when the team cannot be found and when `login`
    /// is not on it; [`CallerApi::team_exists`] tells the two apart.
    async fn team_membership(
        &self,
        credential: &Credential,
        org: &str,
        team: &str,
        login: &str,
    ) -> Result<TeamRole>;

    /// Whether `team` is visible to the caller
    async fn team_exists(&self, credential: &Credential, org: &str, team: &str) -> Result<bool>;
}

/// Calls made with the service's organization credential
#[async_trait]
pub trait OrganizationApi: Send + Sync {
    async fn list_runner_groups(&self, org: &str, page: PageRequest) -> Result<Page<RunnerGroup>>;

    /// Fails with a 409 when a group with the same name exists
    async fn create_runner_group(
        &self,
        org: &str,
        request: &CreateRunnerGroup,
    ) -> Result<RunnerGroup>;

    async fn delete_runner_group(&self, org: &str, group_id: u64) -> Result<()>;

    async fn list_group_runners(
        &self,
        org: &str,
        group_id: u64,
        page: PageRequest,
    ) -> Result<Page<Runner>>;

    async fn list_group_repositories(
        &self,
        org: &str,
        group_id: u64,
        page: PageRequest,
    ) -> Result<Page<RepositoryRef>>;

    /// Grant one repository access to a group; granting twice is a no-op
    async fn add_group_repository(&self, org: &str, group_id: u64, repository_id: u64)
    -> Result<()>;

    async fn remove_group_repository(
        &self,
        org: &str,
        group_id: u64,
        repository_id: u64,
    ) -> Result<()>;

    /// Replace a group's whole repository set in one call
    async fn set_group_repositories(
        &self,
        org: &str,
        group_id: u64,
        repository_ids: &[u64],
    ) -> Result<()>;

    /// Repositories the team has been granted access to
    async fn list_team_repositories(
        &self,
        org: &str,
        team: &str,
        page: PageRequest,
    ) -> Result<Page<RepositoryRef>>;

    /// Look up a single repository by slug
    async fn get_repository(&self, org: &str, name: &str) -> Result<RepositoryRef>;

    async fn create_registration_token(&self, org: &str) -> Result<RunnerToken>;

    async fn create_removal_token(&self, org: &str) -> Result<RunnerToken>;
}

/// Everything the orchestrator needs from the platform
pub trait Platform: CallerApi + OrganizationApi {}

impl<T: CallerApi + OrganizationApi> Platform for T {}
