//! Runner Group Orchestrator
//!
//! Request-level façade. Every operation runs the same linear pipeline and
//! stops at the first failure:
//!
//! 1. required parameters present
//! 2. `Authorization` header present
//! 3. credential verified
//! 4. caller admitted by the rate limiter
//! 5. caller is a maintainer of the team
//! 6. group resolved (where the operation needs it), then the operation
//!
//! Nothing is stored between requests. Multi-repository additions and
//! removals are applied one at a time and are not rolled back when a later
//! one fails.

use std::sync::Arc;

use corral_client::Platform;
use corral_client::pagination::collect_pages;
use corral_core::domain::token::RunnerToken;
use corral_core::dto::group::{CreateRunnerGroup, GroupListing};

use super::auth::{credential_from_header, require_maintainer, team_role, verify_credential};
use super::group::resolve_group_id;
use super::rate_limit::RateLimiter;
use super::repository::{parse_repository_list, resolve_repositories, resolve_team_repositories};
use super::{OrchestratorError, Result};

pub struct RunnerGroupOrchestrator<P> {
    platform: Arc<P>,
    org: String,
    page_size: u8,
    limiter: RateLimiter,
}

impl<P: Platform> RunnerGroupOrchestrator<P> {
    pub fn new(
        platform: Arc<P>,
        org: impl Into<String>,
        page_size: u8,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            platform,
            org: org.into(),
            page_size,
            limiter,
        }
    }

    // =============================================================================
    // Runner groups
    // =============================================================================

    /// Create the team's runner group, restricted to selected repositories
    pub async fn create_group(
        &self,
        authorization: Option<&str>,
        team: Option<&str>,
    ) -> Result<String> {
        let team = required_team(team)?;
        self.authorize(authorization, team).await?;

        tracing::info!(team, "Creating runner group");
        let group = self
            .platform
            .create_runner_group(&self.org, &CreateRunnerGroup::selected(team))
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    OrchestratorError::Conflict(format!("Runner group already exists: {team}"))
                } else {
                    OrchestratorError::upstream("Unable to create runner group", &e)
                }
            })?;
        tracing::debug!(team, group_id = group.id, "Created runner group");

        Ok(format!("Runner group created successfully: {}", group.name))
    }

    pub async fn delete_group(
        &self,
        authorization: Option<&str>,
        team: Option<&str>,
    ) -> Result<String> {
        let team = required_team(team)?;
        self.authorize(authorization, team).await?;
        let group_id = self.resolve_group(team).await?;

        tracing::info!(team, group_id, "Deleting runner group");
        self.platform
            .delete_runner_group(&self.org, group_id)
            .await
            .map_err(|e| OrchestratorError::upstream("Unable to delete runner group", &e))?;
        tracing::debug!(team, group_id, "Deleted runner group");

        Ok(format!("Runner group deleted successfully: {team}"))
    }

    /// Names of the group's runners and of the repositories it serves
    pub async fn list_group(
        &self,
        authorization: Option<&str>,
        team: Option<&str>,
    ) -> Result<GroupListing> {
        let team = required_team(team)?;
        self.authorize(authorization, team).await?;
        let group_id = self.resolve_group(team).await?;

        let platform = self.platform.as_ref();
        let org = self.org.as_str();

        tracing::info!(team, group_id, "Retrieving runner group runner list");
        let runners = collect_pages(self.page_size, move |page| {
            platform.list_group_runners(org, group_id, page)
        })
        .await
        .map_err(|e| OrchestratorError::upstream("Unable to list runners", &e))?;
        tracing::debug!(team, count = runners.len(), "Retrieved runner group runner list");

        tracing::info!(team, group_id, "Retrieving runner group repository list");
        let repositories = collect_pages(self.page_size, move |page| {
            platform.list_group_repositories(org, group_id, page)
        })
        .await
        .map_err(|e| OrchestratorError::upstream("Unable to list repositories", &e))?;
        tracing::debug!(team, count = repositories.len(), "Retrieved runner group repository list");

        Ok(GroupListing {
            repos: repositories.into_iter().map(|repo| repo.slug).collect(),
            runners: runners.into_iter().map(|runner| runner.name).collect(),
        })
    }

    // =============================================================================
    // Repository access
    // =============================================================================

    /// Grant the group access to repositories the team already has
    pub async fn add_repositories(
        &self,
        authorization: Option<&str>,
        team: Option<&str>,
        repos: Option<&str>,
    ) -> Result<String> {
        let team = required_team(team)?;
        let slugs = required_repos(repos)?;
        self.authorize(authorization, team).await?;
        let group_id = self.resolve_group(team).await?;

        tracing::info!(team, "Resolving team repositories");
        let repositories = resolve_team_repositories(
            self.platform.as_ref(),
            &self.org,
            team,
            &slugs,
            self.page_size,
        )
        .await?;
        tracing::debug!(team, count = repositories.len(), "Resolved team repositories");

        for repository in &repositories {
            tracing::info!(team, repo = %repository.slug, "Adding repository to runner group");
            self.platform
                .add_group_repository(&self.org, group_id, repository.id)
                .await
                .map_err(|e| {
                    OrchestratorError::upstream(
                        format!("Unable to add repo {} to runner group {team}", repository.slug),
                        &e,
                    )
                })?;
        }
        tracing::debug!(team, "Added repositories to runner group");

        Ok("Successfully added repositories to runner group".to_string())
    }

    pub async fn remove_repositories(
        &self,
        authorization: Option<&str>,
        team: Option<&str>,
        repos: Option<&str>,
    ) -> Result<String> {
        let team = required_team(team)?;
        let slugs = required_repos(repos)?;
        self.authorize(authorization, team).await?;

        tracing::info!(team, "Resolving repositories");
        let repositories = resolve_repositories(self.platform.as_ref(), &self.org, &slugs).await?;
        let group_id = self.resolve_group(team).await?;

        for repository in &repositories {
            tracing::info!(team, repo = %repository.slug, "Removing repository from runner group");
            self.platform
                .remove_group_repository(&self.org, group_id, repository.id)
                .await
                .map_err(|e| {
                    OrchestratorError::upstream(
                        format!(
                            "Unable to remove repo {} from runner group {team}",
                            repository.slug
                        ),
                        &e,
                    )
                })?;
        }
        tracing::debug!(team, "Removed repositories from runner group");

        Ok("Successfully removed repositories from runner group".to_string())
    }

    /// Replace the group's repository set in a single platform call
    pub async fn set_repositories(
        &self,
        authorization: Option<&str>,
        team: Option<&str>,
        repos: Option<&str>,
    ) -> Result<String> {
        let team = required_team(team)?;
        let slugs = required_repos(repos)?;
        self.authorize(authorization, team).await?;

        tracing::info!(team, "Resolving repositories");
        let repositories = resolve_repositories(self.platform.as_ref(), &self.org, &slugs).await?;
        let group_id = self.resolve_group(team).await?;

        let ids: Vec<u64> = repositories.iter().map(|repo| repo.id).collect();
        tracing::info!(team, group_id, count = ids.len(), "Setting runner group repositories");
        self.platform
            .set_group_repositories(&self.org, group_id, &ids)
            .await
            .map_err(|e| {
                OrchestratorError::upstream(
                    format!("Unable to set repositories for runner group {team}"),
                    &e,
                )
            })?;
        tracing::debug!(team, "Set runner group repositories");

        Ok("Successfully set repositories for runner group".to_string())
    }

    // =============================================================================
    // Runner tokens
    // =============================================================================

    pub async fn registration_token(
        &self,
        authorization: Option<&str>,
        team: Option<&str>,
    ) -> Result<RunnerToken> {
        let team = required_team(team)?;
        self.authorize(authorization, team).await?;

        tracing::info!(team, "Creating organization runner registration token");
        let token = self
            .platform
            .create_registration_token(&self.org)
            .await
            .map_err(|e| OrchestratorError::upstream("Unable to create registration token", &e))?;
        tracing::debug!(team, "Created organization runner registration token");

        Ok(token)
    }

    pub async fn removal_token(
        &self,
        authorization: Option<&str>,
        team: Option<&str>,
    ) -> Result<RunnerToken> {
        let team = required_team(team)?;
        self.authorize(authorization, team).await?;

        tracing::info!(team, "Creating organization runner removal token");
        let token = self
            .platform
            .create_removal_token(&self.org)
            .await
            .map_err(|e| {
                OrchestratorError::upstream("Unable to create organization removal token", &e)
            })?;
        tracing::debug!(team, "Created organization runner removal token");

        Ok(token)
    }

    /// Readiness check; only checks that a credential was presented
    pub fn status(&self, authorization: Option<&str>) -> Result<&'static str> {
        credential_from_header(authorization)?;
        Ok("Server ready")
    }

    // =============================================================================
    // Pipeline steps
    // =============================================================================

    async fn authorize(&self, authorization: Option<&str>, team: &str) -> Result<()> {
        let credential = credential_from_header(authorization)?;

        tracing::info!(team, "Verifying maintainership");
        let identity = verify_credential(self.platform.as_ref(), &credential).await?;
        self.limiter.admit(&identity.login)?;

        let role = team_role(self.platform.as_ref(), &credential, &self.org, team, &identity).await?;
        require_maintainer(role)?;
        tracing::debug!(team, login = %identity.login, "Verified maintainership");

        Ok(())
    }

    async fn resolve_group(&self, team: &str) -> Result<u64> {
        tracing::info!(team, "Retrieving runner group ID");
        let group_id =
            resolve_group_id(self.platform.as_ref(), &self.org, team, self.page_size).await?;
        tracing::debug!(team, group_id, "Retrieved runner group ID");
        Ok(group_id)
    }
}

fn required_team(team: Option<&str>) -> Result<&str> {
    team.map(str::trim)
        .filter(|team| !team.is_empty())
        .ok_or_else(|| OrchestratorError::BadRequest("Missing required parameter: team".to_string()))
}

fn required_repos(repos: Option<&str>) -> Result<Vec<String>> {
    let raw = repos.ok_or_else(|| {
        OrchestratorError::BadRequest("Missing required parameter: repos".to_string())
    })?;
    parse_repository_list(raw)
}
