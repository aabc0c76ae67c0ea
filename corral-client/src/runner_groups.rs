//! Runner group endpoints

use corral_core::domain::group::{Runner, RunnerGroup};
use corral_core::domain::repository::RepositoryRef;
use corral_core::dto::group::{CreateRunnerGroup, SetGroupRepositories};
use reqwest::Method;
use serde::Deserialize;

use crate::GitHubClient;
use crate::error::Result;
use crate::pagination::{Page, PageRequest};

#[derive(Debug, Deserialize)]
struct RunnerGroupList {
    runner_groups: Vec<RunnerGroup>,
}

#[derive(Debug, Deserialize)]
struct RunnerList {
    runners: Vec<Runner>,
}

#[derive(Debug, Deserialize)]
struct RepositoryList {
    repositories: Vec<RepositoryRef>,
}

impl GitHubClient {
    // =============================================================================
    // Group Lifecycle
    // =============================================================================

    /// List one page of the organization's runner groups
    pub async fn list_runner_groups(
        &self,
        org: &str,
        page: PageRequest,
    ) -> Result<Page<RunnerGroup>> {
        let url = self.endpoint(&["orgs", org, "actions", "runner-groups"])?;
        let response = self
            .service_request(Method::GET, url)
            .await?
            .query(&page)
            .send()
            .await?;

        Self::handle_page(response, |list: RunnerGroupList| list.runner_groups).await
    }

    /// Create an organization runner group
    ///
    /// # Returns
    /// The created group
    pub async fn create_runner_group(
        &self,
        org: &str,
        request: &CreateRunnerGroup,
    ) -> Result<RunnerGroup> {
        let url = self.endpoint(&["orgs", org, "actions", "runner-groups"])?;
        let response = self
            .service_request(Method::POST, url)
            .await?
            .json(request)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Delete an organization runner group
    pub async fn delete_runner_group(&self, org: &str, group_id: u64) -> Result<()> {
        let group_id = group_id.to_string();
        let url = self.endpoint(&["orgs", org, "actions", "runner-groups", &group_id])?;
        let response = self.service_request(Method::DELETE, url).await?.send().await?;

        Self::handle_empty_response(response).await
    }

    // =============================================================================
    // Group Contents
    // =============================================================================

    /// List one page of the runners registered in a group
    pub async fn list_group_runners(
        &self,
        org: &str,
        group_id: u64,
        page: PageRequest,
    ) -> Result<Page<Runner>> {
        let group_id = group_id.to_string();
        let url = self.endpoint(&[
            "orgs",
            org,
            "actions",
            "runner-groups",
            &group_id,
            "runners",
        ])?;
        let response = self
            .service_request(Method::GET, url)
            .await?
            .query(&page)
            .send()
            .await?;

        Self::handle_page(response, |list: RunnerList| list.runners).await
    }

    /// List one page of the repositories with access to a group
    pub async fn list_group_repositories(
        &self,
        org: &str,
        group_id: u64,
        page: PageRequest,
    ) -> Result<Page<RepositoryRef>> {
        let group_id = group_id.to_string();
        let url = self.endpoint(&[
            "orgs",
            org,
            "actions",
            "runner-groups",
            &group_id,
            "repositories",
        ])?;
        let response = self
            .service_request(Method::GET, url)
            .await?
            .query(&page)
            .send()
            .await?;

        Self::handle_page(response, |list: RepositoryList| list.repositories).await
    }

    /// Grant a repository access to a group
    pub async fn add_group_repository(
        &self,
        org: &str,
        group_id: u64,
        repository_id: u64,
    ) -> Result<()> {
        let url = self.group_repository_endpoint(org, group_id, repository_id)?;
        let response = self.service_request(Method::PUT, url).await?.send().await?;

        Self::handle_empty_response(response).await
    }

    /// Revoke a repository's access to a group
    pub async fn remove_group_repository(
        &self,
        org: &str,
        group_id: u64,
        repository_id: u64,
    ) -> Result<()> {
        let url = self.group_repository_endpoint(org, group_id, repository_id)?;
        let response = self.service_request(Method::DELETE, url).await?.send().await?;

        Self::handle_empty_response(response).await
    }

    /// Replace the full set of repositories with access to a group
    pub async fn set_group_repositories(
        &self,
        org: &str,
        group_id: u64,
        repository_ids: &[u64],
    ) -> Result<()> {
        let group_id = group_id.to_string();
        let url = self.endpoint(&[
            "orgs",
            org,
            "actions",
            "runner-groups",
            &group_id,
            "repositories",
        ])?;
        let response = self
            .service_request(Method::PUT, url)
            .await?
            .json(&SetGroupRepositories {
                selected_repository_ids: repository_ids.to_vec(),
            })
            .send()
            .await?;

        Self::handle_empty_response(response).await
    }

    fn group_repository_endpoint(
        &self,
        org: &str,
        group_id: u64,
        repository_id: u64,
    ) -> Result<reqwest::Url> {
        let group_id = group_id.to_string();
        let repository_id = repository_id.to_string();
        self.endpoint(&[
            "orgs",
            org,
            "actions",
            "runner-groups",
            &group_id,
            "repositories",
            &repository_id,
        ])
    }
}
