//! Repository lookup endpoints

use corral_core::domain::repository::RepositoryRef;
use reqwest::Method;

use crate::GitHubClient;
use crate::error::Result;
use crate::pagination::{Page, PageRequest};

impl GitHubClient {
    /// List one page of the repositories a team has access to
    ///
    /// # Arguments
    /// * `org` - Organization login
    /// * `team` - Team slug
    /// * `page` - Page to fetch
    pub async fn list_team_repositories(
        &self,
        org: &str,
        team: &str,
        page: PageRequest,
    ) -> Result<Page<RepositoryRef>> {
        let url = self.endpoint(&["orgs", org, "teams", team, "repos"])?;
        let response = self
            .service_request(Method::GET, url)
            .await?
            .query(&page)
            .send()
            .await?;

        Self::handle_page(response, |repos: Vec<RepositoryRef>| repos).await
    }

    /// Get a repository by slug
    pub async fn get_repository(&self, org: &str, name: &str) -> Result<RepositoryRef> {
        let url = self.endpoint(&["repos", org, name])?;
        let response = self.service_request(Method::GET, url).await?.send().await?;

        Self::handle_response(response).await
    }
}
