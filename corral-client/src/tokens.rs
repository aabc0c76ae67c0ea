//! Runner token endpoints

use corral_core::domain::token::RunnerToken;
use reqwest::Method;

use crate::GitHubClient;
use crate::error::Result;

impl GitHubClient {
    /// Create a token for registering a self-hosted runner in the organization
    pub async fn create_registration_token(&self, org: &str) -> Result<RunnerToken> {
        self.create_runner_token(org, "registration-token").await
    }

    /// Create a token for removing a self-hosted runner from the organization
    pub async fn create_removal_token(&self, org: &str) -> Result<RunnerToken> {
        self.create_runner_token(org, "remove-token").await
    }

    async fn create_runner_token(&self, org: &str, kind: &str) -> Result<RunnerToken> {
        let url = self.endpoint(&["orgs", org, "actions", "runners", kind])?;
        let response = self.service_request(Method::POST, url).await?.send().await?;

        Self::handle_response(response).await
    }
}
