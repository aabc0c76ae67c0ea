//! Caller-scoped endpoints
//!
//! These run with the caller's own credential, so a successful call proves
//! the credential is live and tells us who it belongs to.

use corral_core::domain::identity::{Identity, TeamRole};
use reqwest::Method;
use serde::Deserialize;

use crate::GitHubClient;
use crate::error::Result;
use crate::platform::Credential;

/// Membership record as returned by the teams API
#[derive(Debug, Deserialize)]
struct Membership {
    role: TeamRole,
    #[serde(default)]
    state: MembershipState,
}

#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum MembershipState {
    #[default]
    Active,
    Pending,
}

impl GitHubClient {
    /// Resolve the login that owns `credential`
    ///
    /// # Returns
    /// The caller's identity
    pub async fn get_authenticated_user(&self, credential: &Credential) -> Result<Identity> {
        let url = self.endpoint(&["user"])?;
        let response = self
            .caller_request(Method::GET, url, credential)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Get the role of `login` on a team
    ///
    /// An invitation that has not been accepted yet grants nothing, so a
    /// pending membership reports [`TeamRole::None`]. GitHub answers 404 for
    /// non-members and unknown teams alike; that error is passed through.
    ///
    /// # Arguments
    /// * `credential` - The caller's credential
    /// * `org` - Organization login
    /// * `team` - Team slug
    /// * `login` - User whose membership is checked
    pub async fn get_team_membership(
        &self,
        credential: &Credential,
        org: &str,
        team: &str,
        login: &str,
    ) -> Result<TeamRole> {
        let url = self.endpoint(&["orgs", org, "teams", team, "memberships", login])?;
        let response = self
            .caller_request(Method::GET, url, credential)
            .send()
            .await?;

        let membership: Membership = Self::handle_response(response).await?;
        if membership.state == MembershipState::Pending {
            return Ok(TeamRole::None);
        }

        Ok(membership.role)
    }

    /// Check whether a team is visible to the caller
    ///
    /// A 404 means the team does not exist or the caller cannot see it.
    pub async fn check_team_exists(
        &self,
        credential: &Credential,
        org: &str,
        team: &str,
    ) -> Result<bool> {
        let url = self.endpoint(&["orgs", org, "teams", team])?;
        let response = self
            .caller_request(Method::GET, url, credential)
            .send()
            .await?;

        match Self::handle_empty_response(response).await {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
