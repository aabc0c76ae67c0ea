//! Authorization Gate
//!
//! Turns a caller-supplied credential into a verified team maintainer.
//! Both lookups run with the caller's own credential, so the service never
//! vouches for anything the caller could not see themselves.

use corral_client::{CallerApi, ClientError, Credential};
use corral_core::domain::identity::{Identity, TeamRole};

use super::{OrchestratorError, Result};

const MAINTAINER_CHECK_FAILED: &str = "Unable to validate user is a team maintainer";
const NOT_A_MAINTAINER: &str = "User is not a maintainer of the team";

/// Parse the `Authorization` header, failing when it is absent or empty
pub fn credential_from_header(header: Option<&str>) -> Result<Credential> {
    header
        .and_then(Credential::from_authorization_header)
        .ok_or_else(|| OrchestratorError::Forbidden("Missing Authorization header".to_string()))
}

/// Exchange a credential for the identity that owns it
pub async fn verify_credential<P: CallerApi>(
    platform: &P,
    credential: &Credential,
) -> Result<Identity> {
    platform
        .authenticated_user(credential)
        .await
        .map_err(|e| {
            OrchestratorError::Forbidden(format!(
                "{MAINTAINER_CHECK_FAILED}: failed retrieving user: {e}"
            ))
        })
}

/// Look up the caller's role on `team`
///
/// The membership lookup answers 404 for non-members and unknown teams
/// alike. A 404 on a team the caller can see is a non-member, which gets the
/// same rejection as a plain member once [`require_maintainer`] runs.
pub async fn team_role<P: CallerApi>(
    platform: &P,
    credential: &Credential,
    org: &str,
    team: &str,
    identity: &Identity,
) -> Result<TeamRole> {
    let lookup_failed = |e: ClientError| {
        OrchestratorError::Forbidden(format!("{MAINTAINER_CHECK_FAILED}: {e}"))
    };

    match platform
        .team_membership(credential, org, team, &identity.login)
        .await
    {
        Ok(role) => Ok(role),
        Err(e) if e.is_not_found() => {
            if platform
                .team_exists(credential, org, team)
                .await
                .map_err(lookup_failed)?
            {
                Ok(TeamRole::None)
            } else {
                Err(OrchestratorError::Forbidden(format!(
                    "{MAINTAINER_CHECK_FAILED}: unable to locate team {team}"
                )))
            }
        }
        Err(e) => Err(lookup_failed(e)),
    }
}

/// Only maintainers pass; members and non-members get the same answer
pub fn require_maintainer(role: TeamRole) -> Result<()> {
    if role.is_maintainer() {
        Ok(())
    } else {
        Err(OrchestratorError::Unauthorized(NOT_A_MAINTAINER.to_string()))
    }
}
