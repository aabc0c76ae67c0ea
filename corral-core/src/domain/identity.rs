//! Identity and team membership

use serde::{Deserialize, Serialize};

/// A caller identity resolved from a bearer credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Platform login of the credential owner
    pub login: String,
}

/// Role held by an identity on a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    /// Regular team member
    Member,

    /// Team maintainer, the only role allowed to manage the team's group
    Maintainer,

    /// No membership on the team
    #[serde(other)]
    None,
}

impl TeamRole {
    /// Whether this role authorizes runner-group operations
    pub fn is_maintainer(self) -> bool {
        matches!(self, TeamRole::Maintainer)
    }
}

impl std::fmt::Display for TeamRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamRole::Member => write!(f, "member"),
            TeamRole::Maintainer => write!(f, "maintainer"),
            TeamRole::None => write!(f, "none"),
        }
    }
}
