//! Runner group domain model
//!
//! A runner group is the platform's named pool of execution workers. Corral
//! maps exactly one group to each team, named after the team slug.

use serde::{Deserialize, Serialize};

/// An organization runner group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerGroup {
    /// Platform-assigned identifier, re-resolved on every request
    pub id: u64,

    /// Group name (the owning team's slug)
    pub name: String,

    /// Which repositories may use the group
    pub visibility: GroupVisibility,
}

/// Repository visibility of a runner group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupVisibility {
    /// Every repository in the organization
    All,

    /// Only repositories explicitly granted access
    Selected,

    /// Private repositories only
    Private,
}

/// A self-hosted runner registered in a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runner {
    /// Platform-assigned identifier
    pub id: u64,

    /// Runner name as registered
    pub name: String,

    /// Connection status reported by the platform (e.g. "online")
    #[serde(default)]
    pub status: String,
}
