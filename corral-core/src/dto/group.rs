//! Runner group DTOs

use serde::{Deserialize, Serialize};

use crate::domain::group::GroupVisibility;

/// Payload of the group listing operation
///
/// Both collections are always present; an empty group serializes as
/// `{"repos":[],"runners":[]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupListing {
    /// Slugs of repositories with access to the group
    pub repos: Vec<String>,

    /// Names of runners registered in the group
    pub runners: Vec<String>,
}

/// Request body for creating an organization runner group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRunnerGroup {
    pub name: String,
    pub visibility: GroupVisibility,
    pub allows_public_repositories: bool,
}

impl CreateRunnerGroup {
    /// A group restricted to selected, non-public repositories
    pub fn selected(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: GroupVisibility::Selected,
            allows_public_repositories: false,
        }
    }
}

/// Request body replacing a group's repository set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetGroupRepositories {
    pub selected_repository_ids: Vec<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_listing_serializes_empty_arrays() {
        let value = serde_json::to_value(GroupListing::default()).unwrap();
        assert_eq!(value, serde_json::json!({ "repos": [], "runners": [] }));
    }

    #[test]
    fn test_create_request_is_selected_and_private() {
        let value = serde_json::to_value(CreateRunnerGroup::selected("platform")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "platform",
                "visibility": "selected",
                "allows_public_repositories": false
            })
        );
    }
}
