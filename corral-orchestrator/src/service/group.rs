//! Runner Group Resolution
//!
//! The platform offers no lookup by name, so a group's id is found by
//! walking the organization's whole group listing. Ids are never cached;
//! a group may be deleted and recreated between two requests.

use corral_client::OrganizationApi;
use corral_client::pagination::collect_pages;
use corral_core::domain::group::RunnerGroup;

use super::{OrchestratorError, Result};

const GROUP_ID_FAILED: &str = "Unable to retrieve group ID";

/// Resolve the id of the group named after `team`
pub async fn resolve_group_id<P: OrganizationApi>(
    platform: &P,
    org: &str,
    team: &str,
    per_page: u8,
) -> Result<u64> {
    tracing::debug!(team, "Listing organization runner groups");

    let groups = collect_pages(per_page, move |page| platform.list_runner_groups(org, page))
        .await
        .map_err(|e| {
            OrchestratorError::upstream(
                format!("{GROUP_ID_FAILED}: failed querying organization runner groups"),
                &e,
            )
        })?;

    find_group(&groups, team).map(|group| group.id).ok_or_else(|| {
        OrchestratorError::NotFound(format!(
            "{GROUP_ID_FAILED}: unable to locate runner group with name {team}"
        ))
    })
}

/// First group whose name matches exactly, in listing order
pub fn find_group<'a>(groups: &'a [RunnerGroup], name: &str) -> Option<&'a RunnerGroup> {
    groups.iter().find(|group| group.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corral_client::testing::{Call, InMemoryPlatform};
    use corral_core::domain::group::GroupVisibility;

    fn group(id: u64, name: &str) -> RunnerGroup {
        RunnerGroup {
            id,
            name: name.to_string(),
            visibility: GroupVisibility::Selected,
        }
    }

    #[test]
    fn test_first_match_wins() {
        let groups = vec![group(1, "Default"), group(2, "infra"), group(3, "infra")];
        assert_eq!(find_group(&groups, "infra").map(|g| g.id), Some(2));
    }

    #[test]
    fn test_match_is_exact() {
        let groups = vec![group(1, "Infra"), group(2, "infra-tools")];
        assert!(find_group(&groups, "infra").is_none());
    }

    #[tokio::test]
    async fn test_resolves_group_on_last_page() {
        let platform = InMemoryPlatform::new();
        for i in 0..6 {
            platform.add_runner_group(&format!("team-{i}"));
        }
        let wanted = platform.add_runner_group("platform");

        let id = resolve_group_id(&platform, "acme", "platform", 2).await.unwrap();

        assert_eq!(id, wanted);
        assert_eq!(platform.calls(Call::ListRunnerGroups), 4);
    }

    #[tokio::test]
    async fn test_not_found_only_after_every_page() {
        let platform = InMemoryPlatform::new();
        for i in 0..5 {
            platform.add_runner_group(&format!("team-{i}"));
        }

        let err = resolve_group_id(&platform, "acme", "platform", 2)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            OrchestratorError::NotFound(
                "Unable to retrieve group ID: unable to locate runner group with name platform"
                    .to_string()
            )
        );
        assert_eq!(platform.calls(Call::ListRunnerGroups), 3);
    }
}
