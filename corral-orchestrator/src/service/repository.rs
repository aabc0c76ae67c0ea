//! Repository Identifier Mapping
//!
//! Callers name repositories by slug; the platform mutates group access by
//! numeric id. Additions resolve against the team's own repository listing
//! so a maintainer can only grant repositories their team already has.
//! Removals and replacement resolve each slug directly.

use corral_client::OrganizationApi;
use corral_client::pagination::collect_pages;
use corral_core::domain::repository::RepositoryRef;

use super::{OrchestratorError, Result};

/// Split a comma-separated slug list
///
/// Entries are trimmed, blanks dropped and duplicates collapsed to their
/// first occurrence.
pub fn parse_repository_list(raw: &str) -> Result<Vec<String>> {
    let mut slugs: Vec<String> = Vec::new();
    for slug in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !slugs.iter().any(|seen| seen == slug) {
            slugs.push(slug.to_string());
        }
    }

    if slugs.is_empty() {
        return Err(OrchestratorError::BadRequest(
            "Missing required parameter: repos".to_string(),
        ));
    }
    Ok(slugs)
}

/// Resolve slugs against the repositories `team` has been granted
///
/// Fails on the first slug the team cannot see; nothing is resolved
/// partially.
pub async fn resolve_team_repositories<P: OrganizationApi>(
    platform: &P,
    org: &str,
    team: &str,
    slugs: &[String],
    per_page: u8,
) -> Result<Vec<RepositoryRef>> {
    let team_repositories = collect_pages(per_page, move |page| {
        platform.list_team_repositories(org, team, page)
    })
    .await
    .map_err(|e| OrchestratorError::upstream("Unable to retrieve team repos", &e))?;

    slugs
        .iter()
        .map(|slug| {
            team_repositories
                .iter()
                .find(|repository| &repository.slug == slug)
                .cloned()
                .ok_or_else(|| {
                    OrchestratorError::NotFound(format!(
                        "Repo {slug} not found in team {team}: team does not have repo access"
                    ))
                })
        })
        .collect()
}

/// Resolve each slug with a direct lookup in the organization
pub async fn resolve_repositories<P: OrganizationApi>(
    platform: &P,
    org: &str,
    slugs: &[String],
) -> Result<Vec<RepositoryRef>> {
    let mut resolved = Vec::with_capacity(slugs.len());
    for slug in slugs {
        let repository = platform.get_repository(org, slug).await.map_err(|e| {
            if e.is_not_found() {
                OrchestratorError::NotFound(format!("Repository {slug} not found"))
            } else {
                OrchestratorError::upstream(format!("Unable to retrieve repository {slug}"), &e)
            }
        })?;
        resolved.push(repository);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corral_client::testing::{Call, InMemoryPlatform};

    fn slugs(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_parse_trims_and_dedupes() {
        let parsed = parse_repository_list(" api, web ,,api,docs ").unwrap();
        assert_eq!(parsed, slugs(&["api", "web", "docs"]));
    }

    #[test]
    fn test_parse_blank_list_is_bad_request() {
        for raw in ["", " ", ",,", " , "] {
            let err = parse_repository_list(raw).unwrap_err();
            assert_eq!(
                err,
                OrchestratorError::BadRequest("Missing required parameter: repos".to_string())
            );
        }
    }

    #[tokio::test]
    async fn test_team_resolution_keeps_request_order_across_pages() {
        let platform = InMemoryPlatform::new();
        let mut ids = Vec::new();
        for name in ["a", "b", "c", "d", "e"] {
            let id = platform.add_repository(name);
            platform.grant_team_repository("platform", id);
            ids.push(id);
        }

        let resolved = resolve_team_repositories(
            &platform,
            "acme",
            "platform",
            &slugs(&["e", "a"]),
            2,
        )
        .await
        .unwrap();

        assert_eq!(
            resolved.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![ids[4], ids[0]]
        );
        assert_eq!(platform.calls(Call::ListTeamRepositories), 3);
    }

    #[tokio::test]
    async fn test_team_resolution_rejects_repo_outside_team() {
        let platform = InMemoryPlatform::new();
        let api = platform.add_repository("api");
        platform.grant_team_repository("platform", api);
        platform.add_repository("secret");

        let err = resolve_team_repositories(
            &platform,
            "acme",
            "platform",
            &slugs(&["api", "secret"]),
            100,
        )
        .await
        .unwrap_err();

        assert_eq!(
            err,
            OrchestratorError::NotFound(
                "Repo secret not found in team platform: team does not have repo access"
                    .to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_direct_resolution_names_missing_slug() {
        let platform = InMemoryPlatform::new();
        platform.add_repository("api");

        let err = resolve_repositories(&platform, "acme", &slugs(&["api", "gone"]))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            OrchestratorError::NotFound("Repository gone not found".to_string())
        );
        assert_eq!(platform.calls(Call::GetRepository), 2);
    }
}
