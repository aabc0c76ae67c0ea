//! Wire-level tests for the GitHub client against a mock server.

use corral_client::pagination::{PageRequest, collect_pages};
use corral_client::{ClientError, Credential, GitHubClient};
use corral_core::domain::group::GroupVisibility;
use corral_core::domain::identity::TeamRole;
use corral_core::dto::group::CreateRunnerGroup;
use rstest::rstest;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERVICE_TOKEN: &str = "ghs_service";

fn client_for(server: &MockServer) -> GitHubClient {
    GitHubClient::new(&server.uri(), SERVICE_TOKEN).expect("client should build")
}

#[tokio::test]
async fn authenticated_user_uses_caller_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "Bearer ghp_caller"))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "login": "octocat",
            "id": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let identity = client_for(&server)
        .get_authenticated_user(&Credential::new("ghp_caller"))
        .await
        .expect("user lookup should succeed");

    assert_eq!(identity.login, "octocat");
}

#[tokio::test]
async fn rejected_credential_surfaces_platform_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "Bad credentials",
            "documentation_url": "https://docs.github.com/rest"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_authenticated_user(&Credential::new("revoked"))
        .await
        .expect_err("revoked credential should fail");

    match err {
        ClientError::ApiError { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Bad credentials");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[rstest]
#[case::maintainer("maintainer", "active", TeamRole::Maintainer)]
#[case::member("member", "active", TeamRole::Member)]
#[case::pending_maintainer("maintainer", "pending", TeamRole::None)]
#[tokio::test]
async fn team_membership_maps_role_and_state(
    #[case] role: &str,
    #[case] state: &str,
    #[case] expected: TeamRole,
) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/teams/platform/memberships/octocat"))
        .and(header("authorization", "Bearer ghp_caller"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "url": "https://api.github.com/teams/1/memberships/octocat",
            "role": role,
            "state": state
        })))
        .mount(&server)
        .await;

    let actual = client_for(&server)
        .get_team_membership(&Credential::new("ghp_caller"), "acme", "platform", "octocat")
        .await
        .expect("membership lookup should succeed");

    assert_eq!(actual, expected);
}

#[tokio::test]
async fn unknown_team_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/teams/ghost/memberships/octocat"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "Not Found"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_team_membership(&Credential::new("ghp_caller"), "acme", "ghost", "octocat")
        .await
        .expect_err("unknown team should fail");

    assert!(err.is_not_found());
}

#[tokio::test]
async fn non_member_of_visible_team_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/teams/platform/memberships/octocat"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "Not Found"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/teams/platform"))
        .and(header("authorization", "Bearer ghp_caller"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 1,
            "slug": "platform",
            "name": "Platform"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);
    let credential = Credential::new("ghp_caller");

    let err = client
        .get_team_membership(&credential, "acme", "platform", "octocat")
        .await
        .expect_err("non-member lookup should fail");
    assert!(err.is_not_found());

    let visible = client
        .check_team_exists(&credential, "acme", "platform")
        .await
        .expect("team lookup should succeed");
    assert!(visible);
}

#[rstest]
#[case::missing(404, Ok(false))]
#[case::bad_credentials(401, Err(401))]
#[tokio::test]
async fn team_lookup_reports_missing_team(
    #[case] status: u16,
    #[case] expected: Result<bool, u16>,
) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/teams/ghost"))
        .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
            "message": "nope"
        })))
        .mount(&server)
        .await;

    let actual = client_for(&server)
        .check_team_exists(&Credential::new("ghp_caller"), "acme", "ghost")
        .await
        .map_err(|e| e.status().unwrap_or_default());

    assert_eq!(actual, expected);
}

#[tokio::test]
async fn runner_group_listing_follows_link_header() {
    let server = MockServer::start().await;
    let groups_path = "/orgs/acme/actions/runner-groups";
    let next = format!(
        "<{}{groups_path}?per_page=1&page=2>; rel=\"next\", <{}{groups_path}?per_page=1&page=2>; rel=\"last\"",
        server.uri(),
        server.uri()
    );

    Mock::given(method("GET"))
        .and(path(groups_path))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "1"))
        .and(header("authorization", "Bearer ghs_service"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "total_count": 2,
                    "runner_groups": [
                        { "id": 1, "name": "Default", "visibility": "all", "default": true }
                    ]
                }))
                .insert_header("Link", next.as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(groups_path))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total_count": 2,
            "runner_groups": [
                { "id": 7, "name": "platform", "visibility": "selected", "default": false }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let groups = collect_pages(1, |page| client.list_runner_groups("acme", page))
        .await
        .expect("listing should succeed");

    let names: Vec<&str> = groups.iter().map(|group| group.name.as_str()).collect();
    assert_eq!(names, vec!["Default", "platform"]);
    assert_eq!(groups[1].id, 7);
    assert_eq!(groups[1].visibility, GroupVisibility::Selected);
}

#[tokio::test]
async fn create_runner_group_sends_selected_visibility() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orgs/acme/actions/runner-groups"))
        .and(body_json(serde_json::json!({
            "name": "platform",
            "visibility": "selected",
            "allows_public_repositories": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 42,
            "name": "platform",
            "visibility": "selected",
            "allows_public_repositories": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let group = client_for(&server)
        .create_runner_group("acme", &CreateRunnerGroup::selected("platform"))
        .await
        .expect("create should succeed");

    assert_eq!(group.id, 42);
    assert_eq!(group.name, "platform");
}

#[tokio::test]
async fn existing_group_name_is_a_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orgs/acme/actions/runner-groups"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "message": "Name already exists"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .create_runner_group("acme", &CreateRunnerGroup::selected("platform"))
        .await
        .expect_err("duplicate should fail");

    assert!(err.is_conflict());
}

#[tokio::test]
async fn set_group_repositories_sends_all_ids_in_one_call() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/orgs/acme/actions/runner-groups/42/repositories"))
        .and(body_json(serde_json::json!({ "selected_repository_ids": [3, 5] })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .set_group_repositories("acme", 42, &[3, 5])
        .await
        .expect("set should succeed");
}

#[tokio::test]
async fn add_and_remove_group_repository_target_single_repo() {
    let server = MockServer::start().await;
    let repo_path = "/orgs/acme/actions/runner-groups/42/repositories/3";
    Mock::given(method("PUT"))
        .and(path(repo_path))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(repo_path))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .add_group_repository("acme", 42, 3)
        .await
        .expect("add should succeed");
    client
        .remove_group_repository("acme", 42, 3)
        .await
        .expect("remove should succeed");
}

#[tokio::test]
async fn group_contents_are_projected_from_wrapped_listings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/actions/runner-groups/42/runners"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total_count": 1,
            "runners": [
                { "id": 9, "name": "build-01", "os": "linux", "status": "online", "busy": false }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/actions/runner-groups/42/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total_count": 1,
            "repositories": [
                { "id": 3, "name": "api", "full_name": "acme/api", "private": true }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let runners = client
        .list_group_runners("acme", 42, PageRequest::first(100))
        .await
        .expect("runner listing should succeed");
    let repositories = client
        .list_group_repositories("acme", 42, PageRequest::first(100))
        .await
        .expect("repository listing should succeed");

    assert_eq!(runners.items[0].name, "build-01");
    assert_eq!(runners.next_page, None);
    assert_eq!(repositories.items[0].slug, "api");
    assert_eq!(repositories.items[0].id, 3);
}

#[tokio::test]
async fn team_repositories_are_a_bare_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/teams/platform/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": 3, "name": "api", "full_name": "acme/api" },
            { "id": 5, "name": "web", "full_name": "acme/web" }
        ])))
        .mount(&server)
        .await;

    let page = client_for(&server)
        .list_team_repositories("acme", "platform", PageRequest::first(100))
        .await
        .expect("team repository listing should succeed");

    let slugs: Vec<&str> = page.items.iter().map(|repo| repo.slug.as_str()).collect();
    assert_eq!(slugs, vec!["api", "web"]);
}

#[tokio::test]
async fn missing_repository_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "Not Found"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get_repository("acme", "nope")
        .await
        .expect_err("missing repository should fail");

    assert!(err.is_not_found());
}

#[rstest]
#[case::registration("registration-token")]
#[case::removal("remove-token")]
#[tokio::test]
async fn runner_tokens_are_returned_verbatim(#[case] kind: &str) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/orgs/acme/actions/runners/{kind}")))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "token": "LLBF3JGZDX3P5PMEXLND6TS6FCWO6",
            "expires_at": "2020-01-22T12:13:35.123-08:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let token = if kind == "registration-token" {
        client.create_registration_token("acme").await
    } else {
        client.create_removal_token("acme").await
    }
    .expect("token request should succeed");

    assert_eq!(token.token, "LLBF3JGZDX3P5PMEXLND6TS6FCWO6");
    assert_eq!(token.expires_at, "2020-01-22T12:13:35.123-08:00");
}
