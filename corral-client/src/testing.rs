//! In-memory platform double
//!
//! [`InMemoryPlatform`] implements both capability traits over a small
//! in-process model of users, teams, repositories and runner groups. It
//! honors the pagination contract, counts every call so tests can assert
//! which upstream operations ran, and can be told to fail mutations on a
//! given repository.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use corral_core::domain::group::{Runner, RunnerGroup};
use corral_core::domain::identity::{Identity, TeamRole};
use corral_core::domain::repository::RepositoryRef;
use corral_core::domain::token::RunnerToken;
use corral_core::dto::group::CreateRunnerGroup;

use crate::error::{ClientError, Result};
use crate::pagination::{Page, PageRequest};
use crate::platform::{CallerApi, Credential, OrganizationApi};

/// Expiry reported on every token the double issues
pub const TOKEN_EXPIRY: &str = "2030-01-01T00:00:00.000Z";

/// Upstream operations, for call counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    AuthenticatedUser,
    TeamMembership,
    TeamLookup,
    ListRunnerGroups,
    CreateRunnerGroup,
    DeleteRunnerGroup,
    ListGroupRunners,
    ListGroupRepositories,
    AddGroupRepository,
    RemoveGroupRepository,
    SetGroupRepositories,
    ListTeamRepositories,
    GetRepository,
    CreateRegistrationToken,
    CreateRemovalToken,
}

impl Call {
    /// Whether the call changes platform state or issues a credential
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            Call::CreateRunnerGroup
                | Call::DeleteRunnerGroup
                | Call::AddGroupRepository
                | Call::RemoveGroupRepository
                | Call::SetGroupRepositories
                | Call::CreateRegistrationToken
                | Call::CreateRemovalToken
        )
    }
}

#[derive(Debug, Default)]
struct TeamRecord {
    roles: HashMap<String, TeamRole>,
    repositories: Vec<u64>,
}

#[derive(Debug)]
struct GroupRecord {
    group: RunnerGroup,
    repositories: BTreeSet<u64>,
    runners: Vec<Runner>,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<String, String>,
    teams: HashMap<String, TeamRecord>,
    repositories: Vec<RepositoryRef>,
    groups: Vec<GroupRecord>,
    failing_repositories: HashSet<u64>,
    calls: HashMap<Call, usize>,
    next_id: u64,
}

impl State {
    fn record(&mut self, call: Call) {
        *self.calls.entry(call).or_default() += 1;
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn repository(&self, id: u64) -> Option<&RepositoryRef> {
        self.repositories.iter().find(|repo| repo.id == id)
    }

    fn group_mut(&mut self, group_id: u64) -> Result<&mut GroupRecord> {
        self.groups
            .iter_mut()
            .find(|record| record.group.id == group_id)
            .ok_or_else(|| ClientError::api_error(404, "Not Found"))
    }

    fn group(&self, group_id: u64) -> Result<&GroupRecord> {
        self.groups
            .iter()
            .find(|record| record.group.id == group_id)
            .ok_or_else(|| ClientError::api_error(404, "Not Found"))
    }

    fn check_repository_writable(&self, repository_id: u64) -> Result<()> {
        if self.failing_repositories.contains(&repository_id) {
            return Err(ClientError::api_error(500, "Server Error"));
        }
        Ok(())
    }
}

/// An in-process stand-in for the CI platform
#[derive(Debug, Default)]
pub struct InMemoryPlatform {
    state: Mutex<State>,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =============================================================================
    // Seeding
    // =============================================================================

    /// Register a credential that authenticates as `login`
    pub fn add_user(&self, credential: &str, login: &str) {
        self.state()
            .users
            .insert(credential.to_string(), login.to_string());
    }

    /// Create an empty team
    pub fn add_team(&self, team: &str) {
        self.state().teams.entry(team.to_string()).or_default();
    }

    /// Give `login` a role on `team`, creating the team if needed
    pub fn set_role(&self, team: &str, login: &str, role: TeamRole) {
        self.state()
            .teams
            .entry(team.to_string())
            .or_default()
            .roles
            .insert(login.to_string(), role);
    }

    /// Create an organization repository, returning its id
    pub fn add_repository(&self, slug: &str) -> u64 {
        let mut state = self.state();
        let id = state.allocate_id();
        state.repositories.push(RepositoryRef::new(id, slug));
        id
    }

    /// Grant `team` access to an existing repository
    pub fn grant_team_repository(&self, team: &str, repository_id: u64) {
        let mut state = self.state();
        let record = state.teams.entry(team.to_string()).or_default();
        if !record.repositories.contains(&repository_id) {
            record.repositories.push(repository_id);
        }
    }

    /// Create a runner group directly, bypassing call counting
    pub fn add_runner_group(&self, name: &str) -> u64 {
        let mut state = self.state();
        let id = state.allocate_id();
        state.groups.push(GroupRecord {
            group: RunnerGroup {
                id,
                name: name.to_string(),
                visibility: corral_core::domain::group::GroupVisibility::Selected,
            },
            repositories: BTreeSet::new(),
            runners: Vec::new(),
        });
        id
    }

    /// Register a runner in a group
    pub fn add_runner(&self, group_id: u64, name: &str) {
        let mut state = self.state();
        let id = state.allocate_id();
        if let Ok(record) = state.group_mut(group_id) {
            record.runners.push(Runner {
                id,
                name: name.to_string(),
                status: "online".to_string(),
            });
        }
    }

    /// Make every add/remove touching this repository fail with a 500
    pub fn fail_repository(&self, repository_id: u64) {
        self.state().failing_repositories.insert(repository_id);
    }

    // =============================================================================
    // Inspection
    // =============================================================================

    /// Number of times `call` was made
    pub fn calls(&self, call: Call) -> usize {
        self.state().calls.get(&call).copied().unwrap_or(0)
    }

    /// Number of state-changing calls made
    pub fn mutation_count(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|(call, _)| call.is_mutation())
            .map(|(_, count)| count)
            .sum()
    }

    pub fn group_count(&self) -> usize {
        self.state().groups.len()
    }

    /// First group with this name, in creation order
    pub fn group_named(&self, name: &str) -> Option<RunnerGroup> {
        self.state()
            .groups
            .iter()
            .find(|record| record.group.name == name)
            .map(|record| record.group.clone())
    }

    /// Slugs of the repositories with access to a group, sorted
    pub fn group_repository_slugs(&self, group_id: u64) -> Vec<String> {
        let state = self.state();
        let Ok(record) = state.group(group_id) else {
            return Vec::new();
        };
        let mut slugs: Vec<String> = record
            .repositories
            .iter()
            .filter_map(|id| state.repository(*id))
            .map(|repo| repo.slug.clone())
            .collect();
        slugs.sort();
        slugs
    }
}

/// Slice `items` according to `request`, like a paginated listing would
fn page_of<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    let per_page = usize::from(request.per_page.max(1));
    let start = (request.page.max(1) as usize - 1) * per_page;
    let chunk = items.iter().skip(start).take(per_page).cloned().collect();
    let next_page = (start + per_page < items.len()).then_some(request.page.max(1) + 1);

    Page {
        items: chunk,
        next_page,
    }
}

#[async_trait]
impl CallerApi for InMemoryPlatform {
    async fn authenticated_user(&self, credential: &Credential) -> Result<Identity> {
        let mut state = self.state();
        state.record(Call::AuthenticatedUser);

        state
            .users
            .get(credential.expose())
            .map(|login| Identity {
                login: login.clone(),
            })
            .ok_or_else(|| ClientError::api_error(401, "Bad credentials"))
    }

    async fn team_membership(
        &self,
        _credential: &Credential,
        _org: &str,
        team: &str,
        login: &str,
    ) -> Result<TeamRole> {
        let mut state = self.state();
        state.record(Call::TeamMembership);

        state
            .teams
            .get(team)
            .and_then(|record| record.roles.get(login))
            .copied()
            .ok_or_else(|| ClientError::api_error(404, "Not Found"))
    }

    async fn team_exists(&self, _credential: &Credential, _org: &str, team: &str) -> Result<bool> {
        let mut state = self.state();
        state.record(Call::TeamLookup);

        Ok(state.teams.contains_key(team))
    }
}

#[async_trait]
impl OrganizationApi for InMemoryPlatform {
    async fn list_runner_groups(&self, _org: &str, page: PageRequest) -> Result<Page<RunnerGroup>> {
        let mut state = self.state();
        state.record(Call::ListRunnerGroups);

        let groups: Vec<RunnerGroup> = state
            .groups
            .iter()
            .map(|record| record.group.clone())
            .collect();
        Ok(page_of(&groups, page))
    }

    async fn create_runner_group(
        &self,
        _org: &str,
        request: &CreateRunnerGroup,
    ) -> Result<RunnerGroup> {
        let mut state = self.state();
        state.record(Call::CreateRunnerGroup);

        if state
            .groups
            .iter()
            .any(|record| record.group.name == request.name)
        {
            return Err(ClientError::api_error(409, "Name already exists"));
        }

        let group = RunnerGroup {
            id: state.allocate_id(),
            name: request.name.clone(),
            visibility: request.visibility,
        };
        state.groups.push(GroupRecord {
            group: group.clone(),
            repositories: BTreeSet::new(),
            runners: Vec::new(),
        });
        Ok(group)
    }

    async fn delete_runner_group(&self, _org: &str, group_id: u64) -> Result<()> {
        let mut state = self.state();
        state.record(Call::DeleteRunnerGroup);

        state.group(group_id)?;
        state.groups.retain(|record| record.group.id != group_id);
        Ok(())
    }

    async fn list_group_runners(
        &self,
        _org: &str,
        group_id: u64,
        page: PageRequest,
    ) -> Result<Page<Runner>> {
        let mut state = self.state();
        state.record(Call::ListGroupRunners);

        let record = state.group(group_id)?;
        Ok(page_of(&record.runners, page))
    }

    async fn list_group_repositories(
        &self,
        _org: &str,
        group_id: u64,
        page: PageRequest,
    ) -> Result<Page<RepositoryRef>> {
        let mut state = self.state();
        state.record(Call::ListGroupRepositories);

        let record = state.group(group_id)?;
        let repositories: Vec<RepositoryRef> = record
            .repositories
            .iter()
            .filter_map(|id| state.repository(*id).cloned())
            .collect();
        Ok(page_of(&repositories, page))
    }

    async fn add_group_repository(
        &self,
        _org: &str,
        group_id: u64,
        repository_id: u64,
    ) -> Result<()> {
        let mut state = self.state();
        state.record(Call::AddGroupRepository);

        state.check_repository_writable(repository_id)?;
        state.group_mut(group_id)?.repositories.insert(repository_id);
        Ok(())
    }

    async fn remove_group_repository(
        &self,
        _org: &str,
        group_id: u64,
        repository_id: u64,
    ) -> Result<()> {
        let mut state = self.state();
        state.record(Call::RemoveGroupRepository);

        state.check_repository_writable(repository_id)?;
        state.group_mut(group_id)?.repositories.remove(&repository_id);
        Ok(())
    }

    async fn set_group_repositories(
        &self,
        _org: &str,
        group_id: u64,
        repository_ids: &[u64],
    ) -> Result<()> {
        let mut state = self.state();
        state.record(Call::SetGroupRepositories);

        state.group_mut(group_id)?.repositories = repository_ids.iter().copied().collect();
        Ok(())
    }

    async fn list_team_repositories(
        &self,
        _org: &str,
        team: &str,
        page: PageRequest,
    ) -> Result<Page<RepositoryRef>> {
        let mut state = self.state();
        state.record(Call::ListTeamRepositories);

        let record = state
            .teams
            .get(team)
            .ok_or_else(|| ClientError::api_error(404, "Not Found"))?;
        let repositories: Vec<RepositoryRef> = record
            .repositories
            .iter()
            .filter_map(|id| state.repository(*id).cloned())
            .collect();
        Ok(page_of(&repositories, page))
    }

    async fn get_repository(&self, _org: &str, name: &str) -> Result<RepositoryRef> {
        let mut state = self.state();
        state.record(Call::GetRepository);

        state
            .repositories
            .iter()
            .find(|repo| repo.slug == name)
            .cloned()
            .ok_or_else(|| ClientError::api_error(404, "Not Found"))
    }

    async fn create_registration_token(&self, _org: &str) -> Result<RunnerToken> {
        let mut state = self.state();
        state.record(Call::CreateRegistrationToken);

        let serial = state.allocate_id();
        Ok(RunnerToken {
            token: format!("REGISTRATION{serial:08}"),
            expires_at: TOKEN_EXPIRY.to_string(),
        })
    }

    async fn create_removal_token(&self, _org: &str) -> Result<RunnerToken> {
        let mut state = self.state();
        state.record(Call::CreateRemovalToken);

        let serial = state.allocate_id();
        Ok(RunnerToken {
            token: format!("REMOVAL{serial:08}"),
            expires_at: TOKEN_EXPIRY.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_of_reports_continuation() {
        let items: Vec<u32> = (1..=5).collect();

        let first = page_of(&items, PageRequest { per_page: 2, page: 1 });
        assert_eq!(first.items, vec![1, 2]);
        assert_eq!(first.next_page, Some(2));

        let last = page_of(&items, PageRequest { per_page: 2, page: 3 });
        assert_eq!(last.items, vec![5]);
        assert_eq!(last.next_page, None);
    }

    #[tokio::test]
    async fn test_duplicate_group_name_conflicts() {
        let platform = InMemoryPlatform::new();
        platform
            .create_runner_group("acme", &CreateRunnerGroup::selected("platform"))
            .await
            .unwrap();

        let err = platform
            .create_runner_group("acme", &CreateRunnerGroup::selected("platform"))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(platform.group_count(), 1);
        assert_eq!(platform.calls(Call::CreateRunnerGroup), 2);
    }
}
