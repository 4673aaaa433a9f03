//! Team use-case service.
//!
//! # Invariants
//! - Membership is read from member rows; teams hold no member list.

use crate::model::member::MemberId;
use crate::model::team::{Team, TeamId};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::team_repo::TeamRepository;

/// Use-case entry points for teams.
pub struct TeamService<R: TeamRepository> {
    repo: R,
}

impl<R: TeamRepository> TeamService<R> {
    /// Creates a service over `repo`.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and stores a new team with a fresh id.
    ///
    /// # Contract
    /// - Blank or over-long names fail with `Validation`.
    pub fn create_team(&self, name: impl Into<String>) -> RepoResult<Team> {
        self.repo.save(&Team::new(name))
    }

    /// Loads one team by id; `None` when absent.
    pub fn find(&self, id: TeamId) -> RepoResult<Option<Team>> {
        self.repo.find_by_id(id)
    }

    /// All teams ordered by name.
    pub fn list_teams(&self) -> RepoResult<Vec<Team>> {
        self.repo.find_all()
    }

    /// Current member ids of `team_id`, read from storage on every call.
    ///
    /// # Errors
    /// - `NotFound` when the team does not exist.
    pub fn members_of(&self, team_id: TeamId) -> RepoResult<Vec<MemberId>> {
        if self.repo.find_by_id(team_id)?.is_none() {
            return Err(RepoError::NotFound {
                entity: "team",
                id: team_id,
            });
        }
        self.repo.list_member_ids(team_id)
    }

    /// Deletes a team and detaches its members.
    ///
    /// # Errors
    /// - `NotFound` when the team does not exist.
    pub fn remove(&self, id: TeamId) -> RepoResult<()> {
        self.repo.delete(id)
    }
}
