//! Member/team persistence with explicit predicates, offset paging and
//! bulk updates over SQLite.
//!
//! `PagedRepository` works against any `StorageBackend`; `SqliteMemberStore`
//! is the implementation shipped here.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, RosterConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::member::{Member, MemberDto, MemberId, MemberWithTeam, ValidationError};
pub use model::page::{Direction, Page, PageRequest, PageWindow, Slice, Sort};
pub use model::query::{BulkUpdateSpec, MemberMutation, MemberPredicate, MemberSortField};
pub use model::team::{Team, TeamId};
pub use repo::backend::StorageBackend;
pub use repo::error::{RepoError, RepoResult};
pub use repo::member_repo::{Fetch, MemberRepository, SqliteMemberStore};
pub use repo::paged::PagedRepository;
pub use repo::team_repo::{SqliteTeamStore, TeamRepository};
pub use service::member_service::{MemberBackend, MemberService};
pub use service::team_service::TeamService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
