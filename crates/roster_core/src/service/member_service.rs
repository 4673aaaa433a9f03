//! Member use-case service.
//!
//! # Responsibility
//! - Expose member use cases on top of one storage value.
//! - Route paging and bulk writes through `PagedRepository`.
//!
//! # Invariants
//! - Every write goes through repository validation.
//! - Finders take explicit predicates; nothing is derived from method names.

use crate::model::member::{Member, MemberId};
use crate::model::page::{Page, PageRequest, Slice, Sort};
use crate::model::query::{BulkUpdateSpec, MemberMutation, MemberPredicate, MemberSortField};
use crate::model::team::TeamId;
use crate::repo::backend::StorageBackend;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::member_repo::MemberRepository;
use crate::repo::paged::PagedRepository;
use log::info;

/// Member storage that supports both CRUD and paging.
pub trait MemberBackend:
    MemberRepository
    + StorageBackend<
        Record = Member,
        Predicate = MemberPredicate,
        Mutation = MemberMutation,
        SortField = MemberSortField,
    >
{
}

impl<T> MemberBackend for T where
    T: MemberRepository
        + StorageBackend<
            Record = Member,
            Predicate = MemberPredicate,
            Mutation = MemberMutation,
            SortField = MemberSortField,
        >
{
}

/// Use-case entry points for members.
pub struct MemberService<R: MemberBackend> {
    pages: PagedRepository<R>,
}

impl<R: MemberBackend> MemberService<R> {
    /// Creates a service over `repo`.
    pub fn new(repo: R) -> Self {
        Self {
            pages: PagedRepository::new(repo),
        }
    }

    fn repo(&self) -> &R {
        self.pages.backend()
    }

    /// Validates and stores a new member.
    ///
    /// # Contract
    /// - Assigns a fresh id.
    /// - `team_id` must reference an existing team, else `NotFound`.
    pub fn register(
        &self,
        username: impl Into<String>,
        age: i32,
        team_id: Option<TeamId>,
    ) -> RepoResult<Member> {
        let mut member = Member::new(username, age);
        member.team_id = team_id;
        let saved = self.repo().save(&member)?;
        info!("event=member_register module=service status=ok");
        Ok(saved)
    }

    /// Loads one member by id; `None` when absent.
    pub fn find(&self, id: MemberId) -> RepoResult<Option<Member>> {
        self.repo().find_by_id(id)
    }

    /// Members whose username equals `username`, in insertion order.
    pub fn find_by_username(&self, username: &str) -> RepoResult<Vec<Member>> {
        self.repo().find_matching(
            &MemberPredicate::UsernameEq(username.to_string()),
            &Sort::unsorted(),
        )
    }

    /// Members named `username` that are strictly older than `age`.
    pub fn find_by_username_and_age_greater_than(
        &self,
        username: &str,
        age: i32,
    ) -> RepoResult<Vec<Member>> {
        let predicate =
            MemberPredicate::UsernameEq(username.to_string()).and(MemberPredicate::AgeGt(age));
        self.repo().find_matching(&predicate, &Sort::unsorted())
    }

    /// Members whose username is in `usernames`; empty input yields none.
    pub fn find_by_usernames(&self, usernames: &[String]) -> RepoResult<Vec<Member>> {
        self.repo().find_matching(
            &MemberPredicate::UsernameIn(usernames.to_vec()),
            &Sort::unsorted(),
        )
    }

    /// One page of members matching `predicate`.
    ///
    /// # Contract
    /// - Rejects a negative index or non-positive size before any query.
    /// - `total_elements` equals `count(predicate)`.
    pub fn find_page(
        &self,
        predicate: &MemberPredicate,
        request: &PageRequest<MemberSortField>,
    ) -> RepoResult<Page<Member>> {
        self.pages.find_page(predicate, request)
    }

    /// One page of members aged exactly `age`.
    pub fn find_page_by_age(
        &self,
        age: i32,
        request: &PageRequest<MemberSortField>,
    ) -> RepoResult<Page<Member>> {
        self.pages.find_page(&MemberPredicate::AgeEq(age), request)
    }

    /// Members aged exactly `age`, without the total count query.
    pub fn find_slice_by_age(
        &self,
        age: i32,
        request: &PageRequest<MemberSortField>,
    ) -> RepoResult<Slice<Member>> {
        self.pages.find_slice(&MemberPredicate::AgeEq(age), request)
    }

    /// Number of members matching `predicate`.
    pub fn count(&self, predicate: &MemberPredicate) -> RepoResult<u64> {
        self.pages.count(predicate)
    }

    /// Adds one year to every member aged `min_age` or older.
    ///
    /// # Contract
    /// - Runs as one storage update and returns the affected count.
    /// - Ages saturate at `i32::MAX`.
    /// - Members loaded before this call keep their old age; re-read them.
    pub fn bulk_age_plus(&self, min_age: i32) -> RepoResult<u64> {
        let affected = self.pages.bulk_update(BulkUpdateSpec::new(
            MemberPredicate::AgeGte(min_age),
            MemberMutation::AgeAdd(1),
        ))?;
        info!("event=bulk_age_plus module=service status=ok min_age={min_age} affected={affected}");
        Ok(affected)
    }

    /// Points a member at another team (or none) and returns the stored row.
    ///
    /// The team side is not touched; `TeamService::members_of` re-queries.
    pub fn change_team(&self, member_id: MemberId, team_id: Option<TeamId>) -> RepoResult<Member> {
        let mut member = self.repo().find_by_id(member_id)?.ok_or(RepoError::NotFound {
            entity: "member",
            id: member_id,
        })?;
        member.team_id = team_id;
        self.repo().save(&member)
    }

    /// Deletes a member; `NotFound` when absent.
    pub fn remove(&self, id: MemberId) -> RepoResult<()> {
        self.repo().delete(id)
    }
}
