//! Storage backend boundary consumed by `PagedRepository`.
//!
//! # Invariants
//! - `scan` never returns more than `limit` records.
//! - `update_matching` is one atomic storage operation; a reader never sees
//!   a partially applied mutation.
//! - Implementations keep no cache between calls.

use crate::model::page::Sort;
use crate::repo::error::RepoResult;

/// Filtered scan, count and bulk mutation over one record type.
pub trait StorageBackend {
    type Record;
    type Predicate;
    type Mutation;
    type SortField;

    /// Returns up to `limit` matching records after skipping `skip`, in
    /// `sort` order with a stable storage tiebreak.
    fn scan(
        &self,
        predicate: &Self::Predicate,
        sort: &Sort<Self::SortField>,
        skip: u64,
        limit: u64,
    ) -> RepoResult<Vec<Self::Record>>;

    fn count_matching(&self, predicate: &Self::Predicate) -> RepoResult<u64>;

    /// Applies `mutation` to every matching record; returns rows changed.
    fn update_matching(
        &self,
        predicate: &Self::Predicate,
        mutation: &Self::Mutation,
    ) -> RepoResult<u64>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for &B {
    type Record = B::Record;
    type Predicate = B::Predicate;
    type Mutation = B::Mutation;
    type SortField = B::SortField;

    fn scan(
        &self,
        predicate: &Self::Predicate,
        sort: &Sort<Self::SortField>,
        skip: u64,
        limit: u64,
    ) -> RepoResult<Vec<Self::Record>> {
        (**self).scan(predicate, sort, skip, limit)
    }

    fn count_matching(&self, predicate: &Self::Predicate) -> RepoResult<u64> {
        (**self).count_matching(predicate)
    }

    fn update_matching(
        &self,
        predicate: &Self::Predicate,
        mutation: &Self::Mutation,
    ) -> RepoResult<u64> {
        (**self).update_matching(predicate, mutation)
    }
}
