//! Paged repository over any `StorageBackend`.
//!
//! # Responsibility
//! - Validate page requests and derive `(skip, limit)` windows.
//! - Pair each page scan with a separate total count.
//! - Run bulk conditional updates as one backend call.
//!
//! # Invariants
//! - Invalid requests fail with `InvalidPageRequest` before the backend is
//!   contacted.
//! - Nothing is cached between calls; every call reads through.
//! - Backend errors are returned unchanged.

use crate::model::page::{Page, PageRequest, PageWindow, Slice};
use crate::model::query::BulkUpdateSpec;
use crate::repo::backend::StorageBackend;
use crate::repo::error::{RepoError, RepoResult};
use log::{debug, error};

/// Offset/limit paging and bulk updates on top of a storage backend.
#[derive(Debug, Clone, Copy)]
pub struct PagedRepository<B> {
    backend: B,
}

impl<B: StorageBackend> PagedRepository<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns one page of matching records together with the total count.
    ///
    /// A page index past the end yields empty content with the real total.
    ///
    /// # Errors
    /// - `InvalidPageRequest` for a negative index or non-positive size.
    /// - Backend errors, unchanged.
    pub fn find_page(
        &self,
        predicate: &B::Predicate,
        request: &PageRequest<B::SortField>,
    ) -> RepoResult<Page<B::Record>> {
        let window = checked_window(request)?;
        let content = self
            .backend
            .scan(predicate, &request.sort, window.skip, window.limit)
            .inspect_err(|err| log_backend_error("find_page", err))?;
        let total = self
            .backend
            .count_matching(predicate)
            .inspect_err(|err| log_backend_error("find_page", err))?;

        let page = Page::new(content, window, total);
        debug!(
            "event=find_page module=repo status=ok page={} size={} returned={} total={}",
            page.number,
            page.size,
            page.number_of_elements(),
            page.total_elements
        );
        Ok(page)
    }

    /// Returns one slice of matching records without a count query.
    pub fn find_slice(
        &self,
        predicate: &B::Predicate,
        request: &PageRequest<B::SortField>,
    ) -> RepoResult<Slice<B::Record>> {
        let window = checked_window(request)?;
        let rows = self
            .backend
            .scan(
                predicate,
                &request.sort,
                window.skip,
                window.limit.saturating_add(1),
            )
            .inspect_err(|err| log_backend_error("find_slice", err))?;

        let slice = Slice::from_probe(rows, window);
        debug!(
            "event=find_slice module=repo status=ok page={} size={} returned={} has_next={}",
            slice.number,
            slice.size,
            slice.content.len(),
            slice.has_next
        );
        Ok(slice)
    }

    pub fn count(&self, predicate: &B::Predicate) -> RepoResult<u64> {
        self.backend
            .count_matching(predicate)
            .inspect_err(|err| log_backend_error("count", err))
    }

    /// Applies `spec.mutation` to every record matching `spec.predicate`.
    ///
    /// Returns the number of modified records; zero is not an error. Copies
    /// of affected records fetched before this call are stale afterwards.
    pub fn bulk_update(&self, spec: BulkUpdateSpec<B::Predicate, B::Mutation>) -> RepoResult<u64> {
        let affected = self
            .backend
            .update_matching(&spec.predicate, &spec.mutation)
            .inspect_err(|err| log_backend_error("bulk_update", err))?;
        debug!("event=bulk_update module=repo status=ok affected={affected}");
        Ok(affected)
    }
}

fn checked_window<F>(request: &PageRequest<F>) -> RepoResult<PageWindow> {
    request.window().ok_or(RepoError::InvalidPageRequest {
        page: request.page,
        size: request.size,
    })
}

fn log_backend_error(event: &str, err: &RepoError) {
    error!("event={event} module=repo status=error error={err}");
}
