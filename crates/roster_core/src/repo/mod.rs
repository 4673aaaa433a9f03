//! Repository layer: storage contracts and their SQLite implementations.
//!
//! # Responsibility
//! - Define the `StorageBackend` boundary and the generic `PagedRepository`.
//! - Keep SQL inside this module; services only see typed values.
//!
//! # Invariants
//! - Write paths validate records before persistence.
//! - Storage failures surface as `RepoError::BackendUnavailable`, while
//!   semantic failures (`NotFound`, `InvalidPageRequest`) have their own
//!   variants.

pub mod backend;
pub mod error;
pub mod member_repo;
pub mod paged;
pub mod team_repo;
