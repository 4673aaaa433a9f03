//! Use-case services over the repository layer.
//!
//! # Responsibility
//! - Expose member/team use cases with explicit predicates.
//! - Perform association changes as explicit writes.
//!
//! # Invariants
//! - Services never bypass repository validation.
//! - Services stay storage-agnostic; SQLite appears only in `repo`.

pub mod member_service;
pub mod team_service;
