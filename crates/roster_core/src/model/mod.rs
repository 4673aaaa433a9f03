//! Roster domain model.
//!
//! # Responsibility
//! - Define the member/team records and the value objects used to query them.
//! - Keep paging math in one place so every backend derives metadata alike.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that is never reused.
//! - Associations are plain foreign keys; nothing here mutates a record as a
//!   side effect of touching another one.

pub mod member;
pub mod page;
pub mod query;
pub mod team;
