//! Explicit query objects for members.
//!
//! Callers describe what they want with a `MemberPredicate` value instead of
//! encoding the filter in a method name. The same value drives SQL
//! generation and in-process evaluation through `matches`.

use crate::model::member::{validate_age, validate_username, Member, ValidationError};
use crate::model::team::TeamId;
use serde::{Deserialize, Serialize};

/// Columns a member query can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberSortField {
    Username,
    Age,
    CreatedAt,
}

/// Filter over member fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberPredicate {
    All,
    UsernameEq(String),
    /// Empty list matches nothing.
    UsernameIn(Vec<String>),
    AgeEq(i32),
    AgeGt(i32),
    AgeGte(i32),
    AgeLt(i32),
    TeamEq(TeamId),
    NoTeam,
    /// Empty conjunction matches everything.
    And(Vec<MemberPredicate>),
}

impl MemberPredicate {
    /// Conjunction that flattens nested `And`s.
    pub fn and(self, other: MemberPredicate) -> Self {
        let mut parts = match self {
            Self::And(parts) => parts,
            single => vec![single],
        };
        match other {
            Self::And(more) => parts.extend(more),
            single => parts.push(single),
        }
        Self::And(parts)
    }

    /// Evaluates the predicate against an in-memory member.
    pub fn matches(&self, member: &Member) -> bool {
        match self {
            Self::All => true,
            Self::UsernameEq(name) => member.username == *name,
            Self::UsernameIn(names) => names.iter().any(|name| *name == member.username),
            Self::AgeEq(age) => member.age == *age,
            Self::AgeGt(age) => member.age > *age,
            Self::AgeGte(age) => member.age >= *age,
            Self::AgeLt(age) => member.age < *age,
            Self::TeamEq(team_id) => member.team_id == Some(*team_id),
            Self::NoTeam => member.team_id.is_none(),
            Self::And(parts) => parts.iter().all(|part| part.matches(member)),
        }
    }
}

/// Change applied to every member matched by a bulk update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberMutation {
    /// Relative change, clamped to `[0, i32::MAX]`.
    AgeAdd(i32),
    AgeSet(i32),
    Rename(String),
    ClearTeam,
}

impl MemberMutation {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::AgeSet(age) => validate_age(*age),
            Self::Rename(username) => validate_username(username),
            Self::AgeAdd(_) | Self::ClearTeam => Ok(()),
        }
    }

    /// Applies the mutation to an in-memory member.
    pub fn apply(&self, member: &mut Member) {
        match self {
            Self::AgeAdd(delta) => member.age = member.age.saturating_add(*delta).max(0),
            Self::AgeSet(age) => member.age = *age,
            Self::Rename(username) => member.username = username.clone(),
            Self::ClearTeam => member.team_id = None,
        }
    }
}

/// One-shot bulk update: every row matching `predicate` gets `mutation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkUpdateSpec<P, M> {
    pub predicate: P,
    pub mutation: M,
}

impl<P, M> BulkUpdateSpec<P, M> {
    pub fn new(predicate: P, mutation: M) -> Self {
        Self {
            predicate,
            mutation,
        }
    }
}
