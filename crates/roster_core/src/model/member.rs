//! Member domain model.
//!
//! # Responsibility
//! - Define the member record and its read projections.
//! - Validate member fields before they reach storage.
//!
//! # Invariants
//! - `id` is stable for the lifetime of the member.
//! - `team_id` is a plain reference; assigning it never touches a `Team`.
//! - `created_at`/`updated_at` are owned by storage and ignored on write.

use crate::model::team::{Team, TeamId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a member row.
pub type MemberId = Uuid;

const USERNAME_MAX_CHARS: usize = 64;

/// Field-level validation failure for members and teams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyUsername,
    EmptyTeamName,
    NameTooLong { chars: usize, max: usize },
    NegativeAge(i32),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be blank"),
            Self::EmptyTeamName => write!(f, "team name must not be blank"),
            Self::NameTooLong { chars, max } => {
                write!(f, "name has {chars} characters; at most {max} are allowed")
            }
            Self::NegativeAge(age) => write!(f, "age must be >= 0, got {age}"),
        }
    }
}

impl Error for ValidationError {}

/// Canonical member record.
///
/// Equality is structural over every field, so two copies read at different
/// times compare unequal once storage bumped `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub username: String,
    pub age: i32,
    pub team_id: Option<TeamId>,
    /// Epoch milliseconds, assigned by storage on first save.
    pub created_at: i64,
    /// Epoch milliseconds, bumped by storage on every write.
    pub updated_at: i64,
}

impl Member {
    /// Creates an unsaved member with a fresh id and no team.
    pub fn new(username: impl Into<String>, age: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            age,
            team_id: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Creates an unsaved member already pointing at `team_id`.
    pub fn in_team(username: impl Into<String>, age: i32, team_id: TeamId) -> Self {
        let mut member = Self::new(username, age);
        member.team_id = Some(team_id);
        member
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_username(&self.username)?;
        validate_age(self.age)
    }
}

pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    let chars = trimmed.chars().count();
    if chars > USERNAME_MAX_CHARS {
        return Err(ValidationError::NameTooLong {
            chars,
            max: USERNAME_MAX_CHARS,
        });
    }
    Ok(())
}

pub(crate) fn validate_age(age: i32) -> Result<(), ValidationError> {
    if age < 0 {
        return Err(ValidationError::NegativeAge(age));
    }
    Ok(())
}

/// Flat read model: member columns plus the joined team name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDto {
    pub id: MemberId,
    pub username: String,
    pub team_name: Option<String>,
}

impl From<&Member> for MemberDto {
    /// Projection without a join; `team_name` stays empty.
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            username: member.username.clone(),
            team_name: None,
        }
    }
}

/// Member plus its team, populated only when the query asked for the join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberWithTeam {
    pub member: Member,
    /// `None` either because the member has no team or because the query
    /// used `Fetch::MemberOnly`.
    pub team: Option<Team>,
}
