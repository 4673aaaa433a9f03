use crate::model::member::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TeamId = Uuid;

const TEAM_NAME_MAX_CHARS: usize = 64;

/// Group that members point at through `Member::team_id`.
///
/// A team never holds its member list; ask the repository for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Epoch milliseconds, assigned by storage on first save.
    pub created_at: i64,
    /// Epoch milliseconds, bumped by storage on every write.
    pub updated_at: i64,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyTeamName);
        }
        let chars = name.chars().count();
        if chars > TEAM_NAME_MAX_CHARS {
            return Err(ValidationError::NameTooLong {
                chars,
                max: TEAM_NAME_MAX_CHARS,
            });
        }
        Ok(())
    }
}
