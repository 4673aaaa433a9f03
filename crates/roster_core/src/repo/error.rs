use crate::db::DbError;
use crate::model::member::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by every repository and service call.
#[derive(Debug)]
pub enum RepoError {
    /// Page index below zero, size not positive, or offset out of range.
    /// Raised before storage is contacted.
    InvalidPageRequest { page: i64, size: i64 },
    /// Storage failure, passed through as-is and never retried here.
    BackendUnavailable(DbError),
    Validation(ValidationError),
    NotFound { entity: &'static str, id: Uuid },
    /// Persisted row could not be decoded.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPageRequest { page, size } => write!(
                f,
                "invalid page request: page={page} size={size}; expected page >= 0 and size > 0"
            ),
            Self::BackendUnavailable(err) => write!(f, "storage backend unavailable: {err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::BackendUnavailable(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::InvalidPageRequest { .. } | Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::BackendUnavailable(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::BackendUnavailable(DbError::Storage(value))
    }
}
