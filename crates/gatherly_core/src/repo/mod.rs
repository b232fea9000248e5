//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the storage collaborator contracts used by services
//!   (find by id, insert, relation updates).
//! - Keep SQL and row decoding inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate model input before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Relation writes (`organization_members`, `event_participants`) are
//!   append-only and never produce duplicate pairs.

pub mod event_repo;
pub mod organization_repo;
mod sql;
pub mod user_repo;

use crate::db::DbError;
use crate::model::event::EventValidationError;
use crate::model::organization::OrganizationValidationError;
use crate::model::user::UserValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Kind of record referenced by a repository error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    User,
    Organization,
    Event,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Organization => "organization",
            Self::Event => "event",
        }
    }
}

/// Repository error shared by user, organization and event storage.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    UserValidation(UserValidationError),
    OrganizationValidation(OrganizationValidationError),
    EventValidation(EventValidationError),
    /// Referenced record does not exist.
    NotFound { kind: RecordKind, id: Uuid },
    /// Write collides with a uniqueness constraint.
    Conflict(String),
    /// Persisted data cannot be decoded into a valid model.
    InvalidData(String),
    /// Connection schema is not at the migrated version this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl RepoError {
    pub(crate) fn not_found(kind: RecordKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UserValidation(err) => write!(f, "{err}"),
            Self::OrganizationValidation(err) => write!(f, "{err}"),
            Self::EventValidation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.as_str()),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UserValidation(err) => Some(err),
            Self::OrganizationValidation(err) => Some(err),
            Self::EventValidation(err) => Some(err),
            Self::NotFound { .. }
            | Self::Conflict(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<UserValidationError> for RepoError {
    fn from(value: UserValidationError) -> Self {
        Self::UserValidation(value)
    }
}

impl From<OrganizationValidationError> for RepoError {
    fn from(value: OrganizationValidationError) -> Self {
        Self::OrganizationValidation(value)
    }
}

impl From<EventValidationError> for RepoError {
    fn from(value: EventValidationError) -> Self {
        Self::EventValidation(value)
    }
}
