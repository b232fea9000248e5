//! User use-case service.
//!
//! # Invariants
//! - Email uniqueness is checked before insert and re-checked by the
//!   storage constraint.
//! - Emails and names are never written to logs.

use crate::model::user::{NewUser, User, UserId, UserValidationError};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use crate::service::{EMAIL_ALREADY_EXISTS, INTERNAL_ERROR, INVALID_INPUT};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from user use-cases.
#[derive(Debug)]
pub enum UserServiceError {
    Validation(UserValidationError),
    EmailTaken,
    Repo(RepoError),
}

impl UserServiceError {
    /// Stable caller-facing error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => INVALID_INPUT,
            Self::EmailTaken => EMAIL_ALREADY_EXISTS,
            Self::Repo(_) => INTERNAL_ERROR,
        }
    }
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::EmailTaken => write!(f, "email is already registered"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::EmailTaken => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for UserServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::UserValidation(err) => Self::Validation(err),
            RepoError::Conflict(_) => Self::EmailTaken,
            other => Self::Repo(other),
        }
    }
}

/// User service facade over repository implementations.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new user.
    pub fn register_user(&self, user: &NewUser) -> Result<User, UserServiceError> {
        let normalized = user.normalized();
        if let Err(err) = normalized.validate() {
            warn!(
                "event=user_register module=service status=rejected error_code={INVALID_INPUT}"
            );
            return Err(UserServiceError::Validation(err));
        }
        if self.repo.find_user_by_email(&normalized.email)?.is_some() {
            warn!(
                "event=user_register module=service status=rejected error_code={EMAIL_ALREADY_EXISTS}"
            );
            return Err(UserServiceError::EmailTaken);
        }

        let created = self.repo.create_user(&normalized)?;
        info!(
            "event=user_register module=service status=ok user_id={}",
            created.id
        );
        Ok(created)
    }

    /// Gets one user with relation projections.
    pub fn get_user(&self, id: UserId) -> Result<Option<User>, UserServiceError> {
        self.repo.get_user(id).map_err(Into::into)
    }
}
