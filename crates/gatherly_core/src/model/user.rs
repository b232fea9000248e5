//! User domain model.
//!
//! # Responsibility
//! - Define registration input and the user read model.
//! - Normalize and validate registration fields.
//!
//! # Invariants
//! - `email` is stored lowercase and unique across users.
//! - Organization/event lists are read-only projections of relation tables.

use crate::model::event::EventId;
use crate::model::organization::OrganizationId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a user.
pub type UserId = Uuid;

const DEFAULT_APP_LANGUAGE_CODE: &str = "en";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex")
});
static LANGUAGE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{2,3}(-[A-Za-z0-9]{2,8})?$").expect("valid language regex"));

/// Registration input for a new user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Defaults to `en` when absent.
    #[serde(default)]
    pub app_language_code: Option<String>,
}

impl NewUser {
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            app_language_code: None,
        }
    }

    /// Returns a trimmed copy with lowercase email and a resolved language code.
    pub fn normalized(&self) -> Self {
        Self {
            email: self.email.trim().to_lowercase(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            app_language_code: Some(
                self.app_language_code
                    .as_deref()
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .unwrap_or(DEFAULT_APP_LANGUAGE_CODE)
                    .to_string(),
            ),
        }
    }

    /// Checks field shape. Expects an already normalized value.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if !EMAIL_RE.is_match(&self.email) {
            return Err(UserValidationError::InvalidEmail);
        }
        if self.first_name.trim().is_empty() {
            return Err(UserValidationError::BlankFirstName);
        }
        if self.last_name.trim().is_empty() {
            return Err(UserValidationError::BlankLastName);
        }
        if let Some(code) = self.app_language_code.as_deref() {
            if !LANGUAGE_CODE_RE.is_match(code) {
                return Err(UserValidationError::InvalidLanguageCode(code.to_string()));
            }
        }
        Ok(())
    }
}

/// Validation failures for user registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidEmail,
    BlankFirstName,
    BlankLastName,
    InvalidLanguageCode(String),
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email address is malformed"),
            Self::BlankFirstName => write!(f, "first name must not be blank"),
            Self::BlankLastName => write!(f, "last name must not be blank"),
            Self::InvalidLanguageCode(code) => write!(f, "unsupported language code `{code}`"),
        }
    }
}

impl Error for UserValidationError {}

/// User read model with relation projections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub app_language_code: String,
    /// Registration time, epoch milliseconds.
    pub created_at: i64,
    /// Organizations whose `creator` is this user.
    pub created_organizations: Vec<OrganizationId>,
    /// Organizations listing this user in `members`.
    pub joined_organizations: Vec<OrganizationId>,
    /// Organizations listing this user in `admins`.
    pub admin_for: Vec<OrganizationId>,
    /// Events whose `creator` is this user.
    pub created_events: Vec<EventId>,
    /// Events listing this user as a registrant.
    pub registered_events: Vec<EventId>,
    /// Events listing this user in `admins`.
    pub event_admin: Vec<EventId>,
}

#[cfg(test)]
mod tests {
    use super::{NewUser, UserValidationError};

    #[test]
    fn normalized_lowercases_email_and_defaults_language() {
        let user = NewUser::new("  Ada@Example.COM ", " Ada ", "Lovelace").normalized();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.app_language_code.as_deref(), Some("en"));
        user.validate().expect("normalized user should validate");
    }

    #[test]
    fn validate_rejects_malformed_email() {
        let err = NewUser::new("not-an-email", "A", "B")
            .normalized()
            .validate()
            .expect_err("malformed email must fail");
        assert_eq!(err, UserValidationError::InvalidEmail);
    }

    #[test]
    fn validate_rejects_blank_names_and_bad_language() {
        let err = NewUser::new("a@b.io", "  ", "B")
            .normalized()
            .validate()
            .expect_err("blank first name must fail");
        assert_eq!(err, UserValidationError::BlankFirstName);

        let mut user = NewUser::new("a@b.io", "A", "B");
        user.app_language_code = Some("ENGLISH".to_string());
        let err = user
            .normalized()
            .validate()
            .expect_err("bad language code must fail");
        assert_eq!(
            err,
            UserValidationError::InvalidLanguageCode("ENGLISH".to_string())
        );
    }
}
