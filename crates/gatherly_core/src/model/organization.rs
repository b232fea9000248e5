//! Organization domain model.
//!
//! # Invariants
//! - `creator` is always present in both `admins` and `members` after
//!   creation through the organization service.
//! - Being a member does not imply being an admin.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for an organization.
pub type OrganizationId = Uuid;

/// Role of a user inside an organization membership relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipRole {
    Member,
    Admin,
}

impl MembershipRole {
    /// Storage encoding used by `organization_members.role`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }
}

/// Creation input for an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganization {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub is_public: bool,
}

impl NewOrganization {
    pub fn validate(&self) -> Result<(), OrganizationValidationError> {
        if self.name.trim().is_empty() {
            return Err(OrganizationValidationError::BlankName);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizationValidationError {
    BlankName,
}

impl Display for OrganizationValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "organization name must not be blank"),
        }
    }
}

impl Error for OrganizationValidationError {}

/// Organization read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub description: String,
    /// Public organizations accept self-service joins.
    pub is_public: bool,
    pub creator: UserId,
    /// Creation time, epoch milliseconds.
    pub created_at: i64,
    /// Insertion ordered, no duplicates.
    pub admins: Vec<UserId>,
    /// Insertion ordered, no duplicates.
    pub members: Vec<UserId>,
}

impl Organization {
    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.admins.contains(&user_id)
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }
}
