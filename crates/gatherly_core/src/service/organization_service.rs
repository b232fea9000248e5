//! Organization use-case service.
//!
//! # Responsibility
//! - Create organizations with the creator as first admin and member.
//! - Self-service joins for public organizations.
//! - Admin promotion gated on `OrganizationCapability::ManageAdmins`.
//!
//! # Invariants
//! - Private organizations only accept joins from users already holding
//!   a role.
//! - Only existing members can be promoted to admin.

use crate::access::{has_capability, organization_role, role_label, OrganizationCapability};
use crate::model::organization::{
    MembershipRole, NewOrganization, Organization, OrganizationId, OrganizationValidationError,
};
use crate::model::user::UserId;
use crate::repo::organization_repo::OrganizationRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::{RecordKind, RepoError};
use crate::service::{
    INTERNAL_ERROR, INVALID_INPUT, MEMBER_NOT_FOUND, ORGANIZATION_NOT_AUTHORIZED,
    ORGANIZATION_NOT_FOUND, USER_NOT_FOUND,
};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from organization use-cases.
#[derive(Debug)]
pub enum OrganizationServiceError {
    UserNotFound(UserId),
    OrganizationNotFound(OrganizationId),
    OrganizationNotAuthorized {
        organization_id: OrganizationId,
        user_id: UserId,
    },
    /// Promotion target is not a member of the organization.
    MemberNotFound {
        organization_id: OrganizationId,
        user_id: UserId,
    },
    Validation(OrganizationValidationError),
    Repo(RepoError),
    InconsistentState(&'static str),
}

impl OrganizationServiceError {
    /// Stable caller-facing error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => USER_NOT_FOUND,
            Self::OrganizationNotFound(_) => ORGANIZATION_NOT_FOUND,
            Self::OrganizationNotAuthorized { .. } => ORGANIZATION_NOT_AUTHORIZED,
            Self::MemberNotFound { .. } => MEMBER_NOT_FOUND,
            Self::Validation(_) => INVALID_INPUT,
            Self::Repo(_) | Self::InconsistentState(_) => INTERNAL_ERROR,
        }
    }
}

impl Display for OrganizationServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::OrganizationNotFound(id) => write!(f, "organization not found: {id}"),
            Self::OrganizationNotAuthorized {
                organization_id,
                user_id,
            } => write!(
                f,
                "user {user_id} is not authorized for organization {organization_id}"
            ),
            Self::MemberNotFound {
                organization_id,
                user_id,
            } => write!(
                f,
                "user {user_id} is not a member of organization {organization_id}"
            ),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent organization state: {details}")
            }
        }
    }
}

impl Error for OrganizationServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for OrganizationServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::OrganizationValidation(err) => Self::Validation(err),
            RepoError::NotFound {
                kind: RecordKind::User,
                id,
            } => Self::UserNotFound(id),
            RepoError::NotFound {
                kind: RecordKind::Organization,
                id,
            } => Self::OrganizationNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Organization service facade.
pub struct OrganizationService<U: UserRepository, O: OrganizationRepository> {
    users: U,
    organizations: O,
}

impl<U: UserRepository, O: OrganizationRepository> OrganizationService<U, O> {
    pub fn new(users: U, organizations: O) -> Self {
        Self {
            users,
            organizations,
        }
    }

    /// Creates an organization owned by `creator_id`.
    pub fn create_organization(
        &self,
        creator_id: UserId,
        organization: &NewOrganization,
    ) -> Result<Organization, OrganizationServiceError> {
        self.ensure_user_exists(creator_id)?;
        organization
            .validate()
            .map_err(OrganizationServiceError::Validation)?;

        let created = self
            .organizations
            .create_organization(creator_id, organization)?;
        info!(
            "event=organization_create module=service status=ok organization_id={} is_public={}",
            created.id, created.is_public
        );
        Ok(created)
    }

    /// Gets one organization by id.
    pub fn get_organization(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, OrganizationServiceError> {
        self.organizations.get_organization(id).map_err(Into::into)
    }

    /// Adds `user_id` to the members of a public organization.
    ///
    /// Joining twice is a no-op.
    pub fn join_organization(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<Organization, OrganizationServiceError> {
        self.ensure_user_exists(user_id)?;
        let organization = self.resolve_organization(organization_id)?;

        if !organization.is_public && organization_role(&organization, user_id).is_none() {
            warn!(
                "event=organization_join module=service status=rejected organization_id={} role={} error_code={}",
                organization_id,
                role_label(&organization, user_id),
                ORGANIZATION_NOT_AUTHORIZED
            );
            return Err(OrganizationServiceError::OrganizationNotAuthorized {
                organization_id,
                user_id,
            });
        }

        // Why: membership rows are keyed by (organization, user, role), so a
        // repeated join succeeds without adding a second row.
        let inserted =
            self.organizations
                .add_member(organization_id, user_id, MembershipRole::Member)?;
        info!(
            "event=organization_join module=service status=ok organization_id={} inserted={}",
            organization_id, inserted
        );
        self.reload(organization_id)
    }

    /// Promotes an existing member to admin.
    ///
    /// `requester_id` must be the creator or an admin.
    pub fn add_admin(
        &self,
        requester_id: UserId,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<Organization, OrganizationServiceError> {
        self.ensure_user_exists(requester_id)?;
        let organization = self.resolve_organization(organization_id)?;

        if !has_capability(
            &organization,
            requester_id,
            OrganizationCapability::ManageAdmins,
        ) {
            warn!(
                "event=organization_add_admin module=service status=rejected organization_id={} capability={} role={} error_code={}",
                organization_id,
                OrganizationCapability::ManageAdmins.as_str(),
                role_label(&organization, requester_id),
                ORGANIZATION_NOT_AUTHORIZED
            );
            return Err(OrganizationServiceError::OrganizationNotAuthorized {
                organization_id,
                user_id: requester_id,
            });
        }

        self.ensure_user_exists(user_id)?;
        if !organization.is_member(user_id) {
            return Err(OrganizationServiceError::MemberNotFound {
                organization_id,
                user_id,
            });
        }

        self.organizations
            .add_member(organization_id, user_id, MembershipRole::Admin)?;
        info!(
            "event=organization_add_admin module=service status=ok organization_id={} user_id={}",
            organization_id, user_id
        );
        self.reload(organization_id)
    }

    fn ensure_user_exists(&self, user_id: UserId) -> Result<(), OrganizationServiceError> {
        self.users
            .get_user(user_id)?
            .map(|_| ())
            .ok_or(OrganizationServiceError::UserNotFound(user_id))
    }

    fn resolve_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Organization, OrganizationServiceError> {
        self.organizations
            .get_organization(organization_id)?
            .ok_or(OrganizationServiceError::OrganizationNotFound(
                organization_id,
            ))
    }

    fn reload(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Organization, OrganizationServiceError> {
        self.organizations
            .get_organization(organization_id)?
            .ok_or(OrganizationServiceError::InconsistentState(
                "organization missing after membership update",
            ))
    }
}
