//! Event use-case service.
//!
//! # Responsibility
//! - Run the `createEvent` workflow: resolve requester, resolve
//!   organization, authorize, validate, insert with links, read back.
//! - Provide event read APIs scoped to an organization.
//!
//! # Invariants
//! - Requester resolution runs before any payload inspection.
//! - No write happens unless every precondition and validation passed.
//! - The created event lists its creator as admin and registrant, and the
//!   creator's `created_events`/`registered_events`/`event_admin`
//!   projections each gain the event id exactly once.
//! - Organizations are only read, never mutated, by this service.

use crate::access::{can_create_event, role_label, OrganizationCapability};
use crate::model::event::{CreateEventRequest, Event, EventId, EventValidationError};
use crate::model::organization::{Organization, OrganizationId};
use crate::model::user::UserId;
use crate::repo::event_repo::EventRepository;
use crate::repo::organization_repo::OrganizationRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::{RecordKind, RepoError};
use crate::service::{
    INTERNAL_ERROR, INVALID_INPUT, ORGANIZATION_NOT_AUTHORIZED, ORGANIZATION_NOT_FOUND,
    USER_NOT_FOUND,
};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Errors from event use-cases.
#[derive(Debug)]
pub enum EventServiceError {
    /// Requester id does not resolve to a user.
    UserNotFound(UserId),
    /// Organization id is absent from the payload (`None`) or unknown.
    OrganizationNotFound(Option<OrganizationId>),
    /// Requester is neither creator, admin nor member of the organization.
    OrganizationNotAuthorized {
        organization_id: OrganizationId,
        user_id: UserId,
    },
    /// Event fields failed validation.
    Validation(EventValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Write succeeded but read-back disagrees.
    InconsistentState(&'static str),
}

impl EventServiceError {
    /// Stable caller-facing error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserNotFound(_) => USER_NOT_FOUND,
            Self::OrganizationNotFound(_) => ORGANIZATION_NOT_FOUND,
            Self::OrganizationNotAuthorized { .. } => ORGANIZATION_NOT_AUTHORIZED,
            Self::Validation(_) => INVALID_INPUT,
            Self::Repo(_) | Self::InconsistentState(_) => INTERNAL_ERROR,
        }
    }
}

impl Display for EventServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::OrganizationNotFound(Some(id)) => write!(f, "organization not found: {id}"),
            Self::OrganizationNotFound(None) => write!(f, "organization not found: no id given"),
            Self::OrganizationNotAuthorized {
                organization_id,
                user_id,
            } => write!(
                f,
                "user {user_id} is not authorized for organization {organization_id}"
            ),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent event state: {details}"),
        }
    }
}

impl Error for EventServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for EventServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::EventValidation(err) => Self::Validation(err),
            RepoError::NotFound {
                kind: RecordKind::User,
                id,
            } => Self::UserNotFound(id),
            RepoError::NotFound {
                kind: RecordKind::Organization,
                id,
            } => Self::OrganizationNotFound(Some(id)),
            other => Self::Repo(other),
        }
    }
}

impl From<EventValidationError> for EventServiceError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Event service facade over user, organization and event repositories.
pub struct EventService<U, O, E>
where
    U: UserRepository,
    O: OrganizationRepository,
    E: EventRepository,
{
    users: U,
    organizations: O,
    events: E,
}

impl<U, O, E> EventService<U, O, E>
where
    U: UserRepository,
    O: OrganizationRepository,
    E: EventRepository,
{
    pub fn new(users: U, organizations: O, events: E) -> Self {
        Self {
            users,
            organizations,
            events,
        }
    }

    /// Creates an event under the organization named in `request`.
    ///
    /// # Errors
    /// - `UserNotFound` when `requester_id` is unknown, whatever the payload.
    /// - `OrganizationNotFound` when `data` or `organizationId` is missing or
    ///   the id is unknown.
    /// - `OrganizationNotAuthorized` when the requester holds no role in the
    ///   organization.
    /// - `Validation` when event fields are invalid.
    pub fn create_event(
        &self,
        requester_id: UserId,
        request: &CreateEventRequest,
    ) -> Result<Event, EventServiceError> {
        let started_at = Instant::now();
        let result = self.create_event_checked(requester_id, request);

        match &result {
            Ok(event) => info!(
                "event=event_create module=service status=ok event_id={} organization_id={} duration_ms={}",
                event.id,
                event.organization,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=event_create module=service status=rejected error_code={} duration_ms={}",
                err.code(),
                started_at.elapsed().as_millis()
            ),
        }

        result
    }

    /// Gets one event by id.
    pub fn get_event(&self, id: EventId) -> Result<Option<Event>, EventServiceError> {
        self.events.get_event(id).map_err(Into::into)
    }

    /// Lists events owned by an existing organization, oldest first.
    pub fn list_organization_events(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Event>, EventServiceError> {
        self.resolve_organization(organization_id)?;
        self.events
            .list_events_by_organization(organization_id)
            .map_err(Into::into)
    }

    fn create_event_checked(
        &self,
        requester_id: UserId,
        request: &CreateEventRequest,
    ) -> Result<Event, EventServiceError> {
        self.users
            .get_user(requester_id)?
            .ok_or(EventServiceError::UserNotFound(requester_id))?;

        // Why: a payload without an organization id cannot name a target, so
        // it is reported the same way as an unknown organization.
        let Some((data, organization_id)) = request
            .data
            .as_ref()
            .and_then(|data| data.organization_id.map(|id| (data, id)))
        else {
            return Err(EventServiceError::OrganizationNotFound(None));
        };
        let organization = self.resolve_organization(organization_id)?;

        if !can_create_event(&organization, requester_id) {
            warn!(
                "event=event_create module=service status=rejected organization_id={} capability={} role={}",
                organization_id,
                OrganizationCapability::CreateEvent.as_str(),
                role_label(&organization, requester_id)
            );
            return Err(EventServiceError::OrganizationNotAuthorized {
                organization_id,
                user_id: requester_id,
            });
        }

        let event = Event::from_input(requester_id, organization.id, data);
        event.validate()?;

        // Admin and registrant links for the creator commit with the row.
        self.events.insert_event(&event)?;

        self.events
            .get_event(event.id)?
            .ok_or(EventServiceError::InconsistentState(
                "created event not found in read-back",
            ))
    }

    fn resolve_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Organization, EventServiceError> {
        self.organizations
            .get_organization(organization_id)?
            .ok_or(EventServiceError::OrganizationNotFound(Some(organization_id)))
    }
}
