//! Core domain logic for Gatherly community events.
//! Users, organizations and events, with the event-creation workflow as
//! the central mutation.

pub mod access;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use access::{
    can_create_event, has_capability, organization_role, role_label, OrganizationCapability,
    OrganizationRole,
};
pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::event::{
    CreateEventRequest, Event, EventId, EventInput, EventValidationError, ParticipantRole,
    Recurrence, Registrant,
};
pub use model::organization::{
    MembershipRole, NewOrganization, Organization, OrganizationId, OrganizationValidationError,
};
pub use model::user::{NewUser, User, UserId, UserValidationError};
pub use repo::event_repo::{EventRepository, SqliteEventRepository};
pub use repo::organization_repo::{OrganizationRepository, SqliteOrganizationRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RecordKind, RepoError, RepoResult};
pub use service::event_service::{EventService, EventServiceError};
pub use service::organization_service::{OrganizationService, OrganizationServiceError};
pub use service::user_service::{UserService, UserServiceError};
pub use service::{
    EMAIL_ALREADY_EXISTS, EVENT_NOT_FOUND, INTERNAL_ERROR, INVALID_INPUT, MEMBER_NOT_FOUND,
    ORGANIZATION_NOT_AUTHORIZED, ORGANIZATION_NOT_FOUND, USER_NOT_FOUND,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
