//! Organization access checks.
//!
//! # Responsibility
//! - Resolve the strongest role a user holds inside an organization.
//! - Answer capability questions as plain booleans, independent of how
//!   membership is stored.
//!
//! # Invariants
//! - The organization creator always resolves to `OrganizationRole::Creator`.
//! - Users outside `creator`/`admins`/`members` hold no capability.

use crate::model::organization::Organization;
use crate::model::user::UserId;

/// Strongest role a user holds inside one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OrganizationRole {
    Member,
    Admin,
    Creator,
}

impl OrganizationRole {
    /// Stable string id used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
            Self::Creator => "creator",
        }
    }
}

/// Actions gated on organization role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrganizationCapability {
    CreateEvent,
    ManageAdmins,
}

impl OrganizationCapability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateEvent => "create_event",
            Self::ManageAdmins => "manage_admins",
        }
    }

    fn minimum_role(self) -> OrganizationRole {
        match self {
            Self::CreateEvent => OrganizationRole::Member,
            Self::ManageAdmins => OrganizationRole::Admin,
        }
    }
}

/// Returns the strongest role `user_id` holds in `organization`.
pub fn organization_role(organization: &Organization, user_id: UserId) -> Option<OrganizationRole> {
    if organization.creator == user_id {
        Some(OrganizationRole::Creator)
    } else if organization.is_admin(user_id) {
        Some(OrganizationRole::Admin)
    } else if organization.is_member(user_id) {
        Some(OrganizationRole::Member)
    } else {
        None
    }
}

/// Returns whether `user_id` may perform `capability` in `organization`.
pub fn has_capability(
    organization: &Organization,
    user_id: UserId,
    capability: OrganizationCapability,
) -> bool {
    organization_role(organization, user_id)
        .is_some_and(|role| role >= capability.minimum_role())
}

/// Diagnostic label for the role `user_id` holds, `none` for outsiders.
pub fn role_label(organization: &Organization, user_id: UserId) -> &'static str {
    organization_role(organization, user_id).map_or("none", OrganizationRole::as_str)
}

/// Returns whether `user_id` may create events under `organization`.
///
/// Creator, admins and plain members all qualify.
pub fn can_create_event(organization: &Organization, user_id: UserId) -> bool {
    has_capability(organization, user_id, OrganizationCapability::CreateEvent)
}

#[cfg(test)]
mod tests {
    use super::{
        can_create_event, has_capability, organization_role, role_label, OrganizationCapability,
        OrganizationRole,
    };
    use crate::model::organization::Organization;
    use uuid::Uuid;

    fn organization(creator: Uuid) -> Organization {
        Organization {
            id: Uuid::new_v4(),
            name: "Gardeners".to_string(),
            description: String::new(),
            is_public: true,
            creator,
            created_at: 1_700_000_000_000,
            admins: Vec::new(),
            members: Vec::new(),
        }
    }

    #[test]
    fn creator_is_authorized_without_listed_membership() {
        let creator = Uuid::new_v4();
        let org = organization(creator);
        assert_eq!(
            organization_role(&org, creator),
            Some(OrganizationRole::Creator)
        );
        assert!(can_create_event(&org, creator));
        assert!(has_capability(
            &org,
            creator,
            OrganizationCapability::ManageAdmins
        ));
    }

    #[test]
    fn members_may_create_events_but_not_manage_admins() {
        let member = Uuid::new_v4();
        let mut org = organization(Uuid::new_v4());
        org.members.push(member);

        assert_eq!(organization_role(&org, member), Some(OrganizationRole::Member));
        assert!(can_create_event(&org, member));
        assert!(!has_capability(
            &org,
            member,
            OrganizationCapability::ManageAdmins
        ));
    }

    #[test]
    fn admin_role_outranks_membership() {
        let admin = Uuid::new_v4();
        let mut org = organization(Uuid::new_v4());
        org.members.push(admin);
        org.admins.push(admin);

        assert_eq!(organization_role(&org, admin), Some(OrganizationRole::Admin));
        assert!(has_capability(
            &org,
            admin,
            OrganizationCapability::ManageAdmins
        ));
    }

    #[test]
    fn outsiders_hold_no_capability() {
        let org = organization(Uuid::new_v4());
        let outsider = Uuid::new_v4();
        assert_eq!(organization_role(&org, outsider), None);
        assert!(!can_create_event(&org, outsider));
    }

    #[test]
    fn diagnostic_labels_name_role_and_capability() {
        let creator = Uuid::new_v4();
        let admin = Uuid::new_v4();
        let member = Uuid::new_v4();
        let mut org = organization(creator);
        org.admins.push(admin);
        org.members.push(member);

        assert_eq!(role_label(&org, creator), "creator");
        assert_eq!(role_label(&org, admin), "admin");
        assert_eq!(role_label(&org, member), "member");
        assert_eq!(role_label(&org, Uuid::new_v4()), "none");
        assert_eq!(OrganizationCapability::CreateEvent.as_str(), "create_event");
        assert_eq!(OrganizationCapability::ManageAdmins.as_str(), "manage_admins");
    }
}
