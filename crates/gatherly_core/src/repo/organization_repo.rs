//! Organization repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist organizations together with their creator's initial roles.
//! - Own the `organization_members` relation (member/admin rows).
//!
//! # Invariants
//! - Organization insert and creator role rows commit in one transaction.
//! - A (organization, user, role) pair is stored at most once.

use super::sql::{
    bool_to_int, ensure_schema_ready, int_to_bool, load_uuid_list, parse_uuid, record_exists,
};
use super::{RecordKind, RepoError, RepoResult};
use crate::model::organization::{MembershipRole, NewOrganization, Organization, OrganizationId};
use crate::model::user::UserId;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use uuid::Uuid;

const ORGANIZATION_ADMINS_SQL: &str = "SELECT user_uuid
     FROM organization_members
     WHERE organization_uuid = ?1 AND role = 'admin'
     ORDER BY id ASC;";
const ORGANIZATION_MEMBERS_SQL: &str = "SELECT user_uuid
     FROM organization_members
     WHERE organization_uuid = ?1 AND role = 'member'
     ORDER BY id ASC;";

/// Repository interface for organizations and their membership relation.
pub trait OrganizationRepository {
    /// Inserts an organization; `creator` is recorded as admin and member.
    fn create_organization(
        &self,
        creator: UserId,
        organization: &NewOrganization,
    ) -> RepoResult<Organization>;
    /// Loads one organization with its admin and member lists.
    fn get_organization(&self, id: OrganizationId) -> RepoResult<Option<Organization>>;
    /// Adds one membership row. Returns `false` when the pair already existed.
    fn add_member(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
        role: MembershipRole,
    ) -> RepoResult<bool>;
}

/// SQLite-backed organization repository.
pub struct SqliteOrganizationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOrganizationRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl OrganizationRepository for SqliteOrganizationRepository<'_> {
    fn create_organization(
        &self,
        creator: UserId,
        organization: &NewOrganization,
    ) -> RepoResult<Organization> {
        organization.validate()?;

        let id = Uuid::new_v4();
        // Why: the creator's `admin_for`/`joined_organizations` projections
        // come from these rows, so they must commit with the organization.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !record_exists(&tx, "users", creator)? {
            return Err(RepoError::not_found(RecordKind::User, creator));
        }

        tx.execute(
            "INSERT INTO organizations (
                uuid,
                name,
                description,
                is_public,
                creator_uuid
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id.to_string(),
                organization.name.trim(),
                organization.description.as_str(),
                bool_to_int(organization.is_public),
                creator.to_string(),
            ],
        )?;
        for role in [MembershipRole::Admin, MembershipRole::Member] {
            insert_membership(&tx, id, creator, role)?;
        }
        tx.commit()?;

        self.get_organization(id)?
            .ok_or(RepoError::not_found(RecordKind::Organization, id))
    }

    fn get_organization(&self, id: OrganizationId) -> RepoResult<Option<Organization>> {
        let row = self
            .conn
            .query_row(
                "SELECT uuid, name, description, is_public, creator_uuid, created_at
                 FROM organizations
                 WHERE uuid = ?1;",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>("uuid")?,
                        row.get::<_, String>("name")?,
                        row.get::<_, String>("description")?,
                        row.get::<_, i64>("is_public")?,
                        row.get::<_, String>("creator_uuid")?,
                        row.get::<_, i64>("created_at")?,
                    ))
                },
            )
            .optional()?;

        let Some((uuid, name, description, is_public, creator, created_at)) = row else {
            return Ok(None);
        };
        let id = parse_uuid(&uuid, "organizations.uuid")?;

        Ok(Some(Organization {
            id,
            name,
            description,
            is_public: int_to_bool(is_public, "organizations.is_public")?,
            creator: parse_uuid(&creator, "organizations.creator_uuid")?,
            created_at,
            admins: load_uuid_list(
                self.conn,
                ORGANIZATION_ADMINS_SQL,
                id,
                "organization_members.user_uuid",
            )?,
            members: load_uuid_list(
                self.conn,
                ORGANIZATION_MEMBERS_SQL,
                id,
                "organization_members.user_uuid",
            )?,
        }))
    }

    fn add_member(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
        role: MembershipRole,
    ) -> RepoResult<bool> {
        if !record_exists(self.conn, "organizations", organization_id)? {
            return Err(RepoError::not_found(
                RecordKind::Organization,
                organization_id,
            ));
        }
        if !record_exists(self.conn, "users", user_id)? {
            return Err(RepoError::not_found(RecordKind::User, user_id));
        }
        insert_membership(self.conn, organization_id, user_id, role)
    }
}

fn insert_membership(
    conn: &Connection,
    organization_id: OrganizationId,
    user_id: UserId,
    role: MembershipRole,
) -> RepoResult<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO organization_members (
            organization_uuid,
            user_uuid,
            role
        ) VALUES (?1, ?2, ?3);",
        params![
            organization_id.to_string(),
            user_id.to_string(),
            role.as_str()
        ],
    )?;
    Ok(changed == 1)
}
