//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist registered users and load them with relation projections.
//!
//! # Invariants
//! - Emails are normalized before insert and lookup.
//! - Projection lists keep relation insertion order.

use super::sql::{ensure_schema_ready, is_unique_violation, load_uuid_list, parse_uuid};
use super::{RecordKind, RepoError, RepoResult};
use crate::model::user::{NewUser, User, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT
    uuid,
    email,
    first_name,
    last_name,
    app_language_code,
    created_at
FROM users";

const CREATED_ORGANIZATIONS_SQL: &str =
    "SELECT uuid FROM organizations WHERE creator_uuid = ?1 ORDER BY rowid ASC;";
const JOINED_ORGANIZATIONS_SQL: &str = "SELECT organization_uuid
     FROM organization_members
     WHERE user_uuid = ?1 AND role = 'member'
     ORDER BY id ASC;";
const ADMIN_FOR_SQL: &str = "SELECT organization_uuid
     FROM organization_members
     WHERE user_uuid = ?1 AND role = 'admin'
     ORDER BY id ASC;";
const CREATED_EVENTS_SQL: &str =
    "SELECT uuid FROM events WHERE creator_uuid = ?1 ORDER BY rowid ASC;";
const REGISTERED_EVENTS_SQL: &str = "SELECT event_uuid
     FROM event_participants
     WHERE user_uuid = ?1 AND role = 'registrant'
     ORDER BY id ASC;";
const EVENT_ADMIN_SQL: &str = "SELECT event_uuid
     FROM event_participants
     WHERE user_uuid = ?1 AND role = 'admin'
     ORDER BY id ASC;";

/// Repository interface for user records.
pub trait UserRepository {
    /// Normalizes, validates and inserts a user, returning the stored record.
    fn create_user(&self, user: &NewUser) -> RepoResult<User>;
    /// Loads one user with all relation projections.
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Loads one user by (normalized) email.
    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser) -> RepoResult<User> {
        let user = user.normalized();
        user.validate()?;

        let id = Uuid::new_v4();
        let inserted = self.conn.execute(
            "INSERT INTO users (
                uuid,
                email,
                first_name,
                last_name,
                app_language_code
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id.to_string(),
                user.email.as_str(),
                user.first_name.as_str(),
                user.last_name.as_str(),
                user.app_language_code.as_deref(),
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                return Err(RepoError::Conflict("email already registered".to_string()));
            }
            Err(err) => return Err(err.into()),
        }

        self.get_user(id)?
            .ok_or(RepoError::not_found(RecordKind::User, id))
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let row = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                read_user_columns,
            )
            .optional()?;
        row.map(|columns| hydrate_user(self.conn, columns))
            .transpose()
    }

    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let normalized = email.trim().to_lowercase();
        let row = self
            .conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE email = ?1;"),
                [normalized],
                read_user_columns,
            )
            .optional()?;
        row.map(|columns| hydrate_user(self.conn, columns))
            .transpose()
    }
}

struct UserColumns {
    uuid: String,
    email: String,
    first_name: String,
    last_name: String,
    app_language_code: String,
    created_at: i64,
}

fn read_user_columns(row: &Row<'_>) -> rusqlite::Result<UserColumns> {
    Ok(UserColumns {
        uuid: row.get("uuid")?,
        email: row.get("email")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        app_language_code: row.get("app_language_code")?,
        created_at: row.get("created_at")?,
    })
}

fn hydrate_user(conn: &Connection, columns: UserColumns) -> RepoResult<User> {
    let id = parse_uuid(&columns.uuid, "users.uuid")?;
    Ok(User {
        id,
        email: columns.email,
        first_name: columns.first_name,
        last_name: columns.last_name,
        app_language_code: columns.app_language_code,
        created_at: columns.created_at,
        created_organizations: load_uuid_list(
            conn,
            CREATED_ORGANIZATIONS_SQL,
            id,
            "organizations.uuid",
        )?,
        joined_organizations: load_uuid_list(
            conn,
            JOINED_ORGANIZATIONS_SQL,
            id,
            "organization_members.organization_uuid",
        )?,
        admin_for: load_uuid_list(
            conn,
            ADMIN_FOR_SQL,
            id,
            "organization_members.organization_uuid",
        )?,
        created_events: load_uuid_list(conn, CREATED_EVENTS_SQL, id, "events.uuid")?,
        registered_events: load_uuid_list(
            conn,
            REGISTERED_EVENTS_SQL,
            id,
            "event_participants.event_uuid",
        )?,
        event_admin: load_uuid_list(
            conn,
            EVENT_ADMIN_SQL,
            id,
            "event_participants.event_uuid",
        )?,
    })
}
