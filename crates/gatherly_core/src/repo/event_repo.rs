//! Event repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist event scalar columns.
//! - Own the `event_participants` relation (admin/registrant rows).
//!
//! # Invariants
//! - `insert_event` commits the `events` row together with the event's
//!   admin and registrant links, or writes nothing.
//! - Participant lists are returned in link order.

use super::sql::{
    bool_to_int, ensure_schema_ready, int_to_bool, is_unique_violation, load_uuid_list,
    parse_uuid, record_exists,
};
use super::{RecordKind, RepoError, RepoResult};
use crate::model::event::{Event, EventId, ParticipantRole, Recurrence, Registrant};
use crate::model::organization::OrganizationId;
use crate::model::user::UserId;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const EVENT_SELECT_SQL: &str = "SELECT
    uuid,
    organization_uuid,
    creator_uuid,
    title,
    description,
    location,
    latitude,
    longitude,
    start_date,
    end_date,
    start_time,
    end_time,
    all_day,
    recurring,
    recurrence,
    is_public,
    is_registerable
FROM events";

const EVENT_ADMINS_SQL: &str = "SELECT user_uuid
     FROM event_participants
     WHERE event_uuid = ?1 AND role = 'admin'
     ORDER BY id ASC;";
const EVENT_REGISTRANTS_SQL: &str = "SELECT user_uuid
     FROM event_participants
     WHERE event_uuid = ?1 AND role = 'registrant'
     ORDER BY id ASC;";

/// Repository interface for events and their participant relation.
pub trait EventRepository {
    /// Inserts the event row and links `admins`/`registrants` in one
    /// transaction.
    fn insert_event(&self, event: &Event) -> RepoResult<EventId>;
    /// Links a user to an event. Returns `false` when already linked.
    fn link_participant(
        &self,
        event_id: EventId,
        user_id: UserId,
        role: ParticipantRole,
    ) -> RepoResult<bool>;
    /// Loads one event with its participant lists.
    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>>;
    /// Lists events owned by an organization in creation order.
    fn list_events_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> RepoResult<Vec<Event>>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn insert_event(&self, event: &Event) -> RepoResult<EventId> {
        event.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        insert_event_row(&tx, event)?;
        for admin in &event.admins {
            insert_participant(&tx, event.id, *admin, ParticipantRole::Admin)?;
        }
        for registrant in &event.registrants {
            insert_participant(
                &tx,
                event.id,
                registrant.user_id,
                ParticipantRole::Registrant,
            )?;
        }
        tx.commit()?;

        Ok(event.id)
    }

    fn link_participant(
        &self,
        event_id: EventId,
        user_id: UserId,
        role: ParticipantRole,
    ) -> RepoResult<bool> {
        insert_participant(self.conn, event_id, user_id, role)
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let event = parse_event_row(row)?;
            return Ok(Some(load_participants(self.conn, event)?));
        }
        Ok(None)
    }

    fn list_events_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> RepoResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVENT_SELECT_SQL}
             WHERE organization_uuid = ?1
             ORDER BY rowid ASC;"
        ))?;
        let mut rows = stmt.query([organization_id.to_string()])?;

        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }
        events
            .into_iter()
            .map(|event| load_participants(self.conn, event))
            .collect()
    }
}

fn insert_event_row(conn: &Connection, event: &Event) -> RepoResult<()> {
    let inserted = conn.execute(
        "INSERT INTO events (
            uuid,
            organization_uuid,
            creator_uuid,
            title,
            description,
            location,
            latitude,
            longitude,
            start_date,
            end_date,
            start_time,
            end_time,
            all_day,
            recurring,
            recurrence,
            is_public,
            is_registerable
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17);",
        params![
            event.id.to_string(),
            event.organization.to_string(),
            event.creator.to_string(),
            event.title.as_str(),
            event.description.as_str(),
            event.location.as_str(),
            event.latitude,
            event.longitude,
            event.start_date,
            event.end_date,
            event.start_time,
            event.end_time,
            bool_to_int(event.all_day),
            bool_to_int(event.recurring),
            event.recurrence.as_str(),
            bool_to_int(event.is_public),
            bool_to_int(event.is_registerable),
        ],
    );
    match inserted {
        Ok(_) => Ok(()),
        Err(err) if is_unique_violation(&err) => Err(RepoError::Conflict(format!(
            "event id already exists: {}",
            event.id
        ))),
        Err(err) => Err(err.into()),
    }
}

fn insert_participant(
    conn: &Connection,
    event_id: EventId,
    user_id: UserId,
    role: ParticipantRole,
) -> RepoResult<bool> {
    if !record_exists(conn, "events", event_id)? {
        return Err(RepoError::not_found(RecordKind::Event, event_id));
    }
    if !record_exists(conn, "users", user_id)? {
        return Err(RepoError::not_found(RecordKind::User, user_id));
    }

    // Why: the (event, user, role) unique key turns a repeated link into a
    // no-op; callers learn about it from the `false` return.
    let changed = conn.execute(
        "INSERT OR IGNORE INTO event_participants (
            event_uuid,
            user_uuid,
            role
        ) VALUES (?1, ?2, ?3);",
        params![event_id.to_string(), user_id.to_string(), role.as_str()],
    )?;
    Ok(changed == 1)
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<Event> {
    let uuid_text: String = row.get("uuid")?;
    let organization_text: String = row.get("organization_uuid")?;
    let creator_text: String = row.get("creator_uuid")?;

    let recurrence_text: String = row.get("recurrence")?;
    let recurrence = Recurrence::parse(&recurrence_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid recurrence `{recurrence_text}` in events.recurrence"
        ))
    })?;

    let event = Event {
        id: parse_uuid(&uuid_text, "events.uuid")?,
        title: row.get("title")?,
        description: row.get("description")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        start_time: row.get("start_time")?,
        end_time: row.get("end_time")?,
        all_day: int_to_bool(row.get("all_day")?, "events.all_day")?,
        recurring: int_to_bool(row.get("recurring")?, "events.recurring")?,
        recurrence,
        is_public: int_to_bool(row.get("is_public")?, "events.is_public")?,
        is_registerable: int_to_bool(row.get("is_registerable")?, "events.is_registerable")?,
        location: row.get("location")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        creator: parse_uuid(&creator_text, "events.creator_uuid")?,
        organization: parse_uuid(&organization_text, "events.organization_uuid")?,
        admins: Vec::new(),
        registrants: Vec::new(),
    };
    // Why: rows written outside this repository may break field rules;
    // surface them as corrupt data rather than returning an invalid event.
    event
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("event {}: {err}", event.id)))?;
    Ok(event)
}

fn load_participants(conn: &Connection, mut event: Event) -> RepoResult<Event> {
    event.admins = load_uuid_list(
        conn,
        EVENT_ADMINS_SQL,
        event.id,
        "event_participants.user_uuid",
    )?;
    event.registrants = load_uuid_list(
        conn,
        EVENT_REGISTRANTS_SQL,
        event.id,
        "event_participants.user_uuid",
    )?
    .into_iter()
    .map(Registrant::for_user)
    .collect();
    Ok(event)
}
