use gatherly_core::db::open_db_in_memory;
use gatherly_core::{
    CreateEventRequest, Event, EventInput, EventRepository, EventService, EventServiceError,
    NewOrganization, NewUser, Organization, OrganizationService, ParticipantRole, RecordKind,
    Recurrence, Registrant, RepoError, SqliteEventRepository, SqliteOrganizationRepository,
    SqliteUserRepository, User, UserService, INVALID_INPUT, ORGANIZATION_NOT_AUTHORIZED,
    ORGANIZATION_NOT_FOUND, USER_NOT_FOUND,
};
use rusqlite::Connection;
use uuid::Uuid;

type SqliteEventService<'conn> = EventService<
    SqliteUserRepository<'conn>,
    SqliteOrganizationRepository<'conn>,
    SqliteEventRepository<'conn>,
>;

fn event_service(conn: &Connection) -> SqliteEventService<'_> {
    EventService::new(
        SqliteUserRepository::try_new(conn).unwrap(),
        SqliteOrganizationRepository::try_new(conn).unwrap(),
        SqliteEventRepository::try_new(conn).unwrap(),
    )
}

fn organization_service(
    conn: &Connection,
) -> OrganizationService<SqliteUserRepository<'_>, SqliteOrganizationRepository<'_>> {
    OrganizationService::new(
        SqliteUserRepository::try_new(conn).unwrap(),
        SqliteOrganizationRepository::try_new(conn).unwrap(),
    )
}

fn register(conn: &Connection, email: &str) -> User {
    UserService::new(SqliteUserRepository::try_new(conn).unwrap())
        .register_user(&NewUser::new(email, "firstName", "lastName"))
        .unwrap()
}

fn load_user(conn: &Connection, user: &User) -> User {
    UserService::new(SqliteUserRepository::try_new(conn).unwrap())
        .get_user(user.id)
        .unwrap()
        .unwrap()
}

fn create_organization(conn: &Connection, creator: &User, is_public: bool) -> Organization {
    organization_service(conn)
        .create_organization(
            creator.id,
            &NewOrganization {
                name: "name".to_string(),
                description: "description".to_string(),
                is_public,
            },
        )
        .unwrap()
}

fn event_input(organization_id: Option<Uuid>) -> EventInput {
    EventInput {
        organization_id,
        title: "newTitle".to_string(),
        description: "newDescription".to_string(),
        start_date: 1_767_225_600_000,
        end_date: 1_767_232_800_000,
        start_time: Some(1_767_225_600_000),
        end_time: Some(1_767_232_800_000),
        all_day: false,
        recurring: false,
        recurrence: Recurrence::Daily,
        is_public: false,
        is_registerable: false,
        location: "newLocation".to_string(),
        latitude: 1.0,
        longitude: 1.0,
    }
}

fn event_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM events;", [], |row| row.get(0))
        .unwrap()
}

fn participant_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM event_participants;", [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn unknown_requester_fails_with_user_not_found_for_any_payload() {
    let conn = open_db_in_memory().unwrap();
    let creator = register(&conn, "creator@example.com");
    let organization = create_organization(&conn, &creator, true);
    let service = event_service(&conn);

    for request in [
        CreateEventRequest::default(),
        CreateEventRequest::new(event_input(None)),
        CreateEventRequest::new(event_input(Some(organization.id))),
    ] {
        let err = service.create_event(Uuid::new_v4(), &request).unwrap_err();
        assert!(matches!(err, EventServiceError::UserNotFound(_)));
        assert_eq!(err.code(), USER_NOT_FOUND);
    }
    assert_eq!(event_count(&conn), 0);
}

#[test]
fn missing_payload_or_organization_id_fails_with_organization_not_found() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn, "user@example.com");
    let service = event_service(&conn);

    let err = service
        .create_event(user.id, &CreateEventRequest::default())
        .unwrap_err();
    assert!(matches!(err, EventServiceError::OrganizationNotFound(None)));

    let err = service
        .create_event(user.id, &CreateEventRequest::new(event_input(None)))
        .unwrap_err();
    assert_eq!(err.code(), ORGANIZATION_NOT_FOUND);
}

#[test]
fn unknown_organization_fails_with_organization_not_found() {
    let conn = open_db_in_memory().unwrap();
    let user = register(&conn, "user@example.com");
    let missing = Uuid::new_v4();

    let err = event_service(&conn)
        .create_event(user.id, &CreateEventRequest::new(event_input(Some(missing))))
        .unwrap_err();
    assert!(matches!(err, EventServiceError::OrganizationNotFound(Some(id)) if id == missing));
    assert_eq!(err.code(), ORGANIZATION_NOT_FOUND);
    assert_eq!(event_count(&conn), 0);
}

#[test]
fn outsider_fails_with_organization_not_authorized_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let creator = register(&conn, "creator@example.com");
    let outsider = register(&conn, "outsider@example.com");
    let organization = create_organization(&conn, &creator, true);

    let err = event_service(&conn)
        .create_event(
            outsider.id,
            &CreateEventRequest::new(event_input(Some(organization.id))),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        EventServiceError::OrganizationNotAuthorized { organization_id, user_id }
            if organization_id == organization.id && user_id == outsider.id
    ));
    assert_eq!(err.code(), ORGANIZATION_NOT_AUTHORIZED);
    assert_eq!(event_count(&conn), 0);
    assert_eq!(participant_count(&conn), 0);
    assert!(load_user(&conn, &outsider).created_events.is_empty());
}

#[test]
fn creator_creates_event_and_gains_back_references() {
    let conn = open_db_in_memory().unwrap();
    let creator = register(&conn, "creator@example.com");
    let organization = create_organization(&conn, &creator, true);

    let event = event_service(&conn)
        .create_event(
            creator.id,
            &CreateEventRequest::new(event_input(Some(organization.id))),
        )
        .unwrap();

    assert_eq!(event.title, "newTitle");
    assert_eq!(event.description, "newDescription");
    assert_eq!(event.location, "newLocation");
    assert!(!event.all_day);
    assert!(!event.recurring);
    assert!(!event.is_public);
    assert!(!event.is_registerable);
    assert_eq!(event.latitude, 1.0);
    assert_eq!(event.longitude, 1.0);
    assert_eq!(event.recurrence, Recurrence::Daily);
    assert_eq!(event.creator, creator.id);
    assert_eq!(event.organization, organization.id);
    assert_eq!(event.admins, vec![creator.id]);
    assert_eq!(event.registrants, vec![Registrant::for_user(creator.id)]);
    assert_eq!(event.registrants[0].user_id, creator.id);
    assert_eq!(event.registrants[0].user, creator.id);

    let reloaded = load_user(&conn, &creator);
    assert_eq!(reloaded.created_events, vec![event.id]);
    assert_eq!(reloaded.registered_events, vec![event.id]);
    assert_eq!(reloaded.event_admin, vec![event.id]);
}

#[test]
fn plain_member_may_create_events() {
    let conn = open_db_in_memory().unwrap();
    let creator = register(&conn, "creator@example.com");
    let member = register(&conn, "member@example.com");
    let organization = create_organization(&conn, &creator, true);
    organization_service(&conn)
        .join_organization(member.id, organization.id)
        .unwrap();

    let event = event_service(&conn)
        .create_event(
            member.id,
            &CreateEventRequest::new(event_input(Some(organization.id))),
        )
        .unwrap();

    assert_eq!(event.creator, member.id);
    assert_eq!(event.admins, vec![member.id]);
    assert_eq!(load_user(&conn, &member).created_events, vec![event.id]);
    assert!(load_user(&conn, &creator).created_events.is_empty());
}

#[test]
fn event_creation_does_not_mutate_the_organization() {
    let conn = open_db_in_memory().unwrap();
    let creator = register(&conn, "creator@example.com");
    let organization = create_organization(&conn, &creator, false);

    event_service(&conn)
        .create_event(
            creator.id,
            &CreateEventRequest::new(event_input(Some(organization.id))),
        )
        .unwrap();

    let after = organization_service(&conn)
        .get_organization(organization.id)
        .unwrap()
        .unwrap();
    assert_eq!(after, organization);
}

#[test]
fn repeated_identical_requests_create_distinct_events() {
    let conn = open_db_in_memory().unwrap();
    let creator = register(&conn, "creator@example.com");
    let organization = create_organization(&conn, &creator, true);
    let service = event_service(&conn);
    let request = CreateEventRequest::new(event_input(Some(organization.id)));

    let first = service.create_event(creator.id, &request).unwrap();
    let second = service.create_event(creator.id, &request).unwrap();
    assert_ne!(first.id, second.id);

    let reloaded = load_user(&conn, &creator);
    for list in [
        &reloaded.created_events,
        &reloaded.registered_events,
        &reloaded.event_admin,
    ] {
        assert_eq!(list, &vec![first.id, second.id]);
    }

    let listed = service.list_organization_events(organization.id).unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|event| event.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[test]
fn invalid_fields_are_rejected_after_authorization_without_writes() {
    let conn = open_db_in_memory().unwrap();
    let creator = register(&conn, "creator@example.com");
    let organization = create_organization(&conn, &creator, true);

    let mut data = event_input(Some(organization.id));
    data.title = "   ".to_string();
    let err = event_service(&conn)
        .create_event(creator.id, &CreateEventRequest::new(data))
        .unwrap_err();
    assert!(matches!(err, EventServiceError::Validation(_)));
    assert_eq!(err.code(), INVALID_INPUT);

    let outsider = register(&conn, "outsider@example.com");
    let mut data = event_input(Some(organization.id));
    data.end_date = data.start_date - 1;
    let err = event_service(&conn)
        .create_event(outsider.id, &CreateEventRequest::new(data))
        .unwrap_err();
    assert_eq!(err.code(), ORGANIZATION_NOT_AUTHORIZED);

    assert_eq!(event_count(&conn), 0);
    assert_eq!(participant_count(&conn), 0);
}

#[test]
fn get_event_and_listing_for_unknown_organization() {
    let conn = open_db_in_memory().unwrap();
    let creator = register(&conn, "creator@example.com");
    let organization = create_organization(&conn, &creator, true);
    let service = event_service(&conn);

    let created = service
        .create_event(
            creator.id,
            &CreateEventRequest::new(event_input(Some(organization.id))),
        )
        .unwrap();
    assert_eq!(service.get_event(created.id).unwrap(), Some(created));
    assert_eq!(service.get_event(Uuid::new_v4()).unwrap(), None);

    let err = service
        .list_organization_events(Uuid::new_v4())
        .unwrap_err();
    assert_eq!(err.code(), ORGANIZATION_NOT_FOUND);
}

#[test]
fn created_event_serializes_with_camel_case_fields() {
    let conn = open_db_in_memory().unwrap();
    let creator = register(&conn, "creator@example.com");
    let organization = create_organization(&conn, &creator, true);

    let event = event_service(&conn)
        .create_event(
            creator.id,
            &CreateEventRequest::new(event_input(Some(organization.id))),
        )
        .unwrap();
    let json = serde_json::to_value(&event).unwrap();

    let creator_text = creator.id.to_string();
    assert_eq!(json["recurrence"], "DAILY");
    assert_eq!(json["isRegisterable"], false);
    assert_eq!(json["creator"], creator_text.as_str());
    assert_eq!(json["organization"], organization.id.to_string().as_str());
    assert_eq!(json["registrants"][0]["userId"], creator_text.as_str());
    assert_eq!(json["registrants"][0]["user"], creator_text.as_str());
    assert_eq!(json["admins"][0], creator_text.as_str());
}

#[test]
fn request_payload_deserializes_with_optional_parts() {
    let empty: CreateEventRequest = serde_json::from_str("{}").unwrap();
    assert!(empty.data.is_none());

    let organization_id = Uuid::new_v4();
    let payload = format!(
        r#"{{
            "data": {{
                "organizationId": "{organization_id}",
                "title": "Cleanup",
                "startDate": 1,
                "endDate": 2,
                "allDay": true,
                "recurring": false,
                "recurrence": "WEEKLY",
                "isPublic": true,
                "isRegisterable": true,
                "latitude": 0.0,
                "longitude": 0.0
            }}
        }}"#
    );
    let request: CreateEventRequest = serde_json::from_str(&payload).unwrap();
    assert_eq!(request.organization_id(), Some(organization_id));
    let data = request.data.unwrap();
    assert_eq!(data.recurrence, Recurrence::Weekly);
    assert_eq!(data.start_time, None);
    assert_eq!(data.location, "");
}

#[test]
fn title_is_stored_exactly_as_supplied() {
    let conn = open_db_in_memory().unwrap();
    let creator = register(&conn, "creator@example.com");
    let organization = create_organization(&conn, &creator, true);
    let mut input = event_input(Some(organization.id));
    input.title = "  Spring cleanup ".to_string();

    let created = event_service(&conn)
        .create_event(creator.id, &CreateEventRequest::new(input))
        .unwrap();

    assert_eq!(created.title, "  Spring cleanup ");
}

#[test]
fn failed_participant_link_leaves_no_event_row() {
    let conn = open_db_in_memory().unwrap();
    let creator = register(&conn, "creator@example.com");
    let organization = create_organization(&conn, &creator, true);
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let missing = Uuid::new_v4();
    let mut event = Event::from_input(
        creator.id,
        organization.id,
        &event_input(Some(organization.id)),
    );
    event.registrants.push(Registrant::for_user(missing));

    let err = repo.insert_event(&event).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: RecordKind::User, id } if id == missing
    ));
    assert_eq!(event_count(&conn), 0);
    assert_eq!(participant_count(&conn), 0);
    assert!(repo.get_event(event.id).unwrap().is_none());
}

#[test]
fn repository_insert_links_participants_once() {
    let conn = open_db_in_memory().unwrap();
    let creator = register(&conn, "creator@example.com");
    let organization = create_organization(&conn, &creator, true);
    let repo = SqliteEventRepository::try_new(&conn).unwrap();
    let event = Event::from_input(
        creator.id,
        organization.id,
        &event_input(Some(organization.id)),
    );

    repo.insert_event(&event).unwrap();
    assert_eq!(participant_count(&conn), 2);

    let relinked = repo
        .link_participant(event.id, creator.id, ParticipantRole::Admin)
        .unwrap();
    assert!(!relinked);
    assert_eq!(repo.get_event(event.id).unwrap(), Some(event));
}
