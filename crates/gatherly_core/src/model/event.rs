//! Event domain model.
//!
//! # Responsibility
//! - Define the mutation payload (`CreateEventRequest`/`EventInput`).
//! - Define the event read model including participant projections.
//! - Validate scalar event fields before persistence.
//!
//! # Invariants
//! - `end_date >= start_date`; `end_time >= start_time` when both are set.
//! - `latitude` is within [-90, 90] and `longitude` within [-180, 180].
//! - A freshly built event lists its creator as the only admin and the
//!   only registrant.

use crate::model::organization::OrganizationId;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for an event.
pub type EventId = Uuid;

/// Repeat cadence of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recurrence {
    Once,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Recurrence {
    /// Storage encoding used by `events.recurrence`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "once" => Some(Self::Once),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

/// Role of a user inside an event participation relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Admin,
    Registrant,
}

impl ParticipantRole {
    /// Storage encoding used by `event_participants.role`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Registrant => "registrant",
        }
    }
}

/// Registration record pairing a user id with its user reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registrant {
    pub user_id: UserId,
    pub user: UserId,
}

impl Registrant {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            user: user_id,
        }
    }
}

/// Scalar fields supplied by the caller when creating an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    /// Target organization. Missing ids resolve as "organization not found".
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Unix epoch milliseconds.
    pub start_date: i64,
    /// Unix epoch milliseconds.
    pub end_date: i64,
    #[serde(default)]
    pub start_time: Option<i64>,
    #[serde(default)]
    pub end_time: Option<i64>,
    pub all_day: bool,
    pub recurring: bool,
    pub recurrence: Recurrence,
    pub is_public: bool,
    pub is_registerable: bool,
    #[serde(default)]
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// `createEvent` mutation arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateEventRequest {
    #[serde(default)]
    pub data: Option<EventInput>,
}

impl CreateEventRequest {
    pub fn new(data: EventInput) -> Self {
        Self { data: Some(data) }
    }

    /// Organization id named by the payload, if any.
    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.data.as_ref().and_then(|data| data.organization_id)
    }
}

/// Event read model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub start_date: i64,
    pub end_date: i64,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub all_day: bool,
    pub recurring: bool,
    pub recurrence: Recurrence,
    pub is_public: bool,
    pub is_registerable: bool,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub creator: UserId,
    pub organization: OrganizationId,
    pub admins: Vec<UserId>,
    pub registrants: Vec<Registrant>,
}

impl Event {
    /// Builds a new event owned by `organization` with a generated id.
    ///
    /// The creator is seeded as the only admin and registrant. The input's
    /// `organization_id` is ignored in favor of the resolved `organization`.
    pub fn from_input(creator: UserId, organization: OrganizationId, input: &EventInput) -> Self {
        Self::with_id(Uuid::new_v4(), creator, organization, input)
    }

    pub fn with_id(
        id: EventId,
        creator: UserId,
        organization: OrganizationId,
        input: &EventInput,
    ) -> Self {
        Self {
            id,
            title: input.title.clone(),
            description: input.description.clone(),
            start_date: input.start_date,
            end_date: input.end_date,
            start_time: input.start_time,
            end_time: input.end_time,
            all_day: input.all_day,
            recurring: input.recurring,
            recurrence: input.recurrence,
            is_public: input.is_public,
            is_registerable: input.is_registerable,
            location: input.location.clone(),
            latitude: input.latitude,
            longitude: input.longitude,
            creator,
            organization,
            admins: vec![creator],
            registrants: vec![Registrant::for_user(creator)],
        }
    }

    /// Validates scalar event fields.
    ///
    /// A title is blank when it holds only whitespace; stored titles are
    /// kept exactly as supplied.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.title.trim().is_empty() {
            return Err(EventValidationError::BlankTitle);
        }
        if self.end_date < self.start_date {
            return Err(EventValidationError::EndDateBeforeStart {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end < start {
                return Err(EventValidationError::EndTimeBeforeStart { start, end });
            }
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(EventValidationError::LatitudeOutOfRange(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(EventValidationError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }
}

/// Field-level validation failures for events.
#[derive(Debug, Clone, PartialEq)]
pub enum EventValidationError {
    BlankTitle,
    EndDateBeforeStart { start: i64, end: i64 },
    EndTimeBeforeStart { start: i64, end: i64 },
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "event title must not be blank"),
            Self::EndDateBeforeStart { start, end } => {
                write!(f, "event end date {end} is before start date {start}")
            }
            Self::EndTimeBeforeStart { start, end } => {
                write!(f, "event end time {end} is before start time {start}")
            }
            Self::LatitudeOutOfRange(value) => write!(f, "latitude {value} is out of range"),
            Self::LongitudeOutOfRange(value) => write!(f, "longitude {value} is out of range"),
        }
    }
}

impl Error for EventValidationError {}

#[cfg(test)]
mod tests {
    use super::{Event, EventInput, EventValidationError, Recurrence, Registrant};
    use uuid::Uuid;

    fn input() -> EventInput {
        EventInput {
            organization_id: None,
            title: "  Weekly sync ".to_string(),
            description: String::new(),
            start_date: 1_700_000_000_000,
            end_date: 1_700_000_360_000,
            start_time: None,
            end_time: None,
            all_day: false,
            recurring: true,
            recurrence: Recurrence::Weekly,
            is_public: true,
            is_registerable: true,
            location: "Hall".to_string(),
            latitude: 52.5,
            longitude: 13.4,
        }
    }

    #[test]
    fn from_input_seeds_creator_as_admin_and_registrant() {
        let creator = Uuid::new_v4();
        let organization = Uuid::new_v4();
        let event = Event::from_input(creator, organization, &input());

        assert_eq!(event.title, "  Weekly sync ");
        assert_eq!(event.creator, creator);
        assert_eq!(event.organization, organization);
        assert_eq!(event.admins, vec![creator]);
        assert_eq!(event.registrants, vec![Registrant::for_user(creator)]);
        event.validate().expect("valid input");
    }

    #[test]
    fn validate_rejects_inverted_ranges() {
        let mut data = input();
        data.end_date = data.start_date - 1;
        let event = Event::from_input(Uuid::new_v4(), Uuid::new_v4(), &data);
        assert!(matches!(
            event.validate(),
            Err(EventValidationError::EndDateBeforeStart { .. })
        ));

        let mut data = input();
        data.start_time = Some(10);
        data.end_time = Some(5);
        let event = Event::from_input(Uuid::new_v4(), Uuid::new_v4(), &data);
        assert_eq!(
            event.validate(),
            Err(EventValidationError::EndTimeBeforeStart { start: 10, end: 5 })
        );
    }

    #[test]
    fn validate_rejects_blank_title_and_bad_coordinates() {
        let mut data = input();
        data.title = "   ".to_string();
        let event = Event::from_input(Uuid::new_v4(), Uuid::new_v4(), &data);
        assert_eq!(event.validate(), Err(EventValidationError::BlankTitle));

        let mut data = input();
        data.latitude = 91.0;
        let event = Event::from_input(Uuid::new_v4(), Uuid::new_v4(), &data);
        assert_eq!(
            event.validate(),
            Err(EventValidationError::LatitudeOutOfRange(91.0))
        );

        let mut data = input();
        data.longitude = f64::NAN;
        let event = Event::from_input(Uuid::new_v4(), Uuid::new_v4(), &data);
        assert!(matches!(
            event.validate(),
            Err(EventValidationError::LongitudeOutOfRange(_))
        ));
    }

    #[test]
    fn recurrence_storage_encoding_round_trips() {
        for value in [
            Recurrence::Once,
            Recurrence::Daily,
            Recurrence::Weekly,
            Recurrence::Monthly,
            Recurrence::Yearly,
        ] {
            assert_eq!(Recurrence::parse(value.as_str()), Some(value));
        }
        assert_eq!(Recurrence::parse("DAILY"), None);
    }
}
