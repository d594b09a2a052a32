use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::employee::EmployeeId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl EventId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    In,
    Out,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            other => Err(format!("unknown event kind `{other}`")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Ok,
    OutOfZone,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::OutOfZone => "out_of_zone",
        }
    }
}

impl std::str::FromStr for EventStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ok" => Ok(Self::Ok),
            "out_of_zone" => Ok(Self::OutOfZone),
            other => Err(format!("unknown event status `{other}`")),
        }
    }
}

/// A single recorded check-in or check-out. Append-only: the core never
/// mutates or deletes events once written.
///
/// `recorded_at` is the server-local wall clock at creation time and `day` is
/// the server-local calendar date the event is scoped to. Both are fixed at
/// insertion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    pub id: EventId,
    pub employee_id: EmployeeId,
    pub kind: EventKind,
    pub day: NaiveDate,
    pub recorded_at: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub status: EventStatus,
}

/// Per-employee state for one calendar day, derived from the day's events.
/// `CheckedOut` is terminal for the day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayState {
    NoCheckIn,
    CheckedIn,
    CheckedOut,
}

/// One employee's events for a single day, ordered by `recorded_at`.
/// The state machine is recomputed from this list on every request; it is
/// never stored.
#[derive(Clone, Debug, Default)]
pub struct DayLog {
    events: Vec<AttendanceEvent>,
}

impl DayLog {
    pub fn new(mut events: Vec<AttendanceEvent>) -> Self {
        events.sort_by_key(|event| event.recorded_at);
        Self { events }
    }

    pub fn events(&self) -> &[AttendanceEvent] {
        &self.events
    }

    pub fn check_in(&self) -> Option<&AttendanceEvent> {
        self.events.iter().find(|event| event.kind == EventKind::In)
    }

    pub fn check_out(&self) -> Option<&AttendanceEvent> {
        self.events.iter().find(|event| event.kind == EventKind::Out)
    }

    pub fn state(&self) -> DayState {
        if self.check_out().is_some() {
            DayState::CheckedOut
        } else if self.check_in().is_some() {
            DayState::CheckedIn
        } else {
            DayState::NoCheckIn
        }
    }
}
