use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::domain::employee::{Employee, EmployeeId};
use crate::domain::event::{AttendanceEvent, EventKind, EventStatus};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// An event of the same kind already exists for this employee and day.
    /// Callers treat this as a normal decision branch, not a failure.
    #[error("event already recorded for this employee and day")]
    Conflict,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Payload for appending one attendance event. The caller fixes the clock
/// so that the day scoping stays consistent with the rest of the request.
#[derive(Clone, Debug, PartialEq)]
pub struct NewEvent {
    pub employee_id: EmployeeId,
    pub kind: EventKind,
    pub day: NaiveDate,
    pub recorded_at: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub status: EventStatus,
}

/// Data-access collaborator for the attendance resolver.
///
/// Implementations must guarantee that two concurrent `add_event` calls for
/// the same `(employee, day, kind)` cannot both succeed; the loser gets
/// `StoreError::Conflict`.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Events for one employee on one day, ordered by `recorded_at` ascending.
    async fn today_events(
        &self,
        employee: &EmployeeId,
        day: NaiveDate,
    ) -> Result<Vec<AttendanceEvent>, StoreError>;

    async fn add_event(&self, event: NewEvent) -> Result<AttendanceEvent, StoreError>;

    async fn find_employee(&self, id: &EmployeeId) -> Result<Option<Employee>, StoreError>;

    /// Sync-on-contact upsert keyed by the platform user id.
    async fn upsert_employee(
        &self,
        id: &EmployeeId,
        display_name: &str,
        email: &str,
    ) -> Result<(), StoreError>;
}
