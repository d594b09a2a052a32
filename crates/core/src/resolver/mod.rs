//! Attendance state resolver: turns one normalized inbound event into at
//! most one persisted attendance event and exactly one reply.
//!
//! The per-day state machine (`NoCheckIn → CheckedIn → CheckedOut`) is
//! derived from the day's event list on every call; nothing is cached
//! between requests.

pub mod command;
pub mod replies;

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use thiserror::Error;
use tracing::warn;

use crate::domain::employee::EmployeeId;
use crate::domain::event::{AttendanceEvent, DayLog, EventKind, EventStatus};
use crate::geo::{Coordinate, Geofence};
use crate::store::{AttendanceStore, NewEvent, StoreError};

use command::BotCommand;
use replies::Reply;

/// Normalized inbound message, independent of which chat backend delivered
/// it. Adapters fill this in from their native webhook payloads.
#[derive(Clone, Debug, PartialEq)]
pub struct InboundEvent {
    pub user_id: EmployeeId,
    pub dialog_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub text: Option<String>,
    pub location: Option<(f64, f64)>,
}

/// Outcome of one resolution: the reply to deliver and the event that was
/// persisted, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    pub reply: Reply,
    pub recorded: Option<AttendanceEvent>,
}

impl Decision {
    fn reply_only(reply: Reply) -> Self {
        Self { reply, recorded: None }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("attendance store failure: {0}")]
    Store(#[from] StoreError),
}

pub struct AttendanceResolver {
    geofence: Geofence,
    store: Arc<dyn AttendanceStore>,
}

impl AttendanceResolver {
    pub fn new(geofence: Geofence, store: Arc<dyn AttendanceStore>) -> Self {
        Self { geofence, store }
    }

    pub async fn resolve(&self, inbound: &InboundEvent) -> Result<Decision, ResolveError> {
        self.resolve_at(inbound, Local::now().naive_local()).await
    }

    /// Resolution against an explicit wall clock. `now` fixes both the
    /// calendar day the request is scoped to and the recorded timestamp.
    pub async fn resolve_at(
        &self,
        inbound: &InboundEvent,
        now: NaiveDateTime,
    ) -> Result<Decision, ResolveError> {
        self.sync_employee(inbound).await;

        let day = now.date();
        let events = self.store.today_events(&inbound.user_id, day).await?;
        let log = DayLog::new(events);

        if let Some((latitude, longitude)) = inbound.location {
            return self.resolve_location(inbound, &log, latitude, longitude, now).await;
        }

        if let Some(text) = inbound.text.as_deref() {
            if !text.trim().is_empty() {
                return Ok(self.resolve_command(text, &log));
            }
        }

        Ok(Decision::reply_only(replies::ready()))
    }

    /// Sync-on-contact. A failure here degrades to the placeholder employee
    /// record and must never block command processing.
    async fn sync_employee(&self, inbound: &InboundEvent) {
        let display_name = inbound.display_name.as_deref().unwrap_or("сотрудник");
        let email = inbound.email.as_deref().unwrap_or("");

        if let Err(error) =
            self.store.upsert_employee(&inbound.user_id, display_name, email).await
        {
            warn!(
                event_name = "resolver.employee_sync.degraded",
                user_id = %inbound.user_id,
                dialog_id = %inbound.dialog_id,
                error = %error,
                "employee sync failed, continuing with placeholder record"
            );
        }
    }

    async fn resolve_location(
        &self,
        inbound: &InboundEvent,
        log: &DayLog,
        latitude: f64,
        longitude: f64,
        now: NaiveDateTime,
    ) -> Result<Decision, ResolveError> {
        // Validation failures never reach the store.
        let point = match Coordinate::new(latitude, longitude) {
            Ok(point) => point,
            Err(_) => return Ok(Decision::reply_only(replies::invalid_location())),
        };

        match (log.check_in().is_some(), log.check_out().is_some()) {
            (true, true) => Ok(Decision::reply_only(replies::day_complete())),
            (false, _) => self.record_check_in(inbound, point, now).await,
            (true, false) => self.record_check_out(inbound, point, now).await,
        }
    }

    async fn record_check_in(
        &self,
        inbound: &InboundEvent,
        point: Coordinate,
        now: NaiveDateTime,
    ) -> Result<Decision, ResolveError> {
        if !self.geofence.contains(point) {
            // Check-in outside the geofence records nothing.
            return Ok(Decision::reply_only(replies::check_in_out_of_zone()));
        }

        match self.append(inbound, EventKind::In, point, EventStatus::Ok, now).await {
            Ok(event) => {
                let reply = replies::check_in_recorded(event.recorded_at);
                Ok(Decision { reply, recorded: Some(event) })
            }
            Err(StoreError::Conflict) => Ok(Decision::reply_only(replies::already_checked_in())),
            Err(error) => Err(error.into()),
        }
    }

    async fn record_check_out(
        &self,
        inbound: &InboundEvent,
        point: Coordinate,
        now: NaiveDateTime,
    ) -> Result<Decision, ResolveError> {
        // Check-out is recorded regardless of the geofence result; only the
        // status differs.
        let status = if self.geofence.contains(point) {
            EventStatus::Ok
        } else {
            EventStatus::OutOfZone
        };

        match self.append(inbound, EventKind::Out, point, status, now).await {
            Ok(event) => {
                let reply = replies::check_out_recorded(event.recorded_at, event.status);
                Ok(Decision { reply, recorded: Some(event) })
            }
            Err(StoreError::Conflict) => Ok(Decision::reply_only(replies::already_checked_out())),
            Err(error) => Err(error.into()),
        }
    }

    async fn append(
        &self,
        inbound: &InboundEvent,
        kind: EventKind,
        point: Coordinate,
        status: EventStatus,
        now: NaiveDateTime,
    ) -> Result<AttendanceEvent, StoreError> {
        self.store
            .add_event(NewEvent {
                employee_id: inbound.user_id.clone(),
                kind,
                day: now.date(),
                recorded_at: now,
                latitude: point.latitude(),
                longitude: point.longitude(),
                status,
            })
            .await
    }

    fn resolve_command(&self, text: &str, log: &DayLog) -> Decision {
        match command::parse_command(text) {
            BotCommand::CheckIn => Decision::reply_only(replies::request_location(EventKind::In)),
            BotCommand::CheckOut => {
                if log.check_in().is_none() {
                    Decision::reply_only(replies::check_in_first())
                } else if log.check_out().is_some() {
                    Decision::reply_only(replies::already_checked_out())
                } else {
                    Decision::reply_only(replies::request_location(EventKind::Out))
                }
            }
            BotCommand::Status => Decision::reply_only(replies::status_summary(log)),
            BotCommand::Help => Decision::reply_only(replies::help()),
            BotCommand::Unknown => Decision::reply_only(replies::unknown_command()),
        }
    }
}
