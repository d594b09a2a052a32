use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use tabel_core::domain::employee::{Employee, EmployeeId};
use tabel_core::domain::event::{AttendanceEvent, EventId};
use tabel_core::store::{AttendanceStore, NewEvent, StoreError};

#[derive(Default)]
struct Inner {
    employees: HashMap<String, Employee>,
    events: Vec<AttendanceEvent>,
}

/// In-memory attendance store for tests and local runs without a database
/// file. The single write lock gives the same loser-gets-conflict behavior
/// the SQL store gets from its unique index.
#[derive(Default)]
pub struct InMemoryAttendanceStore {
    inner: RwLock<Inner>,
}

#[async_trait]
impl AttendanceStore for InMemoryAttendanceStore {
    async fn today_events(
        &self,
        employee: &EmployeeId,
        day: NaiveDate,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        let inner = self.inner.read().await;
        let mut events: Vec<AttendanceEvent> = inner
            .events
            .iter()
            .filter(|event| event.employee_id == *employee && event.day == day)
            .cloned()
            .collect();
        events.sort_by_key(|event| event.recorded_at);
        Ok(events)
    }

    async fn add_event(&self, event: NewEvent) -> Result<AttendanceEvent, StoreError> {
        let mut inner = self.inner.write().await;
        let duplicate = inner.events.iter().any(|existing| {
            existing.employee_id == event.employee_id
                && existing.day == event.day
                && existing.kind == event.kind
        });
        if duplicate {
            return Err(StoreError::Conflict);
        }

        let stored = AttendanceEvent {
            id: EventId::generate(),
            employee_id: event.employee_id,
            kind: event.kind,
            day: event.day,
            recorded_at: event.recorded_at,
            latitude: event.latitude,
            longitude: event.longitude,
            status: event.status,
        };
        inner.events.push(stored.clone());
        Ok(stored)
    }

    async fn find_employee(&self, id: &EmployeeId) -> Result<Option<Employee>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.employees.get(&id.0).cloned())
    }

    async fn upsert_employee(
        &self,
        id: &EmployeeId,
        display_name: &str,
        email: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.employees.insert(
            id.0.clone(),
            Employee {
                id: id.clone(),
                display_name: display_name.to_owned(),
                email: email.to_owned(),
                active: true,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use tabel_core::domain::employee::EmployeeId;
    use tabel_core::domain::event::{EventKind, EventStatus};
    use tabel_core::store::{AttendanceStore, NewEvent, StoreError};

    use super::InMemoryAttendanceStore;

    fn new_event(kind: EventKind, hour: u32) -> NewEvent {
        let day = NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date");
        NewEvent {
            employee_id: EmployeeId("U-1".to_owned()),
            kind,
            day,
            recorded_at: day.and_hms_opt(hour, 0, 0).expect("valid time"),
            latitude: 57.1521,
            longitude: 65.5921,
            status: EventStatus::Ok,
        }
    }

    #[tokio::test]
    async fn add_event_rejects_duplicate_kind_for_the_day() {
        let store = InMemoryAttendanceStore::default();

        store.add_event(new_event(EventKind::In, 9)).await.expect("first in");
        let second = store.add_event(new_event(EventKind::In, 10)).await;

        assert_eq!(second, Err(StoreError::Conflict));
    }

    #[tokio::test]
    async fn events_come_back_ordered_by_recorded_time() {
        let store = InMemoryAttendanceStore::default();
        let employee = EmployeeId("U-1".to_owned());
        let day = NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date");

        store.add_event(new_event(EventKind::Out, 18)).await.expect("add out");
        store.add_event(new_event(EventKind::In, 9)).await.expect("add in");

        let events = store.today_events(&employee, day).await.expect("read");
        assert_eq!(events[0].kind, EventKind::In);
        assert_eq!(events[1].kind, EventKind::Out);
    }

    #[tokio::test]
    async fn upsert_replaces_profile_for_same_id() {
        let store = InMemoryAttendanceStore::default();
        let employee = EmployeeId("U-1".to_owned());

        store.upsert_employee(&employee, "Ivan", "ivan@example.com").await.expect("insert");
        store.upsert_employee(&employee, "Ivan Petrov", "i.petrov@example.com").await.expect("update");

        let found = store.find_employee(&employee).await.expect("find").expect("present");
        assert_eq!(found.display_name, "Ivan Petrov");
    }
}
