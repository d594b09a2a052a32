use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use tabel_core::domain::employee::{Employee, EmployeeId};
use tabel_core::domain::event::{AttendanceEvent, EventId, EventKind, EventStatus};
use tabel_core::store::{AttendanceStore, NewEvent, StoreError};

use super::{to_store_error, RepositoryError};
use crate::DbPool;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// SQLite-backed attendance store. Uniqueness of `(employee, day, kind)` is
/// enforced by the schema's unique index, so concurrent duplicate check-ins
/// lose with `StoreError::Conflict` rather than racing in application code.
pub struct SqlAttendanceStore {
    pool: DbPool,
}

impl SqlAttendanceStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode_event(row: &SqliteRow) -> Result<AttendanceEvent, RepositoryError> {
    let kind: String = row.try_get("kind")?;
    let status: String = row.try_get("status")?;
    let day: String = row.try_get("day")?;
    let recorded_at: String = row.try_get("recorded_at")?;

    Ok(AttendanceEvent {
        id: EventId(row.try_get("id")?),
        employee_id: EmployeeId(row.try_get("employee_id")?),
        kind: kind.parse::<EventKind>().map_err(RepositoryError::Decode)?,
        day: NaiveDate::parse_from_str(&day, DATE_FORMAT)
            .map_err(|e| RepositoryError::Decode(format!("bad day `{day}`: {e}")))?,
        recorded_at: NaiveDateTime::parse_from_str(&recorded_at, DATETIME_FORMAT)
            .map_err(|e| RepositoryError::Decode(format!("bad recorded_at `{recorded_at}`: {e}")))?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        status: status.parse::<EventStatus>().map_err(RepositoryError::Decode)?,
    })
}

#[async_trait]
impl AttendanceStore for SqlAttendanceStore {
    async fn today_events(
        &self,
        employee: &EmployeeId,
        day: NaiveDate,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, employee_id, kind, day, recorded_at, latitude, longitude, status
             FROM attendance_events
             WHERE employee_id = ? AND day = ?
             ORDER BY recorded_at ASC",
        )
        .bind(&employee.0)
        .bind(day.format(DATE_FORMAT).to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(to_store_error)?;

        rows.iter().map(|row| decode_event(row).map_err(StoreError::from)).collect()
    }

    async fn add_event(&self, event: NewEvent) -> Result<AttendanceEvent, StoreError> {
        let id = EventId::generate();
        sqlx::query(
            "INSERT INTO attendance_events
               (id, employee_id, kind, day, recorded_at, latitude, longitude, status)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id.0)
        .bind(&event.employee_id.0)
        .bind(event.kind.as_str())
        .bind(event.day.format(DATE_FORMAT).to_string())
        .bind(event.recorded_at.format(DATETIME_FORMAT).to_string())
        .bind(event.latitude)
        .bind(event.longitude)
        .bind(event.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(to_store_error)?;

        Ok(AttendanceEvent {
            id,
            employee_id: event.employee_id,
            kind: event.kind,
            day: event.day,
            recorded_at: event.recorded_at,
            latitude: event.latitude,
            longitude: event.longitude,
            status: event.status,
        })
    }

    async fn find_employee(&self, id: &EmployeeId) -> Result<Option<Employee>, StoreError> {
        let row = sqlx::query(
            "SELECT id, display_name, email, active FROM employees WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(to_store_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let employee = (|| -> Result<Employee, RepositoryError> {
            Ok(Employee {
                id: EmployeeId(row.try_get("id")?),
                display_name: row.try_get("display_name")?,
                email: row.try_get("email")?,
                active: row.try_get::<i64, _>("active")? != 0,
            })
        })()?;

        Ok(Some(employee))
    }

    async fn upsert_employee(
        &self,
        id: &EmployeeId,
        display_name: &str,
        email: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO employees (id, display_name, email, active)
             VALUES (?, ?, ?, 1)
             ON CONFLICT(id) DO UPDATE SET
               display_name = excluded.display_name,
               email = excluded.email,
               updated_at = datetime('now')",
        )
        .bind(&id.0)
        .bind(display_name)
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(to_store_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use tabel_core::domain::employee::EmployeeId;
    use tabel_core::domain::event::{EventKind, EventStatus};
    use tabel_core::store::{AttendanceStore, NewEvent, StoreError};

    use crate::migrations::run_pending;
    use crate::{connect_with_settings, SqlAttendanceStore};

    async fn store() -> SqlAttendanceStore {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");
        SqlAttendanceStore::new(pool)
    }

    fn new_event(employee: &str, kind: EventKind, day: NaiveDate, hour: u32) -> NewEvent {
        NewEvent {
            employee_id: EmployeeId(employee.to_owned()),
            kind,
            day,
            recorded_at: day.and_hms_opt(hour, 3, 0).expect("valid time"),
            latitude: 57.1521,
            longitude: 65.5921,
            status: EventStatus::Ok,
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")
    }

    #[tokio::test]
    async fn add_and_read_back_events_in_time_order() {
        let store = store().await;
        let employee = EmployeeId("U-1".to_owned());
        store.upsert_employee(&employee, "Ivan", "ivan@example.com").await.expect("upsert");

        store.add_event(new_event("U-1", EventKind::Out, day(), 18)).await.expect("add out");
        store.add_event(new_event("U-1", EventKind::In, day(), 9)).await.expect("add in");

        let events = store.today_events(&employee, day()).await.expect("read");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::In);
        assert_eq!(events[1].kind, EventKind::Out);
    }

    #[tokio::test]
    async fn duplicate_kind_on_same_day_is_a_conflict() {
        let store = store().await;
        let employee = EmployeeId("U-1".to_owned());
        store.upsert_employee(&employee, "Ivan", "ivan@example.com").await.expect("upsert");

        store.add_event(new_event("U-1", EventKind::In, day(), 9)).await.expect("first in");
        let second = store.add_event(new_event("U-1", EventKind::In, day(), 10)).await;

        assert_eq!(second, Err(StoreError::Conflict));
    }

    #[tokio::test]
    async fn same_kind_on_another_day_is_allowed() {
        let store = store().await;
        let employee = EmployeeId("U-1".to_owned());
        store.upsert_employee(&employee, "Ivan", "ivan@example.com").await.expect("upsert");

        let next_day = day().succ_opt().expect("next day");
        store.add_event(new_event("U-1", EventKind::In, day(), 9)).await.expect("day one");
        store.add_event(new_event("U-1", EventKind::In, next_day, 9)).await.expect("day two");

        assert_eq!(store.today_events(&employee, day()).await.expect("read").len(), 1);
        assert_eq!(store.today_events(&employee, next_day).await.expect("read").len(), 1);
    }

    #[tokio::test]
    async fn events_are_scoped_per_employee() {
        let store = store().await;
        let first = EmployeeId("U-1".to_owned());
        let second = EmployeeId("U-2".to_owned());
        store.upsert_employee(&first, "Ivan", "ivan@example.com").await.expect("upsert");
        store.upsert_employee(&second, "Olga", "olga@example.com").await.expect("upsert");

        store.add_event(new_event("U-1", EventKind::In, day(), 9)).await.expect("add");

        assert_eq!(store.today_events(&first, day()).await.expect("read").len(), 1);
        assert!(store.today_events(&second, day()).await.expect("read").is_empty());
    }

    #[tokio::test]
    async fn upsert_updates_profile_fields() {
        let store = store().await;
        let employee = EmployeeId("U-1".to_owned());

        store.upsert_employee(&employee, "Ivan", "ivan@example.com").await.expect("insert");
        store.upsert_employee(&employee, "Ivan Petrov", "i.petrov@example.com").await.expect("update");

        let found = store.find_employee(&employee).await.expect("find").expect("present");
        assert_eq!(found.display_name, "Ivan Petrov");
        assert_eq!(found.email, "i.petrov@example.com");
        assert!(found.active);
    }

    #[tokio::test]
    async fn missing_employee_reads_as_none() {
        let store = store().await;
        let found = store.find_employee(&EmployeeId("ghost".to_owned())).await.expect("find");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn event_for_unknown_employee_is_rejected() {
        let store = store().await;
        let result = store.add_event(new_event("nobody", EventKind::In, day(), 9)).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
