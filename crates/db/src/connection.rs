use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;

use tabel_core::config::DatabaseConfig;

pub type DbPool = sqlx::SqlitePool;

/// Opens the pool sized per the `[database]` section of the app config.
pub async fn connect(database: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(&database.url, database.max_connections, database.timeout_secs).await
}

/// Pool with explicit sizing, for tests that want a single connection.
///
/// Each connection enables foreign keys (attendance events must reference a
/// synced employee row), WAL so webhook reads do not block writers, and a
/// busy timeout so two simultaneous check-in inserts queue instead of
/// failing with `SQLITE_BUSY`.
pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
}
