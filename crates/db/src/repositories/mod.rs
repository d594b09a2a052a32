use sqlx::error::ErrorKind;
use thiserror::Error;

use tabel_core::store::StoreError;

pub mod attendance;
pub mod memory;

pub use attendance::SqlAttendanceStore;
pub use memory::InMemoryAttendanceStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for StoreError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Database(inner) => to_store_error(inner),
            RepositoryError::Decode(message) => StoreError::Unavailable(message),
        }
    }
}

/// Uniqueness violations become the conflict branch of the core's decision
/// procedure; everything else is an availability failure.
pub(crate) fn to_store_error(error: sqlx::Error) -> StoreError {
    if let Some(db_error) = error.as_database_error() {
        if db_error.kind() == ErrorKind::UniqueViolation {
            return StoreError::Conflict;
        }
    }
    StoreError::Unavailable(error.to_string())
}
