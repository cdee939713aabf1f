//! SQLite persistence for credentials, interviews and run history.
//!
//! Repositories run their blocking rusqlite work on the tokio blocking
//! pool and hand connections out of a shared r2d2 pool.

mod credential_store;
mod interview_repository;
mod manager;
mod run_repository;

use chrono::{DateTime, Utc};
use hireflow_domain::HireflowError;
use tokio::task::JoinError;

pub use credential_store::SqliteCredentialStore;
pub use interview_repository::SqliteInterviewRepository;
pub use manager::DbManager;
pub use run_repository::SqliteRunRepository;

use crate::errors::InfraError;

pub(crate) fn map_join_error(err: JoinError) -> HireflowError {
    HireflowError::Internal(format!("database task failed to join: {err}"))
}

pub(crate) fn map_sql_error(err: rusqlite::Error) -> HireflowError {
    HireflowError::from(InfraError::from(err))
}

/// Parse an RFC 3339 timestamp read from a TEXT column, keeping the column
/// index in the error for diagnostics.
pub(crate) fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc)).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(err),
        )
    })
}
