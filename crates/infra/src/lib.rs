//! # Hireflow Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite persistence (credentials, interviews, run history)
//! - Calendar HTTP client and OAuth token refresher
//! - HTTP mail gateway
//! - Configuration loader
//! - Vacancy-closure event worker
//!
//! ## Architecture
//! - Implements traits defined in `hireflow-core`
//! - Depends on `hireflow-domain` and `hireflow-core`
//! - Contains all "impure" code (I/O, HTTP, database)

pub mod calendar;
pub mod config;
pub mod database;
pub mod errors;
pub mod mail;
pub mod scheduling;

// Re-export commonly used items
pub use calendar::{CalendarClient, OAuthTokenRefresher};
pub use database::{
    DbManager, SqliteCredentialStore, SqliteInterviewRepository, SqliteRunRepository,
};
pub use errors::InfraError;
pub use mail::HttpMailGateway;
pub use scheduling::{ClosureWorkerConfig, VacancyClosureWorker};
