//! Port interfaces for scheduling
//!
//! These traits define the boundaries between the orchestrator and
//! infrastructure implementations.

use async_trait::async_trait;
use hireflow_domain::{
    AssignmentStatus, InterviewRecord, Recipient, Result, SchedulingRun, TimeWindow,
};

use crate::availability::BusyEvent;
use crate::notifications::NotificationMessage;

/// Trait for fetching the manager's busy calendar events
#[async_trait]
pub trait AvailabilityProvider: Send + Sync {
    /// Fetch busy events for the calendar inside the window.
    ///
    /// # Errors
    /// - `Unauthorized` if the backend rejects the access token
    /// - `CalendarUnavailable` on network errors or backend outage
    async fn busy_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        window: TimeWindow,
    ) -> Result<Vec<BusyEvent>>;
}

/// Outcome of inserting an interview record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// An interview for this (vacancy, candidate) already exists; the
    /// insert was silently skipped.
    AlreadyScheduled,
}

/// Trait for durable interview persistence
#[async_trait]
pub trait InterviewRepository: Send + Sync {
    /// Insert a record, deduplicating on (vacancy_id, candidate_id).
    async fn insert(&self, record: &InterviewRecord) -> Result<InsertOutcome>;

    /// All interview records for a vacancy, ordered by start time.
    async fn find_by_vacancy(&self, vacancy_id: &str) -> Result<Vec<InterviewRecord>>;

    /// Persist the sent marker for one recipient of one interview.
    async fn mark_notified(&self, interview_id: &str, recipient: Recipient) -> Result<()>;

    /// Advance the interview status. Implementations must never regress it.
    async fn set_status(&self, interview_id: &str, status: AssignmentStatus) -> Result<()>;
}

/// Trait for scheduling-run history
#[async_trait]
pub trait RunRepository: Send + Sync {
    /// Record a completed run.
    async fn insert(&self, run: &SchedulingRun) -> Result<()>;

    /// Most recent run for a vacancy, if any.
    async fn find_latest(&self, vacancy_id: &str) -> Result<Option<SchedulingRun>>;

    /// Remove prior non-failed runs for a vacancy. Called before a newer
    /// non-failed run is recorded, so each vacancy keeps at most one.
    async fn supersede_non_failed(&self, vacancy_id: &str) -> Result<()>;
}

/// Trait for outbound notification delivery
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Deliver one message. An `Ok` return means the gateway accepted it.
    async fn send(&self, message: &NotificationMessage) -> Result<()>;
}
