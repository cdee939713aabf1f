//! Core data types for the interview scheduling engine.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the externally produced shortlist for a vacancy.
///
/// Immutable once produced upstream; rank 1 is the best candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRank {
    pub candidate_id: String,
    pub full_name: String,
    pub email: String,
    pub rank: u32,
}

/// OAuth credential record for a manager's calendar account.
///
/// At most one active record exists per principal. The record is created by
/// the out-of-scope authorization handshake, mutated in place on every
/// refresh, and deactivated (never deleted) when the provider revokes the
/// refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Manager's calendar account (email).
    pub principal: String,
    /// Short-lived bearer token. Opaque secret, never logged.
    pub access_token: String,
    /// Long-lived refresh token; absent when the provider did not issue one.
    pub refresh_token: Option<String>,
    /// Expiry of the access token.
    pub expires_at: DateTime<Utc>,
    /// Provider-side calendar identifier.
    pub calendar_id: String,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// True when the access token is still usable at `now`, keeping the
    /// given safety margin before expiry.
    pub fn is_fresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.expires_at - margin > now
    }
}

/// A half-open time range `[start, end)` with no conflicting calendar event.
///
/// Produced fresh per scheduling run; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl FreeInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True when `[start, end)` fully contains the given range.
    pub fn contains(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start <= start && end <= self.end
    }
}

/// The forward-progressing window the engine searches for free time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

/// Lifecycle of one interview slot assignment.
///
/// Status only ever advances; `NotificationSent` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Proposed,
    Committed,
    NotificationSent,
    Failed,
}

impl AssignmentStatus {
    /// Forward-only ordering of the status machine.
    fn order(self) -> u8 {
        match self {
            Self::Proposed => 0,
            Self::Committed => 1,
            Self::NotificationSent | Self::Failed => 2,
        }
    }

    /// True when moving to `next` does not regress the status.
    pub fn can_advance_to(self, next: Self) -> bool {
        self.order() < next.order()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Proposed => "proposed",
            Self::Committed => "committed",
            Self::NotificationSent => "notification_sent",
            Self::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "proposed" => Some(Self::Proposed),
            "committed" => Some(Self::Committed),
            "notification_sent" => Some(Self::NotificationSent),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A slot assigned to a candidate by the allocator.
///
/// Produced in-memory by the pure allocator; the orchestrator persists each
/// assignment as a durable [`InterviewRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotAssignment {
    pub candidate: CandidateRank,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: AssignmentStatus,
}

/// Durable interview record, one per committed assignment.
///
/// `(vacancy_id, candidate_id)` is the natural dedupe key; the notified
/// flags are the per-recipient sent markers that keep notification delivery
/// at most once per (interview, recipient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewRecord {
    pub id: String,
    pub vacancy_id: String,
    pub candidate_id: String,
    pub candidate_name: String,
    pub candidate_email: String,
    /// Manager whose calendar hosts the interview.
    pub principal: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: AssignmentStatus,
    pub manager_notified: bool,
    pub candidate_notified: bool,
    pub created_at: DateTime<Utc>,
}

impl InterviewRecord {
    /// Build a committed record from an allocator assignment.
    pub fn from_assignment(
        vacancy_id: &str,
        principal: &str,
        assignment: &SlotAssignment,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            vacancy_id: vacancy_id.to_string(),
            candidate_id: assignment.candidate.candidate_id.clone(),
            candidate_name: assignment.candidate.full_name.clone(),
            candidate_email: assignment.candidate.email.clone(),
            principal: principal.to_string(),
            start: assignment.start,
            end: assignment.end,
            status: AssignmentStatus::Committed,
            manager_notified: false,
            candidate_notified: false,
            created_at: now,
        }
    }
}

/// Recipient of an interview notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Manager,
    Candidate,
}

/// Overall outcome of one scheduling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Success,
    PartialSuccess,
    Failed,
}

impl RunOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::PartialSuccess => "partial_success",
            Self::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(Self::Success),
            "partial_success" => Some(Self::PartialSuccess),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// History record of one orchestrator execution for one vacancy closure.
///
/// Immutable once the run completes; a vacancy has at most one non-failed
/// run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingRun {
    pub id: String,
    pub vacancy_id: String,
    pub principal: String,
    /// Number of shortlisted candidates the trigger asked to schedule.
    pub requested: u32,
    /// Number of candidates that received a committed slot.
    pub scheduled: u32,
    pub outcome: RunOutcome,
    /// Operator-readable reason when the run did not fully succeed.
    pub failure_reason: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Trigger event delivered when a vacancy transitions to closed/approved.
///
/// Carries everything the engine needs so no global state is consulted:
/// the shortlist arrives ordered by rank from the out-of-scope scoring
/// subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacancyClosed {
    pub vacancy_id: String,
    pub vacancy_title: String,
    /// Hiring manager's calendar principal (email).
    pub principal: String,
    pub shortlist: Vec<CandidateRank>,
}
