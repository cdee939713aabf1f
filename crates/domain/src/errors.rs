//! Error types used throughout the scheduling engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Hireflow
///
/// The scheduling orchestrator is the only place that turns these into a
/// run-level outcome; components return them as typed results and never
/// swallow them.
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum HireflowError {
    /// No active credential record exists for the principal. The manager has
    /// never authorized calendar access.
    #[error("no credential on file for {0}")]
    NoCredential(String),

    /// The stored refresh token was rejected by the provider. The credential
    /// record has been deactivated and the manager must re-run the
    /// authorization handshake.
    #[error("authorization revoked for {0}, re-authorization required")]
    ReauthorizationRequired(String),

    /// Token refresh failed for a transient reason (network, timeout). The
    /// credential record stays active and the run may be retried later.
    #[error("transient credential error: {0}")]
    CredentialTransient(String),

    /// The calendar backend rejected a token that local bookkeeping still
    /// considered valid.
    #[error("calendar rejected access token: {0}")]
    Unauthorized(String),

    /// The calendar backend is unreachable or returned a server error.
    #[error("calendar backend unavailable: {0}")]
    CalendarUnavailable(String),

    /// An interview for this (vacancy, candidate) pair already exists.
    /// Treated as "already scheduled", not as a failure.
    #[error("interview already exists for vacancy {vacancy_id} candidate {candidate_id}")]
    PersistenceConflict { vacancy_id: String, candidate_id: String },

    #[error("database error: {0}")]
    Database(String),

    #[error("notification error: {0}")]
    Notification(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HireflowError {
    /// Whether the failure is worth retrying with backoff.
    ///
    /// Credential revocation and missing credentials require operator
    /// action and must never be retried automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CredentialTransient(_) | Self::CalendarUnavailable(_))
    }

    /// Stable label for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoCredential(_) => "no_credential",
            Self::ReauthorizationRequired(_) => "reauthorization_required",
            Self::CredentialTransient(_) => "credential_transient",
            Self::Unauthorized(_) => "unauthorized",
            Self::CalendarUnavailable(_) => "calendar_unavailable",
            Self::PersistenceConflict { .. } => "persistence_conflict",
            Self::Database(_) => "database",
            Self::Notification(_) => "notification",
            Self::Config(_) => "config",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for Hireflow operations
pub type Result<T> = std::result::Result<T, HireflowError>;
