//! Port interfaces for credential storage and token refresh
//!
//! These traits define the boundaries between the credential lifecycle
//! logic and infrastructure implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hireflow_domain::{CredentialRecord, Result};

/// Trait for durable credential storage
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up the active credential record for a principal, if any.
    async fn find_active(&self, principal: &str) -> Result<Option<CredentialRecord>>;

    /// Atomically replace the stored tokens after a successful refresh.
    ///
    /// `refresh_token` is `None` when the provider did not rotate it, in
    /// which case the stored refresh token is kept.
    async fn update_tokens(
        &self,
        principal: &str,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Mark the record inactive. The record is never deleted, so the
    /// authorization handshake can later revive the same principal.
    async fn deactivate(&self, principal: &str) -> Result<()>;
}

/// Token material returned by a successful refresh grant
#[derive(Debug, Clone)]
pub struct RefreshedToken {
    pub access_token: String,
    /// New refresh token when the provider rotates it.
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Why a refresh grant failed
#[derive(Debug, Clone)]
pub enum RefreshFailure {
    /// The provider rejected the refresh token. Authorization is revoked
    /// and the credential record must be deactivated.
    InvalidGrant(String),
    /// Network error, timeout, or provider-side outage. Safe to retry.
    Transient(String),
}

/// Trait for exchanging a refresh token at the provider
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(
        &self,
        principal: &str,
        refresh_token: &str,
    ) -> std::result::Result<RefreshedToken, RefreshFailure>;
}
