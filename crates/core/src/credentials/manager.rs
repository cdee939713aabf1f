//! Credential manager with lazy single-flight refresh
//!
//! Manages the OAuth credential lifecycle per principal:
//! - Token retrieval from the credential store
//! - Refresh before expiry (configurable safety margin, default 60s)
//! - Deactivation on revoked authorization
//! - Single-flight refresh under concurrent access

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use hireflow_domain::{CredentialRecord, HireflowError, Result};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::ports::{CredentialStore, RefreshFailure, TokenRefresher};

/// A usable access token together with the calendar it unlocks
#[derive(Debug, Clone)]
pub struct CalendarAccess {
    pub access_token: String,
    pub calendar_id: String,
}

impl CalendarAccess {
    fn from_record(record: &CredentialRecord) -> Self {
        Self {
            access_token: record.access_token.clone(),
            calendar_id: record.calendar_id.clone(),
        }
    }
}

/// Credential manager with single-flight refresh
///
/// The only component that hands out access tokens:
/// 1. Returns the stored token while it is fresh (expiry further away than
///    the safety margin)
/// 2. Otherwise refreshes through the [`TokenRefresher`] port and updates
///    the store atomically
/// 3. Serializes concurrent refreshes per principal; followers re-read the
///    store and observe the refreshed record instead of refreshing again
pub struct CredentialManager {
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    refresh_margin: Duration,
    // One async mutex per principal; the outer lock only guards map access.
    refresh_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CredentialManager {
    /// Create a new credential manager
    ///
    /// # Arguments
    /// * `store` - Durable credential storage
    /// * `refresher` - OAuth refresh-grant client
    /// * `refresh_margin_seconds` - Refresh tokens this many seconds before
    ///   expiry (default: 60)
    pub fn new(
        store: Arc<dyn CredentialStore>,
        refresher: Arc<dyn TokenRefresher>,
        refresh_margin_seconds: u64,
    ) -> Self {
        Self {
            store,
            refresher,
            refresh_margin: Duration::seconds(refresh_margin_seconds as i64),
            refresh_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Get a valid access token for the principal, refreshing if needed
    ///
    /// # Errors
    /// - `NoCredential` if no active record exists
    /// - `ReauthorizationRequired` if the refresh token is missing or revoked
    /// - `CredentialTransient` if the refresh failed for a transient reason
    #[instrument(skip(self))]
    pub async fn get_valid_token(&self, principal: &str) -> Result<CalendarAccess> {
        let record = self.find_active(principal).await?;
        if record.is_fresh(Utc::now(), self.refresh_margin) {
            return Ok(CalendarAccess::from_record(&record));
        }

        let lock = self.lock_for(principal).await;
        let result = {
            let _guard = lock.lock().await;
            self.refresh_if_stale(principal).await
        };
        drop(lock);
        self.prune_lock(principal).await;
        result
    }

    /// Force a refresh, used after the calendar backend rejected a token
    /// that local bookkeeping still considered valid.
    ///
    /// `rejected_token` is the token that got the `Unauthorized` response.
    /// If the stored token has already moved past it, the stored token is
    /// returned without another network round trip.
    #[instrument(skip(self, rejected_token))]
    pub async fn force_refresh(
        &self,
        principal: &str,
        rejected_token: &str,
    ) -> Result<CalendarAccess> {
        let lock = self.lock_for(principal).await;
        let result = {
            let _guard = lock.lock().await;
            self.refresh_unless_rotated(principal, rejected_token).await
        };
        drop(lock);
        self.prune_lock(principal).await;
        result
    }

    /// Re-read and refresh a stale record. Caller must hold the
    /// per-principal lock; a concurrent caller may already have refreshed.
    async fn refresh_if_stale(&self, principal: &str) -> Result<CalendarAccess> {
        let record = self.find_active(principal).await?;
        if record.is_fresh(Utc::now(), self.refresh_margin) {
            debug!(principal, "token refreshed by concurrent caller");
            return Ok(CalendarAccess::from_record(&record));
        }
        self.refresh_locked(record).await
    }

    /// Refresh unless the stored token already moved past the rejected
    /// one. Caller must hold the per-principal lock.
    async fn refresh_unless_rotated(
        &self,
        principal: &str,
        rejected_token: &str,
    ) -> Result<CalendarAccess> {
        let record = self.find_active(principal).await?;
        if record.access_token != rejected_token {
            debug!(principal, "token already rotated, skipping forced refresh");
            return Ok(CalendarAccess::from_record(&record));
        }
        self.refresh_locked(record).await
    }

    async fn find_active(&self, principal: &str) -> Result<CredentialRecord> {
        self.store
            .find_active(principal)
            .await?
            .ok_or_else(|| HireflowError::NoCredential(principal.to_string()))
    }

    /// Refresh the record's tokens. Caller must hold the per-principal lock.
    async fn refresh_locked(&self, record: CredentialRecord) -> Result<CalendarAccess> {
        let principal = record.principal.clone();

        let Some(refresh_token) = record.refresh_token else {
            warn!(principal, "expired credential has no refresh token, deactivating");
            self.store.deactivate(&principal).await?;
            return Err(HireflowError::ReauthorizationRequired(principal));
        };

        match self.refresher.refresh(&principal, &refresh_token).await {
            Ok(refreshed) => {
                self.store
                    .update_tokens(
                        &principal,
                        &refreshed.access_token,
                        refreshed.refresh_token.as_deref(),
                        refreshed.expires_at,
                    )
                    .await?;
                info!(principal, "access token refreshed");
                Ok(CalendarAccess {
                    access_token: refreshed.access_token,
                    calendar_id: record.calendar_id,
                })
            }
            Err(RefreshFailure::InvalidGrant(reason)) => {
                warn!(principal, reason, "refresh token revoked, deactivating credential");
                self.store.deactivate(&principal).await?;
                Err(HireflowError::ReauthorizationRequired(principal))
            }
            Err(RefreshFailure::Transient(reason)) => {
                warn!(principal, reason, "transient refresh failure, credential stays active");
                Err(HireflowError::CredentialTransient(reason))
            }
        }
    }

    async fn lock_for(&self, principal: &str) -> Arc<Mutex<()>> {
        let mut locks = self.refresh_locks.lock().await;
        Arc::clone(locks.entry(principal.to_string()).or_default())
    }

    /// Drop the principal's lock entry once no task holds a clone, so the
    /// map does not grow with every principal ever refreshed.
    async fn prune_lock(&self, principal: &str) {
        let mut locks = self.refresh_locks.lock().await;
        if let Some(entry) = locks.get(principal) {
            if Arc::strong_count(entry) == 1 {
                locks.remove(principal);
            }
        }
    }
}
