use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use hireflow_core::credentials::ports::{
    CredentialStore, RefreshFailure, RefreshedToken, TokenRefresher,
};
use hireflow_domain::{CredentialRecord, Result as DomainResult};

/// In-memory mock for `CredentialStore`.
#[derive(Default, Clone)]
pub struct InMemoryCredentialStore {
    records: Arc<Mutex<HashMap<String, CredentialRecord>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, record: CredentialRecord) -> Self {
        self.records.lock().unwrap().insert(record.principal.clone(), record);
        self
    }

    /// Raw record regardless of the active flag, for assertions.
    pub fn record(&self, principal: &str) -> Option<CredentialRecord> {
        self.records.lock().unwrap().get(principal).cloned()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_active(&self, principal: &str) -> DomainResult<Option<CredentialRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(principal)
            .filter(|r| r.is_active)
            .cloned())
    }

    async fn update_tokens(
        &self,
        principal: &str,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.get_mut(principal) {
            record.access_token = access_token.to_string();
            if let Some(token) = refresh_token {
                record.refresh_token = Some(token.to_string());
            }
            record.expires_at = expires_at;
            record.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn deactivate(&self, principal: &str) -> DomainResult<()> {
        if let Some(record) = self.records.lock().unwrap().get_mut(principal) {
            record.is_active = false;
        }
        Ok(())
    }
}

/// What the scripted refresher should do on each call.
#[derive(Debug, Clone)]
pub enum RefreshScript {
    /// Always succeed with a fresh token valid for an hour.
    Succeed,
    /// Always fail with a revoked refresh token.
    InvalidGrant,
    /// Always fail transiently.
    Transient,
}

/// Mock `TokenRefresher` that counts calls and follows a fixed script.
pub struct ScriptedRefresher {
    script: RefreshScript,
    calls: AtomicU32,
}

impl ScriptedRefresher {
    pub fn new(script: RefreshScript) -> Self {
        Self { script, calls: AtomicU32::new(0) }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRefresher for ScriptedRefresher {
    async fn refresh(
        &self,
        _principal: &str,
        _refresh_token: &str,
    ) -> std::result::Result<RefreshedToken, RefreshFailure> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.script {
            RefreshScript::Succeed => Ok(RefreshedToken {
                access_token: format!("refreshed-token-{call}"),
                refresh_token: Some(format!("rotated-refresh-{call}")),
                expires_at: Utc::now() + Duration::hours(1),
            }),
            RefreshScript::InvalidGrant => {
                Err(RefreshFailure::InvalidGrant("invalid_grant".to_string()))
            }
            RefreshScript::Transient => {
                Err(RefreshFailure::Transient("connection reset".to_string()))
            }
        }
    }
}
