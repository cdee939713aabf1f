//! Integration tests for the credential lifecycle manager.

mod support;

use std::sync::Arc;

use chrono::{Duration, Utc};
use hireflow_core::credentials::manager::CredentialManager;
use hireflow_core::credentials::ports::TokenRefresher;
use hireflow_domain::HireflowError;
use support::credential;
use support::credentials::{InMemoryCredentialStore, RefreshScript, ScriptedRefresher};

const PRINCIPAL: &str = "manager@example.com";

fn manager(
    store: &InMemoryCredentialStore,
    refresher: &Arc<ScriptedRefresher>,
) -> CredentialManager {
    CredentialManager::new(
        Arc::new(store.clone()),
        Arc::clone(refresher) as Arc<dyn TokenRefresher>,
        60,
    )
}

#[tokio::test]
async fn fresh_token_returned_without_network() {
    let store = InMemoryCredentialStore::new()
        .with_record(credential(PRINCIPAL, Utc::now() + Duration::hours(1)));
    let refresher = Arc::new(ScriptedRefresher::new(RefreshScript::Succeed));
    let manager = manager(&store, &refresher);

    let access = manager.get_valid_token(PRINCIPAL).await.expect("token");

    assert_eq!(access.access_token, "stored-token");
    assert_eq!(access.calendar_id, "primary");
    assert_eq!(refresher.calls(), 0);
}

#[tokio::test]
async fn expired_token_is_refreshed_and_stored() {
    let store = InMemoryCredentialStore::new()
        .with_record(credential(PRINCIPAL, Utc::now() - Duration::minutes(1)));
    let refresher = Arc::new(ScriptedRefresher::new(RefreshScript::Succeed));
    let manager = manager(&store, &refresher);

    let access = manager.get_valid_token(PRINCIPAL).await.expect("token");

    assert_eq!(access.access_token, "refreshed-token-1");
    assert_eq!(refresher.calls(), 1);

    let record = store.record(PRINCIPAL).expect("record");
    assert_eq!(record.access_token, "refreshed-token-1");
    // The provider rotated the refresh token; the rotation must stick.
    assert_eq!(record.refresh_token.as_deref(), Some("rotated-refresh-1"));
    assert!(record.is_active);
}

#[tokio::test]
async fn token_inside_safety_margin_is_refreshed() {
    // Expires in 30s with a 60s margin: treated as stale.
    let store = InMemoryCredentialStore::new()
        .with_record(credential(PRINCIPAL, Utc::now() + Duration::seconds(30)));
    let refresher = Arc::new(ScriptedRefresher::new(RefreshScript::Succeed));
    let manager = manager(&store, &refresher);

    let access = manager.get_valid_token(PRINCIPAL).await.expect("token");

    assert_eq!(access.access_token, "refreshed-token-1");
    assert_eq!(refresher.calls(), 1);
}

#[tokio::test]
async fn concurrent_callers_share_a_single_refresh() {
    let store = InMemoryCredentialStore::new()
        .with_record(credential(PRINCIPAL, Utc::now() - Duration::minutes(1)));
    let refresher = Arc::new(ScriptedRefresher::new(RefreshScript::Succeed));
    let manager = Arc::new(manager(&store, &refresher));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let manager = Arc::clone(&manager);
        handles.push(tokio::spawn(async move { manager.get_valid_token(PRINCIPAL).await }));
    }

    for handle in handles {
        let access = handle.await.expect("join").expect("token");
        assert_eq!(access.access_token, "refreshed-token-1");
    }
    assert_eq!(refresher.calls(), 1, "followers must observe the refreshed record");
}

#[tokio::test]
async fn missing_credential_is_reported() {
    let store = InMemoryCredentialStore::new();
    let refresher = Arc::new(ScriptedRefresher::new(RefreshScript::Succeed));
    let manager = manager(&store, &refresher);

    let err = manager.get_valid_token(PRINCIPAL).await.expect_err("no credential");
    assert!(matches!(err, HireflowError::NoCredential(_)));
}

#[tokio::test]
async fn expired_record_without_refresh_token_is_deactivated() {
    let mut record = credential(PRINCIPAL, Utc::now() - Duration::minutes(1));
    record.refresh_token = None;
    let store = InMemoryCredentialStore::new().with_record(record);
    let refresher = Arc::new(ScriptedRefresher::new(RefreshScript::Succeed));
    let manager = manager(&store, &refresher);

    let err = manager.get_valid_token(PRINCIPAL).await.expect_err("reauth");

    assert!(matches!(err, HireflowError::ReauthorizationRequired(_)));
    assert!(!store.record(PRINCIPAL).expect("record").is_active);
    assert_eq!(refresher.calls(), 0);
}

#[tokio::test]
async fn invalid_grant_deactivates_the_record() {
    let store = InMemoryCredentialStore::new()
        .with_record(credential(PRINCIPAL, Utc::now() - Duration::minutes(1)));
    let refresher = Arc::new(ScriptedRefresher::new(RefreshScript::InvalidGrant));
    let manager = manager(&store, &refresher);

    let err = manager.get_valid_token(PRINCIPAL).await.expect_err("reauth");

    assert!(matches!(err, HireflowError::ReauthorizationRequired(_)));
    assert!(!store.record(PRINCIPAL).expect("record").is_active);

    // A second call now sees no active credential.
    let err = manager.get_valid_token(PRINCIPAL).await.expect_err("gone");
    assert!(matches!(err, HireflowError::NoCredential(_)));
}

#[tokio::test]
async fn transient_refresh_failure_keeps_the_record_active() {
    let store = InMemoryCredentialStore::new()
        .with_record(credential(PRINCIPAL, Utc::now() - Duration::minutes(1)));
    let refresher = Arc::new(ScriptedRefresher::new(RefreshScript::Transient));
    let manager = manager(&store, &refresher);

    let err = manager.get_valid_token(PRINCIPAL).await.expect_err("transient");

    assert!(matches!(err, HireflowError::CredentialTransient(_)));
    assert!(store.record(PRINCIPAL).expect("record").is_active);
}

#[tokio::test]
async fn force_refresh_skips_when_token_already_rotated() {
    let store = InMemoryCredentialStore::new()
        .with_record(credential(PRINCIPAL, Utc::now() + Duration::hours(1)));
    let refresher = Arc::new(ScriptedRefresher::new(RefreshScript::Succeed));
    let manager = manager(&store, &refresher);

    // Rejected token no longer matches the stored one: no network call.
    let access = manager.force_refresh(PRINCIPAL, "some-older-token").await.expect("token");
    assert_eq!(access.access_token, "stored-token");
    assert_eq!(refresher.calls(), 0);

    // Rejected token matches: actually refresh despite local freshness.
    let access = manager.force_refresh(PRINCIPAL, "stored-token").await.expect("token");
    assert_eq!(access.access_token, "refreshed-token-1");
    assert_eq!(refresher.calls(), 1);
}
