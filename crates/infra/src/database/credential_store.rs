//! SQLite-backed credential storage.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hireflow_core::CredentialStore;
use hireflow_domain::{CredentialRecord, Result};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;

use super::{map_join_error, map_sql_error, parse_timestamp, DbManager};

/// Credential repository over the `credentials` table.
///
/// One row per principal; rows are deactivated on revocation, never deleted.
pub struct SqliteCredentialStore {
    db: Arc<DbManager>,
}

impl SqliteCredentialStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Upsert a full credential record, as the authorization handshake does
    /// when a manager (re-)connects a calendar account.
    pub async fn store(&self, record: &CredentialRecord) -> Result<()> {
        let db = Arc::clone(&self.db);
        let record = record.clone();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO credentials
                     (principal, access_token, refresh_token, expires_at, calendar_id, is_active, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(principal) DO UPDATE SET
                     access_token = excluded.access_token,
                     refresh_token = excluded.refresh_token,
                     expires_at = excluded.expires_at,
                     calendar_id = excluded.calendar_id,
                     is_active = excluded.is_active,
                     updated_at = excluded.updated_at",
                params![
                    record.principal,
                    record.access_token,
                    record.refresh_token,
                    record.expires_at.to_rfc3339(),
                    record.calendar_id,
                    record.is_active,
                    record.updated_at.to_rfc3339(),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    /// Fetch a record regardless of its active flag. Used by tests and by
    /// operator tooling inspecting revoked accounts.
    pub async fn find(&self, principal: &str) -> Result<Option<CredentialRecord>> {
        let db = Arc::clone(&self.db);
        let principal = principal.to_string();
        task::spawn_blocking(move || -> Result<Option<CredentialRecord>> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT principal, access_token, refresh_token, expires_at, calendar_id,
                        is_active, updated_at
                 FROM credentials WHERE principal = ?1",
                params![principal],
                row_to_record,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn find_active(&self, principal: &str) -> Result<Option<CredentialRecord>> {
        let db = Arc::clone(&self.db);
        let principal = principal.to_string();
        task::spawn_blocking(move || -> Result<Option<CredentialRecord>> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT principal, access_token, refresh_token, expires_at, calendar_id,
                        is_active, updated_at
                 FROM credentials WHERE principal = ?1 AND is_active = 1",
                params![principal],
                row_to_record,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update_tokens(
        &self,
        principal: &str,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let db = Arc::clone(&self.db);
        let principal = principal.to_string();
        let access_token = access_token.to_string();
        let refresh_token = refresh_token.map(str::to_string);
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            // COALESCE keeps the stored refresh token when the provider did
            // not rotate it.
            conn.execute(
                "UPDATE credentials
                 SET access_token = ?2,
                     refresh_token = COALESCE(?3, refresh_token),
                     expires_at = ?4,
                     updated_at = ?5
                 WHERE principal = ?1",
                params![
                    principal,
                    access_token,
                    refresh_token,
                    expires_at.to_rfc3339(),
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn deactivate(&self, principal: &str) -> Result<()> {
        let db = Arc::clone(&self.db);
        let principal = principal.to_string();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "UPDATE credentials SET is_active = 0, updated_at = ?2 WHERE principal = ?1",
                params![principal, Utc::now().to_rfc3339()],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<CredentialRecord> {
    let expires_at: String = row.get(3)?;
    let updated_at: String = row.get(6)?;
    Ok(CredentialRecord {
        principal: row.get(0)?,
        access_token: row.get(1)?,
        refresh_token: row.get(2)?,
        expires_at: parse_timestamp(3, &expires_at)?,
        calendar_id: row.get(4)?,
        is_active: row.get(5)?,
        updated_at: parse_timestamp(6, &updated_at)?,
    })
}
