//! SQLite-backed interview persistence.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use hireflow_core::{InsertOutcome, InterviewRepository};
use hireflow_domain::{AssignmentStatus, InterviewRecord, Recipient, Result};
use rusqlite::{params, Row};
use tokio::task;

use super::{map_join_error, map_sql_error, parse_timestamp, DbManager};

/// Interview repository over the `interviews` table.
///
/// Dedupe on `(vacancy_id, candidate_id)` happens inside the database via
/// `INSERT OR IGNORE`, so concurrent runs can race on the insert safely.
pub struct SqliteInterviewRepository {
    db: Arc<DbManager>,
}

impl SqliteInterviewRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InterviewRepository for SqliteInterviewRepository {
    async fn insert(&self, record: &InterviewRecord) -> Result<InsertOutcome> {
        let db = Arc::clone(&self.db);
        let record = record.clone();
        task::spawn_blocking(move || -> Result<InsertOutcome> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "INSERT OR IGNORE INTO interviews
                         (id, vacancy_id, candidate_id, candidate_name, candidate_email,
                          principal, start_at, end_at, status, manager_notified,
                          candidate_notified, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    params![
                        record.id,
                        record.vacancy_id,
                        record.candidate_id,
                        record.candidate_name,
                        record.candidate_email,
                        record.principal,
                        record.start.to_rfc3339(),
                        record.end.to_rfc3339(),
                        record.status.as_str(),
                        record.manager_notified,
                        record.candidate_notified,
                        record.created_at.to_rfc3339(),
                    ],
                )
                .map_err(map_sql_error)?;

            if changed == 0 {
                Ok(InsertOutcome::AlreadyScheduled)
            } else {
                Ok(InsertOutcome::Inserted)
            }
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_vacancy(&self, vacancy_id: &str) -> Result<Vec<InterviewRecord>> {
        let db = Arc::clone(&self.db);
        let vacancy_id = vacancy_id.to_string();
        task::spawn_blocking(move || -> Result<Vec<InterviewRecord>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(
                    "SELECT id, vacancy_id, candidate_id, candidate_name, candidate_email,
                            principal, start_at, end_at, status, manager_notified,
                            candidate_notified, created_at
                     FROM interviews WHERE vacancy_id = ?1 ORDER BY start_at",
                )
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![vacancy_id], row_to_record)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(rows)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn mark_notified(&self, interview_id: &str, recipient: Recipient) -> Result<()> {
        let db = Arc::clone(&self.db);
        let interview_id = interview_id.to_string();
        let column = match recipient {
            Recipient::Manager => "manager_notified",
            Recipient::Candidate => "candidate_notified",
        };
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                &format!("UPDATE interviews SET {column} = 1 WHERE id = ?1"),
                params![interview_id],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_status(&self, interview_id: &str, status: AssignmentStatus) -> Result<()> {
        let db = Arc::clone(&self.db);
        let interview_id = interview_id.to_string();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            // Guard in SQL so the status machine never regresses, even if
            // two processes race on the same interview.
            conn.execute(
                "UPDATE interviews SET status = ?2
                 WHERE id = ?1
                   AND (CASE status
                            WHEN 'proposed' THEN 0
                            WHEN 'committed' THEN 1
                            ELSE 2
                        END)
                     < (CASE ?2
                            WHEN 'proposed' THEN 0
                            WHEN 'committed' THEN 1
                            ELSE 2
                        END)",
                params![interview_id, status.as_str()],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<InterviewRecord> {
    let start: String = row.get(6)?;
    let end: String = row.get(7)?;
    let status: String = row.get(8)?;
    let created_at: String = row.get(11)?;
    Ok(InterviewRecord {
        id: row.get(0)?,
        vacancy_id: row.get(1)?,
        candidate_id: row.get(2)?,
        candidate_name: row.get(3)?,
        candidate_email: row.get(4)?,
        principal: row.get(5)?,
        start: parse_timestamp(6, &start)?,
        end: parse_timestamp(7, &end)?,
        status: AssignmentStatus::parse(&status).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                8,
                rusqlite::types::Type::Text,
                format!("unknown interview status: {status}").into(),
            )
        })?,
        manager_notified: row.get(9)?,
        candidate_notified: row.get(10)?,
        created_at: parse_timestamp(11, &created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};
    use tempfile::TempDir;

    use super::*;

    async fn repository() -> (TempDir, SqliteInterviewRepository) {
        let temp_dir = TempDir::new().expect("temp dir created");
        let manager =
            DbManager::new(temp_dir.path().join("test.db"), 2).expect("manager created");
        manager.run_migrations().expect("migrations run");
        (temp_dir, SqliteInterviewRepository::new(Arc::new(manager)))
    }

    fn record(vacancy_id: &str, candidate_id: &str, start: DateTime<Utc>) -> InterviewRecord {
        InterviewRecord {
            id: uuid::Uuid::now_v7().to_string(),
            vacancy_id: vacancy_id.to_string(),
            candidate_id: candidate_id.to_string(),
            candidate_name: "Ada Lovelace".to_string(),
            candidate_email: "ada@example.com".to_string(),
            principal: "manager@example.com".to_string(),
            start,
            end: start + Duration::hours(1),
            status: AssignmentStatus::Committed,
            manager_notified: false,
            candidate_notified: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_deduplicates_on_vacancy_and_candidate() {
        let (_guard, repo) = repository().await;
        let now = Utc::now();

        let first = repo.insert(&record("vac-1", "cand-1", now)).await.expect("insert");
        assert_eq!(first, InsertOutcome::Inserted);

        // Same pair, different id and slot: the original row wins.
        let dup =
            repo.insert(&record("vac-1", "cand-1", now + Duration::hours(2))).await.expect("insert");
        assert_eq!(dup, InsertOutcome::AlreadyScheduled);

        let rows = repo.find_by_vacancy("vac-1").await.expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].start.timestamp(), now.timestamp());
    }

    #[tokio::test]
    async fn find_by_vacancy_orders_by_start() {
        let (_guard, repo) = repository().await;
        let now = Utc::now();

        repo.insert(&record("vac-1", "cand-b", now + Duration::hours(3))).await.expect("insert");
        repo.insert(&record("vac-1", "cand-a", now)).await.expect("insert");
        repo.insert(&record("vac-2", "cand-a", now)).await.expect("insert");

        let rows = repo.find_by_vacancy("vac-1").await.expect("query");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].candidate_id, "cand-a");
        assert_eq!(rows[1].candidate_id, "cand-b");
    }

    #[tokio::test]
    async fn notification_markers_round_trip() {
        let (_guard, repo) = repository().await;
        let rec = record("vac-1", "cand-1", Utc::now());
        repo.insert(&rec).await.expect("insert");

        repo.mark_notified(&rec.id, Recipient::Candidate).await.expect("mark");
        let rows = repo.find_by_vacancy("vac-1").await.expect("query");
        assert!(rows[0].candidate_notified);
        assert!(!rows[0].manager_notified);

        repo.mark_notified(&rec.id, Recipient::Manager).await.expect("mark");
        let rows = repo.find_by_vacancy("vac-1").await.expect("query");
        assert!(rows[0].manager_notified);
    }

    #[tokio::test]
    async fn status_never_regresses() {
        let (_guard, repo) = repository().await;
        let rec = record("vac-1", "cand-1", Utc::now());
        repo.insert(&rec).await.expect("insert");

        repo.set_status(&rec.id, AssignmentStatus::NotificationSent).await.expect("advance");
        // Attempting to move back to committed is silently ignored.
        repo.set_status(&rec.id, AssignmentStatus::Committed).await.expect("no-op");

        let rows = repo.find_by_vacancy("vac-1").await.expect("query");
        assert_eq!(rows[0].status, AssignmentStatus::NotificationSent);
    }
}
