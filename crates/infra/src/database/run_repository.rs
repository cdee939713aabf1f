//! SQLite-backed scheduling-run history.

use std::sync::Arc;

use async_trait::async_trait;
use hireflow_core::RunRepository;
use hireflow_domain::{Result, RunOutcome, SchedulingRun};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;

use super::{map_join_error, map_sql_error, parse_timestamp, DbManager};

/// Run repository over the `scheduling_runs` table.
pub struct SqliteRunRepository {
    db: Arc<DbManager>,
}

impl SqliteRunRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RunRepository for SqliteRunRepository {
    async fn insert(&self, run: &SchedulingRun) -> Result<()> {
        let db = Arc::clone(&self.db);
        let run = run.clone();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO scheduling_runs
                     (id, vacancy_id, principal, requested, scheduled, outcome,
                      failure_reason, started_at, finished_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    run.id,
                    run.vacancy_id,
                    run.principal,
                    run.requested,
                    run.scheduled,
                    run.outcome.as_str(),
                    run.failure_reason,
                    run.started_at.to_rfc3339(),
                    run.finished_at.to_rfc3339(),
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn supersede_non_failed(&self, vacancy_id: &str) -> Result<()> {
        let db = Arc::clone(&self.db);
        let vacancy_id = vacancy_id.to_string();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "DELETE FROM scheduling_runs WHERE vacancy_id = ?1 AND outcome != ?2",
                params![vacancy_id, RunOutcome::Failed.as_str()],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_latest(&self, vacancy_id: &str) -> Result<Option<SchedulingRun>> {
        let db = Arc::clone(&self.db);
        let vacancy_id = vacancy_id.to_string();
        task::spawn_blocking(move || -> Result<Option<SchedulingRun>> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT id, vacancy_id, principal, requested, scheduled, outcome,
                        failure_reason, started_at, finished_at
                 FROM scheduling_runs
                 WHERE vacancy_id = ?1
                 ORDER BY finished_at DESC
                 LIMIT 1",
                params![vacancy_id],
                row_to_run,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn row_to_run(row: &Row<'_>) -> rusqlite::Result<SchedulingRun> {
    let outcome: String = row.get(5)?;
    let started_at: String = row.get(7)?;
    let finished_at: String = row.get(8)?;
    Ok(SchedulingRun {
        id: row.get(0)?,
        vacancy_id: row.get(1)?,
        principal: row.get(2)?,
        requested: row.get(3)?,
        scheduled: row.get(4)?,
        outcome: RunOutcome::parse(&outcome).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                rusqlite::types::Type::Text,
                format!("unknown run outcome: {outcome}").into(),
            )
        })?,
        failure_reason: row.get(6)?,
        started_at: parse_timestamp(7, &started_at)?,
        finished_at: parse_timestamp(8, &finished_at)?,
    })
}
