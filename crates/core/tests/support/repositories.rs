use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hireflow_core::scheduling::ports::{InsertOutcome, InterviewRepository, RunRepository};
use hireflow_domain::{
    AssignmentStatus, InterviewRecord, Recipient, Result as DomainResult, RunOutcome,
    SchedulingRun,
};

/// In-memory mock for `InterviewRepository` with (vacancy, candidate)
/// dedupe, mirroring the SQLite adapter's `INSERT OR IGNORE` behaviour.
#[derive(Default, Clone)]
pub struct InMemoryInterviewRepository {
    rows: Arc<Mutex<Vec<InterviewRecord>>>,
}

impl InMemoryInterviewRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a pre-existing record, as if written by an earlier run.
    pub fn seed(&self, record: InterviewRecord) {
        self.rows.lock().unwrap().push(record);
    }

    pub fn all(&self) -> Vec<InterviewRecord> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl InterviewRepository for InMemoryInterviewRepository {
    async fn insert(&self, record: &InterviewRecord) -> DomainResult<InsertOutcome> {
        let mut rows = self.rows.lock().unwrap();
        let duplicate = rows
            .iter()
            .any(|r| r.vacancy_id == record.vacancy_id && r.candidate_id == record.candidate_id);
        if duplicate {
            return Ok(InsertOutcome::AlreadyScheduled);
        }
        rows.push(record.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn find_by_vacancy(&self, vacancy_id: &str) -> DomainResult<Vec<InterviewRecord>> {
        let mut rows: Vec<InterviewRecord> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.vacancy_id == vacancy_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.start);
        Ok(rows)
    }

    async fn mark_notified(&self, interview_id: &str, recipient: Recipient) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.id == interview_id) {
            match recipient {
                Recipient::Manager => row.manager_notified = true,
                Recipient::Candidate => row.candidate_notified = true,
            }
        }
        Ok(())
    }

    async fn set_status(
        &self,
        interview_id: &str,
        status: AssignmentStatus,
    ) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.id == interview_id) {
            if row.status.can_advance_to(status) {
                row.status = status;
            }
        }
        Ok(())
    }
}

/// In-memory mock for `RunRepository`.
#[derive(Default, Clone)]
pub struct InMemoryRunRepository {
    runs: Arc<Mutex<Vec<SchedulingRun>>>,
}

impl InMemoryRunRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<SchedulingRun> {
        self.runs.lock().unwrap().clone()
    }
}

#[async_trait]
impl RunRepository for InMemoryRunRepository {
    async fn insert(&self, run: &SchedulingRun) -> DomainResult<()> {
        self.runs.lock().unwrap().push(run.clone());
        Ok(())
    }

    async fn find_latest(&self, vacancy_id: &str) -> DomainResult<Option<SchedulingRun>> {
        Ok(self
            .runs
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.vacancy_id == vacancy_id)
            .max_by_key(|r| r.finished_at)
            .cloned())
    }

    async fn supersede_non_failed(&self, vacancy_id: &str) -> DomainResult<()> {
        self.runs
            .lock()
            .unwrap()
            .retain(|r| r.vacancy_id != vacancy_id || r.outcome == RunOutcome::Failed);
        Ok(())
    }
}
