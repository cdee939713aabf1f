//! Scheduling orchestrator - core business logic
//!
//! Drives one vacancy closure through credential resolution, availability,
//! allocation, persistence and notification. This is the only place that
//! turns component errors into a run-level outcome, and the only writer of
//! run records.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use hireflow_common::resilience::retry::{policies, RetryConfig, RetryError, RetryExecutor};
use hireflow_domain::constants::{
    CALENDAR_RETRY_INITIAL_DELAY_MS, CALENDAR_RETRY_MAX_ATTEMPTS, CALENDAR_RETRY_MAX_DELAY_MS,
};
use hireflow_domain::{
    AssignmentStatus, HireflowError, InterviewRecord, Recipient, Result, RunOutcome,
    SchedulingConfig, SchedulingRun, TimeWindow, VacancyClosed,
};
use tracing::{debug, info, instrument, warn};

use super::ports::{
    AvailabilityProvider, InsertOutcome, InterviewRepository, NotificationGateway, RunRepository,
};
use crate::availability::{self, BusyEvent};
use crate::credentials::manager::{CalendarAccess, CredentialManager};
use crate::{allocator, notifications};

/// Scheduling orchestrator
pub struct SchedulingService {
    credentials: Arc<CredentialManager>,
    availability: Arc<dyn AvailabilityProvider>,
    interviews: Arc<dyn InterviewRepository>,
    runs: Arc<dyn RunRepository>,
    gateway: Arc<dyn NotificationGateway>,
    config: SchedulingConfig,
    retry: RetryConfig,
}

impl SchedulingService {
    /// Create a new scheduling service
    pub fn new(
        credentials: Arc<CredentialManager>,
        availability: Arc<dyn AvailabilityProvider>,
        interviews: Arc<dyn InterviewRepository>,
        runs: Arc<dyn RunRepository>,
        gateway: Arc<dyn NotificationGateway>,
        config: SchedulingConfig,
    ) -> Self {
        let retry = RetryConfig {
            max_attempts: CALENDAR_RETRY_MAX_ATTEMPTS as u32,
            backoff: hireflow_common::resilience::retry::BackoffStrategy::Exponential {
                initial_delay: StdDuration::from_millis(CALENDAR_RETRY_INITIAL_DELAY_MS),
                base: 2.0,
                max_delay: StdDuration::from_millis(CALENDAR_RETRY_MAX_DELAY_MS),
            },
            jitter: hireflow_common::resilience::retry::Jitter::Equal,
            max_total_time: Some(StdDuration::from_secs(60)),
        };
        Self { credentials, availability, interviews, runs, gateway, config, retry }
    }

    /// Override the calendar retry budget. Mainly useful in tests.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Execute one scheduling run for a vacancy closure.
    ///
    /// Always returns the recorded run; component failures become a run
    /// with outcome `Failed` rather than an error. Only persistence of the
    /// run record itself can fail.
    pub async fn run(&self, event: VacancyClosed) -> Result<SchedulingRun> {
        self.run_at(event, Utc::now()).await
    }

    /// Like [`run`](Self::run) with an explicit trigger time, which anchors
    /// the scheduling window.
    #[instrument(skip(self, event), fields(vacancy_id = %event.vacancy_id))]
    pub async fn run_at(&self, event: VacancyClosed, now: DateTime<Utc>) -> Result<SchedulingRun> {
        let requested = event.shortlist.len().min(self.config.max_candidates as usize) as u32;

        if event.shortlist.is_empty() {
            warn!(vacancy_id = %event.vacancy_id, "trigger carried an empty shortlist");
            return self.record_failure(&event, 0, "empty shortlist", now).await;
        }

        // Idempotency and crash recovery: existing interviews mean a prior
        // run already allocated. Never allocate twice.
        let existing = self.interviews.find_by_vacancy(&event.vacancy_id).await?;
        if !existing.is_empty() {
            let fully_notified =
                existing.iter().all(|r| r.status != AssignmentStatus::Committed);
            if fully_notified {
                if let Some(run) = self.runs.find_latest(&event.vacancy_id).await? {
                    if run.outcome != RunOutcome::Failed {
                        info!(vacancy_id = %event.vacancy_id, "duplicate trigger, run already recorded");
                        return Ok(run);
                    }
                }
            } else {
                info!(vacancy_id = %event.vacancy_id, "resuming at notification stage");
            }
            let records = self.dispatch_notifications(&event, existing).await?;
            return self.record_outcome(&event, requested, &records, None, now).await;
        }

        // Fresh run: credential, availability, allocation, persistence.
        let access = match self.credentials.get_valid_token(&event.principal).await {
            Ok(access) => access,
            Err(err) => return self.record_failure(&event, requested, &err.to_string(), now).await,
        };

        let window =
            TimeWindow::new(now, now + Duration::days(self.config.horizon_days as i64));
        let busy = match self.fetch_busy(&access, &event.principal, window).await {
            Ok(busy) => busy,
            Err(err) => return self.record_failure(&event, requested, &err.to_string(), now).await,
        };

        let free = availability::compute_free_intervals(
            window,
            &busy,
            self.config.work_start_hour,
            self.config.work_end_hour,
        );
        let assignments = allocator::allocate(
            &event.shortlist,
            &free,
            Duration::minutes(self.config.slot_minutes as i64),
            self.config.max_candidates as usize,
        );
        if assignments.is_empty() {
            return self
                .record_failure(&event, requested, "no availability within scheduling window", now)
                .await;
        }

        for assignment in &assignments {
            let record =
                InterviewRecord::from_assignment(&event.vacancy_id, &event.principal, assignment, now);
            match self.interviews.insert(&record).await? {
                InsertOutcome::Inserted => {
                    debug!(candidate_id = %record.candidate_id, start = %record.start, "interview committed");
                }
                InsertOutcome::AlreadyScheduled => {
                    debug!(candidate_id = %record.candidate_id, "interview already on file, keeping existing");
                }
            }
        }

        // Re-read the canonical rows; dedupe may have kept earlier ones.
        let records = self.interviews.find_by_vacancy(&event.vacancy_id).await?;
        let records = self.dispatch_notifications(&event, records).await?;
        self.record_outcome(&event, requested, &records, None, now).await
    }

    /// Fetch busy events, retrying transient outages and allowing exactly
    /// one forced token refresh on `Unauthorized`.
    async fn fetch_busy(
        &self,
        access: &CalendarAccess,
        principal: &str,
        window: TimeWindow,
    ) -> Result<Vec<BusyEvent>> {
        match self.fetch_busy_with_retry(access, window).await {
            Err(HireflowError::Unauthorized(reason)) => {
                warn!(principal, reason, "calendar rejected token, forcing refresh");
                let access = self.credentials.force_refresh(principal, &access.access_token).await?;
                self.fetch_busy_with_retry(&access, window).await
            }
            other => other,
        }
    }

    async fn fetch_busy_with_retry(
        &self,
        access: &CalendarAccess,
        window: TimeWindow,
    ) -> Result<Vec<BusyEvent>> {
        let executor = RetryExecutor::new(
            self.retry.clone(),
            policies::PredicateRetry::new(|err: &HireflowError, _| err.is_retryable()),
        );

        executor
            .execute(|| {
                self.availability.busy_events(&access.access_token, &access.calendar_id, window)
            })
            .await
            .map_err(|err| match err {
                RetryError::NonRetryable { source }
                | RetryError::AttemptsExhausted { source, .. } => source,
                RetryError::TimeoutExceeded { elapsed } => HireflowError::CalendarUnavailable(
                    format!("retry budget exhausted after {elapsed:?}"),
                ),
                RetryError::InvalidConfiguration { message } => HireflowError::Internal(message),
            })
    }

    /// Send candidate invitations and the manager summary, honoring sent
    /// markers. A delivery failure leaves the marker unset so a later
    /// trigger retries without duplicating delivered mail.
    async fn dispatch_notifications(
        &self,
        event: &VacancyClosed,
        mut records: Vec<InterviewRecord>,
    ) -> Result<Vec<InterviewRecord>> {
        for record in
            records.iter_mut().filter(|r| r.status == AssignmentStatus::Committed)
        {
            if record.candidate_notified {
                continue;
            }
            let message = notifications::candidate_invitation(record, &event.vacancy_title);
            match self.gateway.send(&message).await {
                Ok(()) => {
                    self.interviews.mark_notified(&record.id, Recipient::Candidate).await?;
                    record.candidate_notified = true;
                }
                Err(err) => {
                    warn!(interview_id = %record.id, error = %err, "candidate notification failed");
                }
            }
        }

        // One summary mail covers the whole run; its sent state lives on
        // the per-interview manager markers.
        let scheduled: Vec<InterviewRecord> = records
            .iter()
            .filter(|r| r.status != AssignmentStatus::Failed)
            .cloned()
            .collect();
        let pending_manager: Vec<String> = records
            .iter()
            .filter(|r| r.status == AssignmentStatus::Committed && !r.manager_notified)
            .map(|r| r.id.clone())
            .collect();
        if !pending_manager.is_empty() {
            let message =
                notifications::manager_summary(&event.principal, &event.vacancy_title, &scheduled);
            match self.gateway.send(&message).await {
                Ok(()) => {
                    for id in &pending_manager {
                        self.interviews.mark_notified(id, Recipient::Manager).await?;
                    }
                    for record in records.iter_mut().filter(|r| pending_manager.contains(&r.id)) {
                        record.manager_notified = true;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "manager summary notification failed");
                }
            }
        }

        // Advance fully-notified interviews to their terminal status.
        for record in records.iter_mut().filter(|r| {
            r.status == AssignmentStatus::Committed && r.candidate_notified && r.manager_notified
        }) {
            self.interviews.set_status(&record.id, AssignmentStatus::NotificationSent).await?;
            record.status = AssignmentStatus::NotificationSent;
        }

        Ok(records)
    }

    async fn record_outcome(
        &self,
        event: &VacancyClosed,
        requested: u32,
        records: &[InterviewRecord],
        reason: Option<String>,
        started_at: DateTime<Utc>,
    ) -> Result<SchedulingRun> {
        let scheduled =
            records.iter().filter(|r| r.status != AssignmentStatus::Failed).count() as u32;
        let notified =
            records.iter().filter(|r| r.status == AssignmentStatus::NotificationSent).count()
                as u32;

        let (outcome, failure_reason) = if requested > 0 && notified >= requested {
            (RunOutcome::Success, None)
        } else if scheduled == 0 {
            let reason =
                reason.unwrap_or_else(|| "no interviews could be scheduled".to_string());
            (RunOutcome::Failed, Some(reason))
        } else if notified < scheduled {
            (RunOutcome::PartialSuccess, Some("notification delivery incomplete".to_string()))
        } else {
            (
                RunOutcome::PartialSuccess,
                Some("insufficient availability for the full shortlist".to_string()),
            )
        };

        let run = SchedulingRun {
            id: uuid::Uuid::now_v7().to_string(),
            vacancy_id: event.vacancy_id.clone(),
            principal: event.principal.clone(),
            requested,
            scheduled,
            outcome,
            failure_reason,
            started_at,
            finished_at: Utc::now(),
        };
        // A resume completes the run an earlier trigger left partial; the
        // new record replaces it so each vacancy keeps one non-failed run.
        if run.outcome != RunOutcome::Failed {
            self.runs.supersede_non_failed(&run.vacancy_id).await?;
        }
        self.runs.insert(&run).await?;
        info!(
            vacancy_id = %run.vacancy_id,
            outcome = run.outcome.as_str(),
            requested = run.requested,
            scheduled = run.scheduled,
            "scheduling run recorded"
        );
        Ok(run)
    }

    async fn record_failure(
        &self,
        event: &VacancyClosed,
        requested: u32,
        reason: &str,
        started_at: DateTime<Utc>,
    ) -> Result<SchedulingRun> {
        let run = SchedulingRun {
            id: uuid::Uuid::now_v7().to_string(),
            vacancy_id: event.vacancy_id.clone(),
            principal: event.principal.clone(),
            requested,
            scheduled: 0,
            outcome: RunOutcome::Failed,
            failure_reason: Some(reason.to_string()),
            started_at,
            finished_at: Utc::now(),
        };
        self.runs.insert(&run).await?;
        warn!(vacancy_id = %run.vacancy_id, reason, "scheduling run failed");
        Ok(run)
    }
}
