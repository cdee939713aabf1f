//! Worker consuming vacancy-closure events and driving scheduling runs.
//!
//! Vacancy state transitions arrive as [`VacancyClosed`] events on a
//! bounded mpsc channel; each event triggers one orchestrator run. Join
//! handles are tracked, cancellation is explicit, and every run is wrapped
//! in a timeout.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use hireflow_infra::scheduling::{ClosureWorkerConfig, VacancyClosureWorker};
//!
//! # async fn example(service: Arc<hireflow_core::SchedulingService>) -> hireflow_domain::Result<()> {
//! # let event = todo!();
//! let mut worker = VacancyClosureWorker::new(service, ClosureWorkerConfig::default());
//! let handle = worker.handle();
//!
//! worker.start()?;
//! handle.submit(event).await?;
//! // ... application runs ...
//! worker.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use hireflow_core::SchedulingService;
use hireflow_domain::constants::{CLOSURE_QUEUE_CAPACITY, RUN_TIMEOUT_SECS};
use hireflow_domain::{HireflowError, Result, VacancyClosed};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Configuration for the vacancy-closure worker.
#[derive(Debug, Clone)]
pub struct ClosureWorkerConfig {
    /// Capacity of the event channel; submission backpressures beyond it.
    pub queue_capacity: usize,
    /// Timeout applied to a single scheduling run.
    pub job_timeout: Duration,
    /// Timeout for awaiting the consumer task when stopping.
    pub join_timeout: Duration,
}

impl Default for ClosureWorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: CLOSURE_QUEUE_CAPACITY,
            job_timeout: Duration::from_secs(RUN_TIMEOUT_SECS),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Cloneable submission side of the worker's event channel.
#[derive(Clone)]
pub struct ClosureHandle {
    sender: mpsc::Sender<VacancyClosed>,
}

impl ClosureHandle {
    /// Enqueue a closure event, waiting when the channel is full.
    pub async fn submit(&self, event: VacancyClosed) -> Result<()> {
        self.sender
            .send(event)
            .await
            .map_err(|_| HireflowError::Internal("closure event queue is closed".to_string()))
    }
}

/// Vacancy-closure worker with explicit lifecycle management.
pub struct VacancyClosureWorker {
    service: Arc<SchedulingService>,
    config: ClosureWorkerConfig,
    sender: mpsc::Sender<VacancyClosed>,
    // Shared with the consumer loop so the worker can stop and restart on
    // the same channel without dropping queued events.
    receiver: Arc<Mutex<mpsc::Receiver<VacancyClosed>>>,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl VacancyClosureWorker {
    /// Create a new worker with the given configuration.
    pub fn new(service: Arc<SchedulingService>, config: ClosureWorkerConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        Self {
            service,
            config,
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
            cancellation: CancellationToken::new(),
            task_handle: None,
        }
    }

    /// Submission handle for producers (vacancy state listeners, tests).
    pub fn handle(&self) -> ClosureHandle {
        ClosureHandle { sender: self.sender.clone() }
    }

    /// Start the worker, spawning the consumer task.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(HireflowError::Internal("worker already running".to_string()));
        }

        info!("Starting vacancy closure worker");

        self.cancellation = CancellationToken::new();

        let service = Arc::clone(&self.service);
        let receiver = Arc::clone(&self.receiver);
        let job_timeout = self.config.job_timeout;
        let cancel = self.cancellation.clone();

        let handle = tokio::spawn(async move {
            Self::consume_loop(service, receiver, job_timeout, cancel).await;
        });

        self.task_handle = Some(handle);
        info!("Vacancy closure worker started");
        Ok(())
    }

    /// Stop the worker and wait for the consumer task to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> Result<()> {
        if !self.is_running() {
            return Err(HireflowError::Internal("worker not running".to_string()));
        }

        info!("Stopping vacancy closure worker");

        self.cancellation.cancel();

        if let Some(handle) = self.task_handle.take() {
            match tokio::time::timeout(self.config.join_timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!("Worker task panicked: {}", e);
                    return Err(HireflowError::Internal("worker task panicked".to_string()));
                }
                Err(_) => {
                    warn!("Worker task did not complete within timeout");
                    return Err(HireflowError::Internal(
                        "worker task did not stop in time".to_string(),
                    ));
                }
            }
        }

        info!("Vacancy closure worker stopped");
        self.cancellation = CancellationToken::new();
        Ok(())
    }

    /// Returns true when the consumer task is active.
    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    /// Background consumer loop.
    async fn consume_loop(
        service: Arc<SchedulingService>,
        receiver: Arc<Mutex<mpsc::Receiver<VacancyClosed>>>,
        job_timeout: Duration,
        cancel: CancellationToken,
    ) {
        let mut receiver = receiver.lock().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Closure worker consume loop cancelled");
                    break;
                }
                maybe_event = receiver.recv() => {
                    let Some(event) = maybe_event else {
                        debug!("Closure event channel closed");
                        break;
                    };
                    Self::process_event(&service, event, job_timeout).await;
                }
            }
        }
    }

    /// Run the orchestrator for one event, bounded by the job timeout.
    async fn process_event(
        service: &Arc<SchedulingService>,
        event: VacancyClosed,
        job_timeout: Duration,
    ) {
        let vacancy_id = event.vacancy_id.clone();
        match tokio::time::timeout(job_timeout, service.run(event)).await {
            Ok(Ok(run)) => {
                info!(
                    vacancy_id = %vacancy_id,
                    outcome = run.outcome.as_str(),
                    scheduled = run.scheduled,
                    "scheduling run completed"
                );
            }
            Ok(Err(err)) => {
                error!(vacancy_id = %vacancy_id, error = %err, "scheduling run errored");
            }
            Err(_) => {
                warn!(
                    vacancy_id = %vacancy_id,
                    timeout_secs = job_timeout.as_secs(),
                    "scheduling run timed out"
                );
            }
        }
    }
}

impl Drop for VacancyClosureWorker {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("VacancyClosureWorker dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}
