use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use hireflow_core::availability::BusyEvent;
use hireflow_core::scheduling::ports::AvailabilityProvider;
use hireflow_domain::{HireflowError, Result as DomainResult, TimeWindow};

/// In-memory mock for `AvailabilityProvider`.
///
/// Returns a fixed busy-event set, optionally after popping scripted
/// errors first. Records every access token it sees so tests can assert on
/// token rotation.
#[derive(Default)]
pub struct ScriptedAvailability {
    busy: Mutex<Vec<BusyEvent>>,
    errors: Mutex<VecDeque<HireflowError>>,
    calls: AtomicU32,
    tokens_seen: Mutex<Vec<String>>,
}

impl ScriptedAvailability {
    pub fn new(busy: Vec<BusyEvent>) -> Self {
        Self { busy: Mutex::new(busy), ..Default::default() }
    }

    /// Queue an error to be returned before any successful response.
    pub fn with_error(self, error: HireflowError) -> Self {
        self.errors.lock().unwrap().push_back(error);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn tokens_seen(&self) -> Vec<String> {
        self.tokens_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl AvailabilityProvider for ScriptedAvailability {
    async fn busy_events(
        &self,
        access_token: &str,
        _calendar_id: &str,
        _window: TimeWindow,
    ) -> DomainResult<Vec<BusyEvent>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens_seen.lock().unwrap().push(access_token.to_string());

        if let Some(error) = self.errors.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(self.busy.lock().unwrap().clone())
    }
}
