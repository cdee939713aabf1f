use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hireflow_core::notifications::NotificationMessage;
use hireflow_core::scheduling::ports::NotificationGateway;
use hireflow_domain::{HireflowError, Result as DomainResult};

/// In-memory mock for `NotificationGateway` that records delivered
/// messages and can be toggled into a failing state.
#[derive(Default, Clone)]
pub struct RecordingGateway {
    sent: Arc<Mutex<Vec<NotificationMessage>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<NotificationMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, recipient: &str) -> Vec<NotificationMessage> {
        self.sent.lock().unwrap().iter().filter(|m| m.to == recipient).cloned().collect()
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn send(&self, message: &NotificationMessage) -> DomainResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(HireflowError::Notification("gateway unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
