use std::sync::{Mutex, PoisonError};
use tracing::error;

use crate::outcome::Failure;

/// Where controller failures end up.
///
/// `log` is the developer-facing channel; `alert` is for failures the user
/// must see. Neither may panic or block.
pub trait FailureSink: Send + Sync {
    fn log(&self, failure: &Failure);
    fn alert(&self, failure: &Failure);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl FailureSink for TracingSink {
    fn log(&self, failure: &Failure) {
        error!(step = %failure.step, "{}", failure);
    }

    fn alert(&self, failure: &Failure) {
        error!(target: "user_alert", step = %failure.step, "{}", failure.step.message());
    }
}

/// Keeps every reported failure in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    logged: Mutex<Vec<Failure>>,
    alerts: Mutex<Vec<Failure>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logged(&self) -> Vec<Failure> {
        self.logged.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn alerts(&self) -> Vec<Failure> {
        self.alerts.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl FailureSink for RecordingSink {
    fn log(&self, failure: &Failure) {
        self.logged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(failure.clone());
    }

    fn alert(&self, failure: &Failure) {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(failure.clone());
    }
}
