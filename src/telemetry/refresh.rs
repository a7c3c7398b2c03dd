use jiff::Timestamp;
use tracing::{Level, event};
use uuid::Uuid;

use crate::errors::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed,
    MissingRefreshToken,
    Failed,
}

/// Structured events for one refresh attempt, correlated by `attempt_id`.
#[derive(Clone, Debug)]
pub struct RefreshTelemetry {
    attempt_id: Uuid,
    context: String,
}

impl RefreshTelemetry {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            context: context.into(),
        }
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn emit_start(&self, at: Timestamp) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = %at,
            "refresh.start"
        );
    }

    pub fn emit_success(&self, access_token_len: usize, at: Timestamp) {
        event!(
            Level::INFO,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = %at,
            outcome = ?RefreshOutcome::Refreshed,
            access_token_len,
            "refresh.success"
        );
    }

    pub fn emit_skipped(&self, at: Timestamp) {
        event!(
            Level::WARN,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = %at,
            outcome = ?RefreshOutcome::MissingRefreshToken,
            "refresh.skipped"
        );
    }

    pub fn emit_failure(&self, error: &Error, at: Timestamp) {
        event!(
            Level::ERROR,
            attempt_id = %self.attempt_id,
            context = %self.context,
            timestamp = %at,
            outcome = ?RefreshOutcome::Failed,
            error = %error,
            "refresh.failure"
        );
    }
}
