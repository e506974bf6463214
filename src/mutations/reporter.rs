//! Uniform success/failure envelope for every mutation

use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tracing::{error, warn};

use super::error::{MutationError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Dismiss,
    IncrementView,
}

impl Operation {
    pub fn label(&self) -> &'static str {
        match self {
            Operation::Dismiss => "dismiss",
            Operation::IncrementView => "increment_view",
        }
    }

    fn success_message(&self) -> &'static str {
        match self {
            Operation::Dismiss => "Notification dismissed.",
            Operation::IncrementView => "View recorded.",
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            Operation::Dismiss => "Could not dismiss the notification. Please try again later.",
            Operation::IncrementView => "Could not record the view. Please try again later.",
        }
    }

    fn validation_message(&self, err: &ValidationError) -> &'static str {
        match (self, err) {
            (Operation::Dismiss, ValidationError::UnknownKind(_)) => "Unknown notification kind.",
            (Operation::Dismiss, _) => "A record id and notification kind are required.",
            (Operation::IncrementView, _) => "A record id is required.",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What callers get back. Only `success` carries the outcome; `message` is for people.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResult {
    pub success: bool,
    pub message: String,
}

/// Receives failed mutations for operator visibility.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait FailureSink: Send + Sync {
    fn record_failure(&self, operation: Operation, error: &MutationError);
}

/// Default sink, writes failures to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFailureSink;

impl FailureSink for TracingFailureSink {
    fn record_failure(&self, operation: Operation, err: &MutationError) {
        match err {
            MutationError::Validation(e) => {
                warn!(operation = operation.label(), error = %e, "Rejected {} request", operation);
            }
            MutationError::Store(e) => {
                error!(
                    operation = operation.label(),
                    error_class = e.class().as_str(),
                    error = %e,
                    "Failed to {}",
                    operation
                );
            }
        }
    }
}

#[derive(Clone)]
pub struct ResultReporter {
    sink: Arc<dyn FailureSink>,
}

impl Default for ResultReporter {
    fn default() -> Self {
        Self::new(Arc::new(TracingFailureSink))
    }
}

impl ResultReporter {
    pub fn new(sink: Arc<dyn FailureSink>) -> Self {
        Self { sink }
    }

    /// Turns an operation outcome into the caller-facing envelope.
    /// Error details go to the sink and never into the message.
    pub fn report<T>(
        &self,
        operation: Operation,
        outcome: &Result<T, MutationError>,
    ) -> MutationResult {
        match outcome {
            Ok(_) => MutationResult {
                success: true,
                message: operation.success_message().to_string(),
            },
            Err(err) => {
                self.sink.record_failure(operation, err);
                let message = match err {
                    MutationError::Validation(e) => operation.validation_message(e),
                    MutationError::Store(_) => operation.failure_message(),
                };
                MutationResult {
                    success: false,
                    message: message.to_string(),
                }
            }
        }
    }
}
