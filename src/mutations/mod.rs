//! Idempotent, single-write mutations on store records

mod counter;
mod error;
mod kind;
mod reporter;
mod router;

pub use counter::{ViewCounter, PROPERTIES_COLLECTION, VIEW_COUNT_FIELD};
pub use error::{MutationError, ValidationError};
pub use kind::{DismissTarget, NotificationKind};
#[cfg(any(test, feature = "mock"))]
pub use reporter::MockFailureSink;
pub use reporter::{FailureSink, MutationResult, Operation, ResultReporter, TracingFailureSink};
pub use router::NotificationRouter;
