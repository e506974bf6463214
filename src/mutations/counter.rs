//! View counting on property records

use std::sync::Arc;
use tracing::debug;

use super::error::{require_record_id, MutationError};
use super::reporter::{MutationResult, Operation, ResultReporter};
use crate::document_store::{DocumentRef, DocumentStore};

pub const PROPERTIES_COLLECTION: &str = "properties";
pub const VIEW_COUNT_FIELD: &str = "viewCount";

pub struct ViewCounter {
    store: Arc<dyn DocumentStore>,
    reporter: ResultReporter,
}

impl ViewCounter {
    pub fn new(store: Arc<dyn DocumentStore>, reporter: ResultReporter) -> Self {
        Self { store, reporter }
    }

    pub fn increment_view(&self, record_id: &str) -> MutationResult {
        let outcome = self.try_increment_view(record_id);
        self.reporter.report(Operation::IncrementView, &outcome)
    }

    /// Adds one view with a single atomic store increment and returns the new count.
    pub fn try_increment_view(&self, record_id: &str) -> Result<i64, MutationError> {
        require_record_id(record_id)?;
        let document = DocumentRef::new(PROPERTIES_COLLECTION, record_id);

        let views = self.store.increment_field(&document, VIEW_COUNT_FIELD, 1)?;

        debug!("{} now has {} views", document, views);
        Ok(views)
    }
}
