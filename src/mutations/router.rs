//! Notification dismissal

use std::sync::Arc;
use tracing::debug;

use super::error::{require_record_id, MutationError};
use super::kind::{DismissTarget, NotificationKind, UPDATED_AT_FIELD};
use super::reporter::{MutationResult, Operation, ResultReporter};
use crate::document_store::{DocumentStore, FieldUpdate, FieldValue};

/// Routes a dismissal to the collection and flag owned by its notification kind.
pub struct NotificationRouter {
    store: Arc<dyn DocumentStore>,
    reporter: ResultReporter,
}

impl NotificationRouter {
    pub fn new(store: Arc<dyn DocumentStore>, reporter: ResultReporter) -> Self {
        Self { store, reporter }
    }

    pub fn dismiss(&self, record_id: &str, kind: &str) -> MutationResult {
        let outcome = self.try_dismiss(record_id, kind);
        self.reporter.report(Operation::Dismiss, &outcome)
    }

    /// Validates the raw request and dismisses. No store access happens unless
    /// both the record id and the kind are valid.
    pub fn try_dismiss(&self, record_id: &str, kind: &str) -> Result<DismissTarget, MutationError> {
        require_record_id(record_id)?;
        let kind: NotificationKind = kind.parse()?;
        self.dismiss_kind(record_id, kind)
    }

    /// Sets the kind's dismissal flag and stamps `updatedAt` in a single write.
    /// Dismissing twice succeeds both times; the flag is never cleared here.
    pub fn dismiss_kind(
        &self,
        record_id: &str,
        kind: NotificationKind,
    ) -> Result<DismissTarget, MutationError> {
        require_record_id(record_id)?;
        let target = kind.target();
        let document = target.document(record_id);

        self.store.update_fields(
            &document,
            &[
                FieldUpdate::set(target.field, FieldValue::Bool(true)),
                FieldUpdate::set(UPDATED_AT_FIELD, FieldValue::ServerTimestamp),
            ],
        )?;

        debug!("Dismissed {} notification {}", kind, document);
        Ok(target)
    }
}
