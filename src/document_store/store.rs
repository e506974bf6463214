use super::models::{DocumentRef, FieldUpdate};
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {0} not found")]
    NotFound(DocumentRef),

    #[error("field {field} of document {target} holds a {found} value, expected an integer")]
    FieldTypeMismatch {
        target: DocumentRef,
        field: String,
        found: String,
    },

    #[error("invalid increment {0}, counters only grow")]
    InvalidIncrement(i64),

    #[error("incrementing field {field} of document {target} by {by} would overflow")]
    CounterOverflow {
        target: DocumentRef,
        field: String,
        by: i64,
    },

    #[error("invalid field name {0:?}")]
    InvalidField(String),

    #[error("invalid document body: {0}")]
    InvalidDocument(String),

    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Coarse grouping of store failures, used for logs and metrics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The store refused the write against this target: the record is missing,
    /// access was denied, or the request can never succeed as issued.
    Rejected,
    /// I/O, lock contention, timeouts and other conditions that may clear on their own.
    Transient,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Rejected => "rejected",
            ErrorClass::Transient => "transient",
        }
    }
}

impl StoreError {
    pub fn class(&self) -> ErrorClass {
        match self {
            StoreError::NotFound(_)
            | StoreError::FieldTypeMismatch { .. }
            | StoreError::InvalidIncrement(_)
            | StoreError::CounterOverflow { .. }
            | StoreError::InvalidField(_)
            | StoreError::InvalidDocument(_)
            | StoreError::Json(_) => ErrorClass::Rejected,
            StoreError::Unavailable(_) => ErrorClass::Transient,
            StoreError::Sqlite(rusqlite::Error::SqliteFailure(e, _))
                if matches!(
                    e.code,
                    ErrorCode::ReadOnly
                        | ErrorCode::PermissionDenied
                        | ErrorCode::AuthorizationForStatementDenied
                        | ErrorCode::ConstraintViolation
                ) =>
            {
                ErrorClass::Rejected
            }
            StoreError::Sqlite(_) => ErrorClass::Transient,
        }
    }
}

/// A document store addressable by (collection, id).
///
/// Every write is a single atomic operation on a single document. Writes never
/// create documents: targeting a missing document yields [`StoreError::NotFound`].
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait DocumentStore: Send + Sync {
    /// Applies all `updates` to the document in one atomic write.
    fn update_fields(&self, target: &DocumentRef, updates: &[FieldUpdate])
        -> Result<(), StoreError>;

    /// Atomically adds `by` to an integer field and returns the new value.
    /// A missing field is initialized to `by` as part of the same write.
    fn increment_field(&self, target: &DocumentRef, field: &str, by: i64)
        -> Result<i64, StoreError>;

    /// Inserts a new document. The body must be a JSON object.
    fn insert_document(
        &self,
        target: &DocumentRef,
        body: serde_json::Value,
    ) -> Result<(), StoreError>;

    /// Returns the document body, or Ok(None) if it does not exist.
    fn get_document(&self, target: &DocumentRef) -> Result<Option<serde_json::Value>, StoreError>;
}
