use crate::document_store::StoreError;
use thiserror::Error;

/// Input problems detected before the store is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("record id is missing")]
    MissingRecordId,

    #[error("notification kind is missing")]
    MissingKind,

    #[error("unknown notification kind '{0}'")]
    UnknownKind(String),
}

#[derive(Debug, Error)]
pub enum MutationError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("store write failed: {0}")]
    Store(#[from] StoreError),
}

impl MutationError {
    pub fn is_validation(&self) -> bool {
        matches!(self, MutationError::Validation(_))
    }
}

pub(super) fn require_record_id(record_id: &str) -> Result<(), ValidationError> {
    if record_id.trim().is_empty() {
        return Err(ValidationError::MissingRecordId);
    }
    Ok(())
}
