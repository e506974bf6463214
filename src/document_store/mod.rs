//! Document store collaborator: records addressed by (collection, id)

mod models;
mod sqlite_document_store;
mod store;

pub use models::{DocumentRef, FieldUpdate, FieldValue};
pub use sqlite_document_store::{SqliteDocumentStore, VERSIONED_SCHEMAS};
#[cfg(any(test, feature = "mock"))]
pub use store::MockDocumentStore;
pub use store::{DocumentStore, ErrorClass, StoreError};
