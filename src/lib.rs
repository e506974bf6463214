//! Record Mutation Server Library
//!
//! Exposes the internal modules for testing and reuse.

pub mod config;
pub mod document_store;
pub mod mutations;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use document_store::{DocumentRef, DocumentStore, SqliteDocumentStore};
pub use mutations::{MutationResult, NotificationKind, NotificationRouter, ResultReporter, ViewCounter};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
