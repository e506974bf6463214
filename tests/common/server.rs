//! Test server lifecycle management
//!
//! Each test gets an isolated server backed by its own document database.

use super::constants::*;
use record_mutation_server::document_store::{DocumentRef, DocumentStore, SqliteDocumentStore};
use record_mutation_server::mutations::ResultReporter;
use record_mutation_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated database
///
/// When dropped, the server gracefully shuts down and the temp dir is removed.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Document store for seeding and inspecting records directly
    pub store: Arc<SqliteDocumentStore>,

    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port with the seeded records
    /// from `constants` already in place.
    pub async fn spawn() -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(
            SqliteDocumentStore::new(
                temp_db_dir.path().join("documents.db"),
                Duration::from_millis(5000),
            )
            .expect("Failed to open document store"),
        );
        seed(store.as_ref());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            ..Default::default()
        };
        let app = make_app(config, store.clone(), ResultReporter::default());

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            store,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };
        server.wait_for_ready().await;
        server
    }

    pub fn document(&self, collection: &str, id: &str) -> serde_json::Value {
        self.store
            .get_document(&DocumentRef::new(collection, id))
            .expect("Failed to read document")
            .expect("Document is missing")
    }

    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

fn seed(store: &SqliteDocumentStore) {
    let documents = [
        ("property_appeals", APPEAL_ID, json!({"dismissedByOwner": false})),
        ("user_issues", ISSUE_ID, json!({"title": "Leaking roof"})),
        ("reports", REPORT_ID, json!({"dismissedByReporter": false})),
        ("properties", PROPERTY_ID, json!({"name": "Flat A"})),
        (
            "properties",
            VIEWED_PROPERTY_ID,
            json!({"name": "Flat B", "viewCount": VIEWED_PROPERTY_INITIAL_COUNT}),
        ),
    ];
    for (collection, id, body) in documents {
        store
            .insert_document(&DocumentRef::new(collection, id), body)
            .expect("Failed to seed document");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
