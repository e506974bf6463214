#![allow(dead_code)]

//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, REPORT_ID};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_dismiss_report() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.dismiss(REPORT_ID, "report").await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
mod server;

pub use client::TestClient;
pub use constants::*;
pub use server::TestServer;
