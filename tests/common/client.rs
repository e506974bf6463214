//! HTTP client for end-to-end tests
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

#[derive(Clone)]
pub struct TestClient {
    pub client: reqwest::Client,
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // Mutation Endpoints
    // ========================================================================

    /// POST /v1/mutations/dismiss
    pub async fn dismiss(&self, record_id: &str, kind: &str) -> Response {
        self.post_json(
            "/v1/mutations/dismiss",
            json!({ "recordId": record_id, "kind": kind }),
        )
        .await
    }

    /// POST /v1/mutations/increment-view
    pub async fn increment_view(&self, record_id: &str) -> Response {
        self.post_json(
            "/v1/mutations/increment-view",
            json!({ "recordId": record_id }),
        )
        .await
    }

    pub async fn post_json(&self, path: &str, body: serde_json::Value) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .expect("Request failed")
    }

    /// Sends `body` verbatim with a JSON content type.
    pub async fn post_raw(&self, path: &str, body: &'static str) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Request failed")
    }

    // ========================================================================
    // Server Info
    // ========================================================================

    /// GET /
    pub async fn home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Request failed")
    }
}
