//! End-to-end tests for the increment-view endpoint

mod common;

use common::*;
use reqwest::StatusCode;
use serde_json::Value;
use tokio::task::JoinSet;

#[tokio::test]
async fn test_first_view_starts_count_at_one() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.increment_view(PROPERTY_ID).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "View recorded.");
    assert_eq!(server.document("properties", PROPERTY_ID)["viewCount"], 1);

    client.increment_view(PROPERTY_ID).await;
    assert_eq!(server.document("properties", PROPERTY_ID)["viewCount"], 2);
}

#[tokio::test]
async fn test_existing_count_is_incremented() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.increment_view(VIEWED_PROPERTY_ID).await;
    assert_eq!(response.status(), StatusCode::OK);

    let document = server.document("properties", VIEWED_PROPERTY_ID);
    assert_eq!(document["viewCount"], VIEWED_PROPERTY_INITIAL_COUNT + 1);
    assert_eq!(document["name"], "Flat B");
}

#[tokio::test]
async fn test_concurrent_views_are_all_counted() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let requests: i64 = 40;

    let mut tasks = JoinSet::new();
    for _ in 0..requests {
        let client = client.clone();
        tasks.spawn(async move { client.increment_view(PROPERTY_ID).await.status() });
    }
    while let Some(status) = tasks.join_next().await {
        assert_eq!(status.unwrap(), StatusCode::OK);
    }

    assert_eq!(
        server.document("properties", PROPERTY_ID)["viewCount"],
        requests
    );
}

#[tokio::test]
async fn test_blank_record_id_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    for id in ["", "  "] {
        let response = client.increment_view(id).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "A record id is required.");
    }

    assert!(server
        .document("properties", PROPERTY_ID)
        .get("viewCount")
        .is_none());
}

#[tokio::test]
async fn test_missing_record_id_field_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .post_json("/v1/mutations/increment-view", serde_json::json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_property_reports_generic_failure() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.increment_view(MISSING_ID).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Could not record the view. Please try again later."
    );
}

#[tokio::test]
async fn test_views_on_other_collections_are_not_found() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    // REPORT_ID lives in `reports`, not `properties`
    let response = client.increment_view(REPORT_ID).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(server.document("reports", REPORT_ID).get("viewCount").is_none());
}
