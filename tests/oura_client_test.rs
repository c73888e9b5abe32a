//! Oura client behavior against an in-process fake of the sleep endpoint.
//!
//! Run with: cargo test --test oura_client_test

mod common;

use axum::http::StatusCode;

use oura_sleep::error::AppError;
use oura_sleep::oura::OuraClient;

use common::{day, sleep_json, spawn_fake_oura, test_config, FakeReply};

#[tokio::test]
async fn follows_next_token_across_pages() {
    let fake = spawn_fake_oura(FakeReply::Pages(vec![
        vec![
            sleep_json("0b6c2f4e-2d44-4d8f-9a43-3f1f6b1c2a10", "2024-08-18", 25_200),
            sleep_json("1c7d3a5f-3e55-4e9a-8b54-4a2a7c2d3b21", "2024-08-18", 1_800),
        ],
        vec![sleep_json("2d8e4b6a-4f66-4fab-9c65-5b3b8d3e4c32", "2024-08-19", 27_000)],
    ]))
    .await;
    let client = OuraClient::new(&test_config(&fake.base_url)).unwrap();

    let docs = client
        .get_sleep(day("2024-08-18"), day("2024-08-20"))
        .await
        .unwrap();

    assert_eq!(docs.len(), 3);
    assert_eq!(fake.request_count(), 2);

    let queries = fake.queries();
    assert_eq!(queries[0].get("start_date").map(String::as_str), Some("2024-08-18"));
    assert_eq!(queries[0].get("end_date").map(String::as_str), Some("2024-08-20"));
    assert!(!queries[0].contains_key("next_token"));
    assert_eq!(queries[1].get("next_token").map(String::as_str), Some("page-1"));
}

#[tokio::test]
async fn parses_known_fields_and_ignores_the_rest() {
    let fake = spawn_fake_oura(FakeReply::Pages(vec![vec![sleep_json(
        "0b6c2f4e-2d44-4d8f-9a43-3f1f6b1c2a10",
        "2024-08-18",
        25_200,
    )]]))
    .await;
    let client = OuraClient::new(&test_config(&fake.base_url)).unwrap();

    let docs = client
        .get_sleep(day("2024-08-18"), day("2024-08-19"))
        .await
        .unwrap();
    let doc = &docs[0];

    assert_eq!(doc.day.as_deref(), Some("2024-08-18"));
    assert_eq!(doc.total_sleep_duration, Some(25_200));
    assert_eq!(doc.average_heart_rate, Some(58.3));
    // Sent as 2.0 upstream
    assert_eq!(doc.sleep_score_delta, Some(2));
    assert_eq!(doc.sleep_type.as_deref(), Some("long_sleep"));
}

#[tokio::test]
async fn empty_collection_is_ok() {
    let fake = spawn_fake_oura(FakeReply::Pages(vec![vec![]])).await;
    let client = OuraClient::new(&test_config(&fake.base_url)).unwrap();

    let docs = client
        .get_sleep(day("2024-08-18"), day("2024-08-19"))
        .await
        .unwrap();
    assert!(docs.is_empty());
}

#[tokio::test]
async fn rate_limit_is_reported_as_such() {
    let fake = spawn_fake_oura(FakeReply::Status(StatusCode::TOO_MANY_REQUESTS)).await;
    let client = OuraClient::new(&test_config(&fake.base_url)).unwrap();

    let err = client
        .get_sleep(day("2024-08-18"), day("2024-08-19"))
        .await
        .unwrap_err();
    assert!(err.is_rate_limited(), "got {err:?}");
}

#[tokio::test]
async fn wrong_token_is_unauthorized() {
    let fake = spawn_fake_oura(FakeReply::Pages(vec![vec![]])).await;
    let mut config = test_config(&fake.base_url);
    config.oura_token = "stale".to_string();
    let client = OuraClient::new(&config).unwrap();

    let err = client
        .get_sleep(day("2024-08-18"), day("2024-08-19"))
        .await
        .unwrap_err();
    assert!(matches!(&err, AppError::OuraApi(msg) if msg.contains("401")), "got {err:?}");
    assert!(!err.is_rate_limited());
}

#[tokio::test]
async fn server_error_carries_status_and_body() {
    let fake = spawn_fake_oura(FakeReply::Status(StatusCode::BAD_GATEWAY)).await;
    let client = OuraClient::new(&test_config(&fake.base_url)).unwrap();

    let err = client
        .get_sleep(day("2024-08-18"), day("2024-08-19"))
        .await
        .unwrap_err();
    let AppError::OuraApi(msg) = err else {
        panic!("expected OuraApi error");
    };
    assert!(msg.contains("502"));
    assert!(msg.contains("upstream says no"));
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let fake = spawn_fake_oura(FakeReply::RawBody("<html>maintenance</html>".to_string())).await;
    let client = OuraClient::new(&test_config(&fake.base_url)).unwrap();

    let err = client
        .get_sleep(day("2024-08-18"), day("2024-08-19"))
        .await
        .unwrap_err();
    assert!(matches!(&err, AppError::OuraApi(msg) if msg.contains("parse")), "got {err:?}");
}
