//! Generations domain integration tests (GI-01 through GI-06)

use std::time::Duration;

use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use appmint_generations::DeliveryConfig;

use crate::common::{empty_request, json_request, parse_body, read_sse_events, TestApp};

fn generation_body(identity: &str) -> serde_json::Value {
    json!({
        "identity": identity,
        "description": "A to-do list app",
        "behavior": "tracks tasks",
        "style": "minimalist",
        "color": "blue",
        "category": "mini-world"
    })
}

async fn create_session(app: &TestApp, identity: &str) -> String {
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/generations",
            generation_body(identity),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = parse_body(response).await;
    body["session_id"].as_str().unwrap().to_string()
}

// GI-01: chunks stream in order and reconstruct the artifact
#[tokio::test]
async fn test_delivery_stream_ordered() {
    let app = TestApp::new();
    let session_id = create_session(&app, "u1").await;

    let response = app
        .router
        .clone()
        .oneshot(empty_request(
            Method::GET,
            &format!("/v1/generations/{}/events", session_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let events = read_sse_events(response).await;
    assert!(events.len() >= 2);

    // strictly increasing indices with no gaps
    let chunks: Vec<_> = events.iter().filter(|e| e.name == "chunk").collect();
    for (expected, event) in chunks.iter().enumerate() {
        assert_eq!(event.data["index"], expected as u64);
    }

    // exactly one terminal event, and it is complete
    let terminals: Vec<_> = events.iter().filter(|e| e.name != "chunk").collect();
    assert_eq!(terminals.len(), 1);
    assert_eq!(terminals[0].name, "complete");
    assert_eq!(events.last().unwrap().name, "complete");

    // concatenated chunks carry the generated app code
    let code: String = chunks
        .iter()
        .map(|e| e.data["data"].as_str().unwrap())
        .collect();
    assert!(code.contains("A to-do list app"));
}

// GI-02: cancelling before consumption yields a lone cancelled event
#[tokio::test]
async fn test_cancel_before_consumption() {
    let app = TestApp::with_delivery(DeliveryConfig {
        chunk_size: 4,
        chunk_interval: Duration::from_millis(200),
    });
    let session_id = create_session(&app, "u1").await;

    let response = app
        .router
        .clone()
        .oneshot(empty_request(
            Method::POST,
            &format!("/v1/generations/{}/cancel", session_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = parse_body(response).await;
    assert_eq!(body["status"], "cancelling");

    let response = app
        .router
        .clone()
        .oneshot(empty_request(
            Method::GET,
            &format!("/v1/generations/{}/events", session_id),
        ))
        .await
        .unwrap();
    let events = read_sse_events(response).await;

    assert!(events.iter().all(|e| e.name != "chunk"));
    assert_eq!(events.last().unwrap().name, "cancelled");
}

// GI-03: a session's stream can only be claimed once
#[tokio::test]
async fn test_stream_claimed_once() {
    let app = TestApp::with_delivery(DeliveryConfig {
        chunk_size: 4,
        chunk_interval: Duration::from_millis(200),
    });
    let session_id = create_session(&app, "u1").await;

    let first = app
        .router
        .clone()
        .oneshot(empty_request(
            Method::GET,
            &format!("/v1/generations/{}/events", session_id),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .router
        .clone()
        .oneshot(empty_request(
            Method::GET,
            &format!("/v1/generations/{}/events", session_id),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

// GI-04: unknown sessions are 404 for both events and cancel
#[tokio::test]
async fn test_unknown_session_not_found() {
    let app = TestApp::new();
    let missing = uuid::Uuid::new_v4();

    let response = app
        .router
        .clone()
        .oneshot(empty_request(
            Method::GET,
            &format!("/v1/generations/{}/events", missing),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .router
        .clone()
        .oneshot(empty_request(
            Method::POST,
            &format!("/v1/generations/{}/cancel", missing),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// GI-05: cancelling one caller's session leaves another caller's alone
#[tokio::test]
async fn test_cancellation_is_per_session() {
    let app = TestApp::with_delivery(DeliveryConfig {
        chunk_size: 8,
        chunk_interval: Duration::from_millis(10),
    });
    let cancelled = create_session(&app, "u1").await;
    let running = create_session(&app, "u2").await;

    let response = app
        .router
        .clone()
        .oneshot(empty_request(
            Method::POST,
            &format!("/v1/generations/{}/cancel", cancelled),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = app
        .router
        .clone()
        .oneshot(empty_request(
            Method::GET,
            &format!("/v1/generations/{}/events", running),
        ))
        .await
        .unwrap();
    let events = read_sse_events(response).await;
    assert_eq!(events.last().unwrap().name, "complete");
}

// GI-06: malformed generation payloads are 400
#[tokio::test]
async fn test_generation_payload_validation() {
    let app = TestApp::new();

    // empty description violates the minimum length
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/generations",
            json!({
                "identity": "u1",
                "description": "",
                "category": "mini-world"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // unknown category is a deserialization error
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/generations",
            json!({
                "identity": "u1",
                "description": "A to-do list app",
                "category": "galactic"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
